//! TranspositionTable本体
//!
//! - put/get操作
//! - 世代管理
//! - 使用率、PV の復元

use super::entry::TTEntry;
use crate::movegen::generate_legal;
use crate::position::Position;
use crate::types::{Bound, Depth, Move, Value};
use log::info;

/// 置換表
pub struct TranspositionTable {
    /// エントリの配列
    entries: Box<[TTEntry]>,
    /// 現在の世代
    age: u32,
    /// 現在の世代で書き込まれたスロット数
    used: usize,
}

impl TranspositionTable {
    /// 新しい置換表を作成（サイズはMB単位）
    pub fn new(mb_size: usize) -> Self {
        Self {
            entries: vec![TTEntry::EMPTY; Self::entry_count(mb_size)].into_boxed_slice(),
            age: 0,
            used: 0,
        }
    }

    fn entry_count(mb_size: usize) -> usize {
        (mb_size * 1024 * 1024 / std::mem::size_of::<TTEntry>()).max(1)
    }

    /// サイズを変更（内容は捨てる）
    pub fn resize(&mut self, mb_size: usize) {
        let count = Self::entry_count(mb_size);
        if count != self.entries.len() {
            self.entries = vec![TTEntry::EMPTY; count].into_boxed_slice();
            info!("transposition table resized: {mb_size} MB ({count} entries)");
        }
        self.age = 0;
        self.used = 0;
    }

    /// クリア
    pub fn clear(&mut self) {
        self.entries.fill(TTEntry::EMPTY);
        self.age = 0;
        self.used = 0;
    }

    /// 世代を進める（以前の世代のエントリは論理的に無効になる）
    pub fn increase_age(&mut self) {
        self.age = self.age.wrapping_add(1);
        self.used = 0;
    }

    /// 現在の世代
    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// エントリ数
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    /// 探索結果を格納する
    ///
    /// - 空き、または古い世代: 上書き
    /// - 同じ局面: 深さが同じか深く、最善手がある時だけ上書き
    /// - 別の局面（衝突）: 上書き
    #[allow(clippy::too_many_arguments)]
    pub fn put(
        &mut self,
        key: u64,
        depth: Depth,
        value: Value,
        bound: Bound,
        mv: Move,
        mate_threat: bool,
        ply: i32,
    ) {
        let index = self.index(key);
        let age = self.age;
        let entry = &mut self.entries[index];

        if entry.is_empty() || entry.age != age {
            self.used += 1;
        } else if entry.key == key {
            if depth < entry.depth() || mv.is_none() {
                return;
            }
        }

        *entry = TTEntry {
            key,
            mv,
            value: value.to_tt(ply),
            depth: depth as i16,
            age,
            bound,
            mate_threat,
        };
    }

    /// 現在の世代で同じ局面のエントリがあれば返す
    #[inline]
    pub fn get(&self, key: u64) -> Option<TTEntry> {
        let entry = self.entries[self.index(key)];
        (!entry.is_empty() && entry.key == key && entry.age == self.age).then_some(entry)
    }

    /// 置換表の使用率を1000分率で返す
    pub fn hashfull(&self) -> i32 {
        (self.used.min(self.entries.len()) * 1000 / self.entries.len()) as i32
    }

    /// 置換表の最善手を辿って読み筋を復元する
    ///
    /// 合法手でない手、または同じ局面に戻った時点で打ち切る。
    pub fn pv_line(&self, pos: &mut Position, depth: usize) -> Vec<Move> {
        let mut line = Vec::with_capacity(depth);
        let mut seen = Vec::with_capacity(depth + 1);
        seen.push(pos.key());

        while line.len() < depth {
            let Some(entry) = self.get(pos.key()) else {
                break;
            };
            let mv = entry.mv();
            if mv.is_none() || !generate_legal(pos).contains(mv) {
                break;
            }
            pos.make_move(mv);
            line.push(mv);
            if seen.contains(&pos.key()) {
                break;
            }
            seen.push(pos.key());
        }

        for &mv in line.iter().rev() {
            pos.undo_move(mv);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::parse_uci_move;

    #[test]
    fn test_tt_new() {
        let tt = TranspositionTable::new(1);
        assert!(tt.len() >= 1);
        assert_eq!(tt.age(), 0);
        assert_eq!(tt.hashfull(), 0);
    }

    #[test]
    fn test_tt_put_and_get() {
        let pos = Position::startpos();
        let mut tt = TranspositionTable::new(1);
        let key = pos.key();

        assert!(tt.get(key).is_none());

        tt.put(key, 5, Value::new(42), Bound::Exact, Move::NONE, true, 0);
        let entry = tt.get(key).unwrap();
        assert_eq!(entry.depth(), 5);
        assert_eq!(entry.value(0), Value::new(42));
        assert_eq!(entry.bound(), Bound::Exact);
        assert!(entry.mate_threat());
    }

    #[test]
    fn test_tt_same_key_replacement() {
        let mut pos = Position::startpos();
        let mv = parse_uci_move(&mut pos, "e2e4").unwrap();
        let mut tt = TranspositionTable::new(1);
        let key = pos.key();

        tt.put(key, 6, Value::new(10), Bound::Lower, mv, false, 0);

        // 浅い深さでは上書きしない
        tt.put(key, 3, Value::new(20), Bound::Exact, mv, false, 0);
        assert_eq!(tt.get(key).unwrap().depth(), 6);

        // 最善手がなければ上書きしない
        tt.put(key, 8, Value::new(30), Bound::Exact, Move::NONE, false, 0);
        assert_eq!(tt.get(key).unwrap().depth(), 6);

        // 同じ深さ以上で最善手があれば上書き
        tt.put(key, 6, Value::new(40), Bound::Upper, mv, false, 0);
        let entry = tt.get(key).unwrap();
        assert_eq!(entry.value(0), Value::new(40));
        assert_eq!(entry.bound(), Bound::Upper);
    }

    #[test]
    fn test_tt_collision_overwrites() {
        let mut tt = TranspositionTable::new(1);
        let len = tt.len() as u64;
        let a = 7;
        let b = 7 + len;

        tt.put(a, 10, Value::new(1), Bound::Exact, Move::NONE, false, 0);
        tt.put(b, 1, Value::new(2), Bound::Exact, Move::NONE, false, 0);
        assert!(tt.get(a).is_none());
        assert_eq!(tt.get(b).unwrap().value(0), Value::new(2));
    }

    #[test]
    fn test_tt_age_invalidates_entries() {
        let mut tt = TranspositionTable::new(1);
        tt.put(99, 4, Value::new(5), Bound::Exact, Move::NONE, false, 0);
        assert!(tt.get(99).is_some());

        tt.increase_age();
        assert!(tt.get(99).is_none());
        assert_eq!(tt.hashfull(), 0);

        // 古い世代のエントリは深さに関係なく上書き
        tt.put(99, 1, Value::new(6), Bound::Upper, Move::NONE, false, 0);
        assert_eq!(tt.get(99).unwrap().depth(), 1);
    }

    #[test]
    fn test_tt_old_generation_stays_stale_after_many_searches() {
        let mut tt = TranspositionTable::new(1);
        tt.put(99, 4, Value::new(5), Bound::Exact, Move::NONE, false, 0);

        // 解析モードで長く使っても、最初の世代のエントリは復活しない
        for _ in 0..256 {
            tt.increase_age();
            assert!(tt.get(99).is_none());
        }
        assert_eq!(tt.age(), 256);
    }

    #[test]
    fn test_tt_bounds_consistent_with_window() {
        let mut tt = TranspositionTable::new(1);
        let (alpha, beta) = (Value::new(-30), Value::new(30));

        tt.put(1, 4, Value::new(45), Bound::Lower, Move::NONE, false, 0);
        tt.put(2, 4, Value::new(-45), Bound::Upper, Move::NONE, false, 0);
        tt.put(3, 4, Value::new(12), Bound::Exact, Move::NONE, false, 0);

        for key in 1..=3 {
            let entry = tt.get(key).unwrap();
            assert!(entry.depth() >= 3);
            assert!(entry.bound().can_cutoff(entry.value(0), alpha, beta));
        }
        assert!(tt.get(1).unwrap().value(0) >= beta);
        assert!(tt.get(2).unwrap().value(0) <= alpha);
        assert_eq!(tt.get(3).unwrap().value(0), Value::new(12));
    }

    #[test]
    fn test_tt_mate_score_normalized_by_ply() {
        let mut tt = TranspositionTable::new(1);
        tt.put(5, 3, Value::mate_in(7), Bound::Exact, Move::NONE, false, 4);
        let entry = tt.get(5).unwrap();
        assert_eq!(entry.value(4), Value::mate_in(7));
        assert_eq!(entry.value(2), Value::mate_in(5));

        tt.put(6, 3, Value::mated_in(6), Bound::Exact, Move::NONE, false, 4);
        assert_eq!(tt.get(6).unwrap().value(2), Value::mated_in(4));
    }

    #[test]
    fn test_tt_clear() {
        let mut tt = TranspositionTable::new(1);
        tt.put(11, 2, Value::new(3), Bound::Exact, Move::NONE, false, 0);
        tt.clear();
        assert!(tt.get(11).is_none());
        assert_eq!(tt.hashfull(), 0);
    }

    #[test]
    fn test_tt_resize() {
        let mut tt = TranspositionTable::new(1);
        let initial = tt.len();
        tt.resize(2);
        assert!(tt.len() > initial);
        tt.resize(1);
        assert_eq!(tt.len(), initial);
    }

    #[test]
    fn test_tt_pv_line() {
        let mut pos = Position::startpos();
        let mut tt = TranspositionTable::new(1);
        let before = pos.clone();

        let mut line = Vec::new();
        for uci in ["e2e4", "e7e5", "g1f3"] {
            let mv = parse_uci_move(&mut pos, uci).unwrap();
            tt.put(pos.key(), 3, Value::ZERO, Bound::Exact, mv, false, 0);
            pos.make_move(mv);
            line.push(mv);
        }
        for &mv in line.iter().rev() {
            pos.undo_move(mv);
        }

        assert_eq!(tt.pv_line(&mut pos, 10), line);
        assert_eq!(tt.pv_line(&mut pos, 2), line[..2].to_vec());
        assert_eq!(pos, before);
        assert_eq!(pos.key(), before.key());
    }
}
