//! 置換表エントリ

use crate::types::{Bound, Depth, Move, Value};

/// 置換表エントリ
///
/// `key == 0` を空きスロットとして扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TTEntry {
    pub(super) key: u64,
    pub(super) mv: Move,
    pub(super) value: Value,
    pub(super) depth: i16,
    pub(super) age: u32,
    pub(super) bound: Bound,
    pub(super) mate_threat: bool,
}

impl TTEntry {
    /// 空きエントリ
    pub const EMPTY: TTEntry = TTEntry {
        key: 0,
        mv: Move::NONE,
        value: Value::ZERO,
        depth: 0,
        age: 0,
        bound: Bound::None,
        mate_threat: false,
    };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key == 0
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn depth(&self) -> Depth {
        self.depth as Depth
    }

    #[inline]
    pub fn bound(&self) -> Bound {
        self.bound
    }

    /// 最善手（なければ `Move::NONE`）
    #[inline]
    pub fn mv(&self) -> Move {
        self.mv
    }

    #[inline]
    pub fn mate_threat(&self) -> bool {
        self.mate_threat
    }

    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// 探索高さ `ply` に合わせて復元した値
    #[inline]
    pub fn value(&self, ply: i32) -> Value {
        self.value.from_tt(ply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_entry() {
        assert!(TTEntry::EMPTY.is_empty());
        assert_eq!(TTEntry::default(), TTEntry::EMPTY);
        assert_eq!(TTEntry::EMPTY.bound(), Bound::None);
        assert!(TTEntry::EMPTY.mv().is_none());
    }

    #[test]
    fn test_entry_value_restores_mate_distance() {
        // 高さ 3 で「5手後に詰ます」値を格納すると、局面からの距離 2 として保存される
        let stored = Value::mate_in(5).to_tt(3);
        let entry = TTEntry {
            key: 1,
            value: stored,
            bound: Bound::Exact,
            ..TTEntry::EMPTY
        };
        assert_eq!(entry.value(3), Value::mate_in(5));
        assert_eq!(entry.value(7), Value::mate_in(9));
        assert_eq!(entry.value(0), Value::mate_in(2));
    }
}
