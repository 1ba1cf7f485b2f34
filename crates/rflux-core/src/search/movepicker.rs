//! MovePicker（指し手オーダリング）
//!
//! 探索ノードごとに1つ作り、指し手を段階的に生成して返す。
//! `Position` や `HistoryTable` への参照はフィールドとして保持せず、
//! `next_move()` の引数で受け取る（再帰探索中に局面を動かすため）。
//!
//! ## Stage
//!
//! ### 通常探索（王手なし）
//! 1. MainTT - 置換表の指し手
//! 2. CaptureInit - 捕獲手・成りの生成
//! 3. GoodCapture - 良い捕獲手（MVV/LVA 順、損をしないもの）
//! 4. Killer - killer 手
//! 5. QuietInit - 静かな手の生成
//! 6. Quiet - 静かな手（history 順）
//! 7. BadCapture - 悪い捕獲手
//!
//! ### 王手回避
//! 1. Evasion - 回避手（生成は構築時に済ませ、`evasion_count()` で手数を返す）
//!
//! ### 静止探索
//! 1. QCaptureInit - 捕獲手の生成
//! 2. QCapture - 良い捕獲手
//! 3. QCheckInit / QCheck - 王手になる静かな手（`generate_checks` 時のみ）

use super::history::HistoryTable;
use super::killer::KILLER_SLOTS;
use crate::movegen::{
    generate_evasions, generate_quiet, generate_quiet_checks, generate_tactical, MoveList,
};
use crate::position::Position;
use crate::types::{Move, PieceType};

// =============================================================================
// Stage（指し手生成の段階）
// =============================================================================

/// 指し手生成の段階
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Stage {
    // 通常探索（王手なし）
    /// 置換表の指し手
    MainTT,
    /// 捕獲手の生成
    CaptureInit,
    /// 良い捕獲手
    GoodCapture,
    /// killer 手
    Killer,
    /// 静かな手の生成
    QuietInit,
    /// 静かな手
    Quiet,
    /// 悪い捕獲手
    BadCapture,

    // 王手回避
    /// 回避手
    Evasion,

    // 静止探索
    /// 静止探索用捕獲手の生成
    QCaptureInit,
    /// 静止探索用捕獲手
    QCapture,
    /// 王手になる静かな手の生成
    QCheckInit,
    /// 王手になる静かな手
    QCheck,

    /// 終了
    Done,
}

impl Stage {
    /// 次のステージを取得
    pub fn next(self) -> Self {
        match self {
            Stage::MainTT => Stage::CaptureInit,
            Stage::CaptureInit => Stage::GoodCapture,
            Stage::GoodCapture => Stage::Killer,
            Stage::Killer => Stage::QuietInit,
            Stage::QuietInit => Stage::Quiet,
            Stage::Quiet => Stage::BadCapture,
            Stage::BadCapture => Stage::Done,

            Stage::Evasion => Stage::Done,

            Stage::QCaptureInit => Stage::QCapture,
            Stage::QCapture => Stage::QCheckInit,
            Stage::QCheckInit => Stage::QCheck,
            Stage::QCheck => Stage::Done,

            Stage::Done => Stage::Done,
        }
    }
}

// =============================================================================
// スコアリング
// =============================================================================

/// 置換表の手に与える順序値（回避手の並べ替え用）
const TT_MOVE_SCORE: i32 = i32::MAX;

/// 回避手の捕獲を静かな手より先にするための下駄
const EVASION_CAPTURE_BONUS: i32 = 1 << 24;

/// MVV/LVA: 取られる駒が高く、取る駒が安いほど大きい
#[inline]
fn mvv_lva(mv: Move) -> i32 {
    let victim = mv.captured().value();
    let promotion = mv.promotion().map_or(0, |pt| pt.value() - PieceType::Pawn.value());
    let attacker = mv.piece_type().map_or(0, |pt| pt.index() as i32);
    (victim + promotion) * 8 - attacker
}

/// 損をしない捕獲か
///
/// 取る駒が取られる駒より安ければ SEE を省略する。
/// クイーン以外への成りは悪い手として扱う。
fn is_good_tactical(pos: &Position, mv: Move) -> bool {
    if let Some(pt) = mv.promotion() {
        if pt != PieceType::Queen {
            return false;
        }
        if mv.captured().is_none() {
            return true;
        }
    }
    mv.piece().value() <= mv.captured().value() || pos.see(mv) >= 0
}

// =============================================================================
// MovePicker
// =============================================================================

/// 指し手オーダリング器
pub struct MovePicker {
    stage: Stage,
    tt_move: Move,
    killers: [Move; KILLER_SLOTS],
    killer_index: usize,
    generate_checks: bool,

    moves: MoveList,
    bad_captures: MoveList,
    cur: usize,
    evasion_count: usize,
}

impl MovePicker {
    /// 通常探索用コンストラクタ
    ///
    /// 王手されていれば回避手をここで生成する（手数が延長判定に必要なため）。
    pub fn new(
        pos: &mut Position,
        tt_move: Move,
        killers: [Move; KILLER_SLOTS],
        history: &HistoryTable,
    ) -> Self {
        let mut picker = Self::empty(tt_move, killers, false);
        if !picker.init_evasions(pos, history) {
            picker.stage = if tt_move.is_some() && pos.is_pseudo_legal(tt_move) {
                Stage::MainTT
            } else {
                Stage::CaptureInit
            };
        }
        picker
    }

    /// 静止探索用コンストラクタ
    ///
    /// 王手されていれば回避手、そうでなければ良い捕獲手
    /// （`generate_checks` なら王手になる静かな手も）を返す。
    pub fn new_quiescence(
        pos: &mut Position,
        generate_checks: bool,
        history: &HistoryTable,
    ) -> Self {
        let mut picker = Self::empty(Move::NONE, [Move::NONE; KILLER_SLOTS], generate_checks);
        if !picker.init_evasions(pos, history) {
            picker.stage = Stage::QCaptureInit;
        }
        picker
    }

    fn empty(tt_move: Move, killers: [Move; KILLER_SLOTS], generate_checks: bool) -> Self {
        Self {
            stage: Stage::Done,
            tt_move,
            killers,
            killer_index: 0,
            generate_checks,
            moves: MoveList::new(),
            bad_captures: MoveList::new(),
            cur: 0,
            evasion_count: 0,
        }
    }

    /// 王手されていれば回避手を生成して並べる
    fn init_evasions(&mut self, pos: &mut Position, history: &HistoryTable) -> bool {
        let attack = pos.attack(pos.side_to_move());
        if !attack.is_check() {
            return false;
        }
        generate_evasions(pos, &attack, &mut self.moves);
        for ext in self.moves.as_mut_slice() {
            ext.value = if ext.mv == self.tt_move {
                TT_MOVE_SCORE
            } else if ext.mv.is_capture() || ext.mv.is_promotion() {
                EVASION_CAPTURE_BONUS + mvv_lva(ext.mv)
            } else {
                history.get(ext.mv.piece(), ext.mv.to())
            };
        }
        self.moves.sort_by_value();
        self.evasion_count = self.moves.len();
        self.stage = Stage::Evasion;
        true
    }

    /// 現在のステージ
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// 王手回避ノードなら合法な回避手の数、そうでなければ 0
    #[inline]
    pub fn evasion_count(&self) -> usize {
        self.evasion_count
    }

    /// 既に返した（または返す予定の）特別な手か
    #[inline]
    fn is_special(&self, mv: Move) -> bool {
        mv == self.tt_move || self.killers.contains(&mv)
    }

    /// 次の指し手を返す
    ///
    /// 返す手は合法手のみ。指し手が尽きたら `Move::NONE` を返す。
    pub fn next_move(&mut self, pos: &mut Position, history: &HistoryTable) -> Move {
        loop {
            match self.stage {
                // ==============================
                // 置換表の手
                // ==============================
                Stage::MainTT => {
                    self.stage = self.stage.next();
                    if pos.is_legal(self.tt_move) {
                        return self.tt_move;
                    }
                }

                // ==============================
                // 捕獲手の生成
                // ==============================
                Stage::CaptureInit | Stage::QCaptureInit => {
                    self.moves.clear();
                    self.cur = 0;
                    generate_tactical(pos, &mut self.moves);
                    for ext in self.moves.as_mut_slice() {
                        ext.value = mvv_lva(ext.mv);
                    }
                    self.moves.sort_by_value();
                    self.stage = self.stage.next();
                }

                // ==============================
                // 良い捕獲手（悪いものは後回し）
                // ==============================
                Stage::GoodCapture => {
                    while self.cur < self.moves.len() {
                        let mv = self.moves.at(self.cur);
                        self.cur += 1;
                        if mv == self.tt_move {
                            continue;
                        }
                        if !is_good_tactical(pos, mv) {
                            self.bad_captures.push(mv);
                            continue;
                        }
                        if pos.is_legal(mv) {
                            return mv;
                        }
                    }
                    self.stage = self.stage.next();
                }

                // ==============================
                // killer 手
                // ==============================
                Stage::Killer => {
                    while self.killer_index < KILLER_SLOTS {
                        let mv = self.killers[self.killer_index];
                        self.killer_index += 1;
                        if mv.is_none()
                            || mv == self.tt_move
                            || !mv.is_quiet()
                            || self.killers[..self.killer_index - 1].contains(&mv)
                        {
                            continue;
                        }
                        if pos.is_pseudo_legal(mv) && pos.is_legal(mv) {
                            return mv;
                        }
                    }
                    self.stage = self.stage.next();
                }

                // ==============================
                // 静かな手の生成
                // ==============================
                Stage::QuietInit => {
                    self.moves.clear();
                    self.cur = 0;
                    generate_quiet(pos, &mut self.moves);
                    for ext in self.moves.as_mut_slice() {
                        ext.value = history.get(ext.mv.piece(), ext.mv.to());
                    }
                    self.moves.sort_by_value();
                    self.stage = self.stage.next();
                }

                // ==============================
                // 静かな手
                // ==============================
                Stage::Quiet => {
                    while self.cur < self.moves.len() {
                        let mv = self.moves.at(self.cur);
                        self.cur += 1;
                        if !self.is_special(mv) && pos.is_legal(mv) {
                            return mv;
                        }
                    }
                    self.cur = 0;
                    self.stage = self.stage.next();
                }

                // ==============================
                // 悪い捕獲手
                // ==============================
                Stage::BadCapture => {
                    while self.cur < self.bad_captures.len() {
                        let mv = self.bad_captures.at(self.cur);
                        self.cur += 1;
                        if pos.is_legal(mv) {
                            return mv;
                        }
                    }
                    self.stage = self.stage.next();
                }

                // ==============================
                // 王手回避（生成済み、すべて合法）
                // ==============================
                Stage::Evasion => {
                    if self.cur < self.moves.len() {
                        let mv = self.moves.at(self.cur);
                        self.cur += 1;
                        return mv;
                    }
                    self.stage = self.stage.next();
                }

                // ==============================
                // 静止探索: 良い捕獲手のみ
                // ==============================
                Stage::QCapture => {
                    while self.cur < self.moves.len() {
                        let mv = self.moves.at(self.cur);
                        self.cur += 1;
                        if is_good_tactical(pos, mv) && pos.is_legal(mv) {
                            return mv;
                        }
                    }
                    self.stage = self.stage.next();
                }

                // ==============================
                // 静止探索: 王手になる静かな手
                // ==============================
                Stage::QCheckInit => {
                    if !self.generate_checks {
                        self.stage = Stage::Done;
                        continue;
                    }
                    self.moves.clear();
                    self.cur = 0;
                    generate_quiet_checks(pos, &mut self.moves);
                    self.stage = self.stage.next();
                }

                Stage::QCheck => {
                    while self.cur < self.moves.len() {
                        let mv = self.moves.at(self.cur);
                        self.cur += 1;
                        if pos.see(mv) >= 0 && pos.is_legal(mv) {
                            return mv;
                        }
                    }
                    self.stage = self.stage.next();
                }

                Stage::Done => return Move::NONE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::{generate_legal, parse_uci_move};
    use std::collections::HashSet;

    fn collect(picker: &mut MovePicker, pos: &mut Position, history: &HistoryTable) -> Vec<Move> {
        let mut moves = Vec::new();
        loop {
            let mv = picker.next_move(pos, history);
            if mv.is_none() {
                break;
            }
            moves.push(mv);
        }
        moves
    }

    #[test]
    fn test_picker_returns_each_legal_move_once() {
        let history = HistoryTable::new();
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ] {
            let mut pos = Position::from_fen(fen).unwrap();
            let legal: HashSet<Move> = generate_legal(&mut pos).iter().map(|e| e.mv).collect();

            let mut picker = MovePicker::new(&mut pos, Move::NONE, [Move::NONE; 2], &history);
            let picked = collect(&mut picker, &mut pos, &history);
            let unique: HashSet<Move> = picked.iter().copied().collect();

            assert_eq!(picked.len(), unique.len(), "{fen}: duplicate move");
            assert_eq!(unique, legal, "{fen}");
        }
    }

    #[test]
    fn test_picker_tt_move_and_killers_first() {
        let history = HistoryTable::new();
        let mut pos = Position::startpos();
        let tt_move = parse_uci_move(&mut pos, "d2d4").unwrap();
        let killer = parse_uci_move(&mut pos, "g1f3").unwrap();

        let mut picker = MovePicker::new(&mut pos, tt_move, [killer, Move::NONE], &history);
        let picked = collect(&mut picker, &mut pos, &history);

        assert_eq!(picked[0], tt_move);
        assert_eq!(picked[1], killer);
        assert_eq!(picked.len(), 20);
        assert_eq!(picked.iter().filter(|&&m| m == tt_move).count(), 1);
        assert_eq!(picked.iter().filter(|&&m| m == killer).count(), 1);
    }

    #[test]
    fn test_picker_skips_illegal_tt_move_and_killer() {
        let history = HistoryTable::new();
        let mut pos = Position::startpos();
        let mut other = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let foreign = parse_uci_move(&mut other, "a1a8").unwrap();

        let mut picker = MovePicker::new(&mut pos, foreign, [foreign, Move::NONE], &history);
        let picked = collect(&mut picker, &mut pos, &history);
        assert_eq!(picked.len(), 20);
        assert!(!picked.contains(&foreign));
    }

    #[test]
    fn test_picker_orders_good_captures_before_quiets_and_bad_captures_last() {
        // Qd1 は d7 の歩（c8 ビショップで守られている）と h5 のナイトを取れる
        let history = HistoryTable::new();
        let mut pos = Position::from_fen("2b1k3/3p4/8/7n/8/8/8/3QK3 w - - 0 1").unwrap();
        let good = parse_uci_move(&mut pos, "d1h5").unwrap();
        let bad = parse_uci_move(&mut pos, "d1d7").unwrap();

        let mut picker = MovePicker::new(&mut pos, Move::NONE, [Move::NONE; 2], &history);
        let picked = collect(&mut picker, &mut pos, &history);

        assert_eq!(picked[0], good);
        assert_eq!(*picked.last().unwrap(), bad);
    }

    #[test]
    fn test_picker_quiets_follow_history() {
        let mut history = HistoryTable::new();
        let mut pos = Position::startpos();
        let favored = parse_uci_move(&mut pos, "b1c3").unwrap();
        history.add(favored, 10);

        let mut picker = MovePicker::new(&mut pos, Move::NONE, [Move::NONE; 2], &history);
        assert_eq!(picker.next_move(&mut pos, &history), favored);
    }

    #[test]
    fn test_picker_evasions() {
        let history = HistoryTable::new();
        // 白キング e1 がルーク e8 に王手されている。逃げる手は Kd1/Kd2/Kf1/Kf2 のみ
        let mut pos = Position::from_fen("4r1k1/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mut picker = MovePicker::new(&mut pos, Move::NONE, [Move::NONE; 2], &history);
        assert_eq!(picker.stage(), Stage::Evasion);

        let picked = collect(&mut picker, &mut pos, &history);
        let legal: HashSet<Move> = generate_legal(&mut pos).iter().map(|e| e.mv).collect();
        assert_eq!(picker.evasion_count(), legal.len());
        assert_eq!(picked.len(), legal.len());
        assert_eq!(picked.iter().copied().collect::<HashSet<_>>(), legal);
    }

    #[test]
    fn test_picker_single_evasion() {
        let history = HistoryTable::new();
        // 黒ルーク a1 の王手に対し、白キング h1 は h2 に逃げるしかない（g2 は g 筋のルークで取られる）
        let mut pos = Position::from_fen("6rk/8/8/8/8/8/8/r6K w - - 0 1").unwrap();
        let picker = MovePicker::new(&mut pos, Move::NONE, [Move::NONE; 2], &history);
        assert_eq!(picker.evasion_count(), 1);
    }

    #[test]
    fn test_quiescence_picker_captures_only() {
        let history = HistoryTable::new();
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let mut picker = MovePicker::new_quiescence(&mut pos, false, &history);
        let picked = collect(&mut picker, &mut pos, &history);
        assert!(!picked.is_empty());
        assert!(picked.iter().all(|m| m.is_capture() || m.is_promotion()));
    }

    #[test]
    fn test_quiescence_picker_with_checks() {
        let history = HistoryTable::new();
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mate = parse_uci_move(&mut pos, "a1a8").unwrap();

        let mut picker = MovePicker::new_quiescence(&mut pos, false, &history);
        assert!(picker.next_move(&mut pos, &history).is_none());

        let mut picker = MovePicker::new_quiescence(&mut pos, true, &history);
        let picked = collect(&mut picker, &mut pos, &history);
        assert!(picked.contains(&mate));
    }
}
