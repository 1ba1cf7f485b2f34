//! 駒割り + 駒位置 + 歩の形による評価関数

use crate::position::Position;
use crate::types::{Color, PieceType, Value};

use super::pawn::PawnTable;
use super::psqt;
use super::Evaluator;

/// 進行度の最大値（序盤 = PHASE_MAX, 終盤 = 0）
pub const PHASE_MAX: i32 = 256;

/// 初期局面の歩・キング以外の駒価値（両陣営合計）
const OPENING_NON_PAWN_MATERIAL: i32 = 2
    * (PieceType::Queen.value()
        + 2 * PieceType::Rook.value()
        + 2 * PieceType::Bishop.value()
        + 2 * PieceType::Knight.value());

/// 評価値の絶対値の上限（詰みスコアの内側）
pub const EVAL_LIMIT: i32 = Value::MATE_IN_MAX_PLY.raw() - 1;

/// 歩・キング以外の駒価値
fn non_pawn_material(pos: &Position, color: Color) -> i32 {
    pos.material_value(color)
        - PieceType::King.value()
        - PieceType::Pawn.value() * pos.pieces(color, PieceType::Pawn).len() as i32
}

/// 序盤〜終盤の補間係数
pub fn game_phase_weight(pos: &Position) -> i32 {
    let material = non_pawn_material(pos, Color::White) + non_pawn_material(pos, Color::Black);
    (material * PHASE_MAX / OPENING_NON_PAWN_MATERIAL).clamp(0, PHASE_MAX)
}

/// 駒不足で詰ませられない局面（キング + 軽駒1枚以下 同士）
pub fn is_insufficient_material(pos: &Position) -> bool {
    Color::ALL.iter().all(|&c| {
        pos.pieces(c, PieceType::Pawn).is_empty()
            && pos.pieces(c, PieceType::Rook).is_empty()
            && pos.pieces(c, PieceType::Queen).is_empty()
            && pos.material_count(c) <= 1
    })
}

/// 標準の評価関数
pub struct MaterialEvaluator {
    pawns: PawnTable,
}

impl Default for MaterialEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialEvaluator {
    pub fn new() -> Self {
        Self {
            pawns: PawnTable::new(),
        }
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&mut self, pos: &Position) -> Value {
        if is_insufficient_material(pos) {
            return Value::DRAW;
        }

        let us = pos.side_to_move();
        let them = !us;

        let material = pos.material_value(us) - pos.material_value(them);

        let phase = game_phase_weight(pos);
        let (opening, endgame) = psqt::relative(pos, us);
        let positional = (opening * phase + endgame * (PHASE_MAX - phase)) / PHASE_MAX;

        let pawns = match us {
            Color::White => self.pawns.probe(pos),
            Color::Black => -self.pawns.probe(pos),
        };

        Value::new((material + positional + pawns).clamp(-EVAL_LIMIT, EVAL_LIMIT))
    }

    fn new_game(&mut self) {
        self.pawns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 盤面を上下反転し、色を入れ替えた FEN
    fn mirror_fen(fen: &str) -> String {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let board: Vec<String> = fields[0]
            .split('/')
            .rev()
            .map(|rank| {
                rank.chars()
                    .map(|c| {
                        if c.is_ascii_uppercase() {
                            c.to_ascii_lowercase()
                        } else {
                            c.to_ascii_uppercase()
                        }
                    })
                    .collect()
            })
            .collect();
        let side = if fields[1] == "w" { "b" } else { "w" };
        let castling: String = if fields[2] == "-" {
            "-".to_string()
        } else {
            let swapped: String = fields[2]
                .chars()
                .map(|c| {
                    if c.is_ascii_uppercase() {
                        c.to_ascii_lowercase()
                    } else {
                        c.to_ascii_uppercase()
                    }
                })
                .collect();
            let mut chars: Vec<char> = swapped.chars().collect();
            chars.sort_by_key(|c| (c.is_ascii_lowercase(), *c == 'q' || *c == 'Q'));
            chars.into_iter().collect()
        };
        let ep = if fields[3] == "-" {
            "-".to_string()
        } else {
            let mut cs = fields[3].chars();
            let file = cs.next().unwrap_or('a');
            let rank = if cs.next() == Some('3') { '6' } else { '3' };
            format!("{file}{rank}")
        };
        format!("{} {} {} {} 0 1", board.join("/"), side, castling, ep)
    }

    #[test]
    fn test_startpos_is_balanced() {
        let mut eval = MaterialEvaluator::new();
        assert_eq!(eval.evaluate(&Position::startpos()), Value::ZERO);
    }

    #[test]
    fn test_evaluation_symmetric_under_color_swap() {
        let mut eval = MaterialEvaluator::new();
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            let mirrored = Position::from_fen(&mirror_fen(fen)).unwrap();
            assert_eq!(eval.evaluate(&pos), eval.evaluate(&mirrored), "{fen}");
        }
    }

    #[test]
    fn test_material_advantage() {
        let mut eval = MaterialEvaluator::new();
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(eval.evaluate(&pos) > Value::new(800));
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        assert!(eval.evaluate(&pos) < Value::new(-800));
    }

    #[test]
    fn test_insufficient_material_is_draw() {
        let mut eval = MaterialEvaluator::new();
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert_eq!(eval.evaluate(&pos), Value::DRAW);
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/2BBK3 w - - 0 1").unwrap();
        assert_ne!(eval.evaluate(&pos), Value::DRAW);
    }

    #[test]
    fn test_phase_weight_bounds() {
        assert_eq!(game_phase_weight(&Position::startpos()), PHASE_MAX);
        let pos = Position::from_fen("4k3/pppppppp/8/8/8/8/PPPPPPPP/4K3 w - - 0 1").unwrap();
        assert_eq!(game_phase_weight(&pos), 0);
    }
}
