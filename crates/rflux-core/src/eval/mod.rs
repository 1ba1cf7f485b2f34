//! 評価関数モジュール
//!
//! - `Evaluator`: 探索が使う評価関数のインターフェース
//! - `MaterialEvaluator`: 駒割り + 駒位置評価（序盤・終盤を補間）+ 歩の形
//! - `PawnTable`: 歩の形評価のキャッシュ（`pawn_key` で引く）
//! - `psqt`: 駒位置評価表（`Position` が差分更新する）

pub mod material;
pub mod pawn;
pub mod psqt;

pub use material::{is_insufficient_material, MaterialEvaluator, EVAL_LIMIT, PHASE_MAX};
pub use pawn::PawnTable;

use crate::position::Position;
use crate::types::Value;

/// 評価関数
///
/// 手番側から見たセンチポーン値を返す。同じ局面には同じ値を返し、
/// 色を入れ替えた局面には同じ値を返す（手番側視点なので）。
/// 値は詰みスコアの範囲に入らないよう制限する。
pub trait Evaluator: Send {
    fn evaluate(&mut self, pos: &Position) -> Value;

    /// 対局開始時にキャッシュを捨てる
    fn new_game(&mut self) {}
}
