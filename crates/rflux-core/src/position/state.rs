//! 局面状態（StateInfo）
//!
//! `make_move` の直前に積まれ、`undo_move` で復元される。
//! 駒の配置そのものは指し手から逆算できるので、ここには持たない。

use crate::types::{CastlingRights, Color, Square};

/// 1手分の巻き戻し情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    pub key: u64,
    pub pawn_key: u64,
    pub castling: CastlingRights,
    pub ep_square: Option<Square>,
    pub half_move_clock: i32,
    /// 直前の手で駒が取られた升
    pub capture_square: Option<Square>,
    /// 駒位置評価（序盤・終盤）[Color]
    pub positional_opening: [i32; Color::NUM],
    pub positional_endgame: [i32; Color::NUM],
}
