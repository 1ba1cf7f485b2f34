//! 基本型モジュール
//!
//! チェスエンジンで使用する基本的な型を定義する。
//!
//! # 型の依存関係
//!
//! ```text
//! Color
//!   ↓
//! Square ← CastlingRights
//!   ↓
//! PieceType
//!   ↓
//! Piece ← Move
//!
//! Value, Bound は独立
//! ```

mod bound;
mod castling;
mod color;
mod moves;
mod piece;
mod square;
mod value;

pub use bound::Bound;
pub use castling::CastlingRights;
pub use color::Color;
pub use moves::{Move, MoveKind};
pub use piece::{Piece, PieceType};
pub use square::Square;
pub use value::Value;

/// 探索深さ（ply）
pub type Depth = i32;

/// 探索の最大高さ（ルートからの ply）
pub const MAX_PLY: usize = 256;

/// 反復深化の最大深さ
pub const MAX_DEPTH: Depth = 64;

/// 1局面の指し手の最大数
pub const MAX_MOVES: usize = 256;
