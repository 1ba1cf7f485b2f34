//! 指し手生成モジュール
//!
//! - `generate_tactical`: 駒取り・成り・アンパッサン
//! - `generate_quiet`: 静かな手（キャスリングを含む）
//! - `generate_evasions`: 王手回避（合法手）
//! - `generate_quiet_checks`: 王手になる静かな手
//! - `generate_legal`: 合法手すべて
//! - `perft` / `perft_divide`
//! - 座標形式（"e2e4", "e7e8q"）の指し手解析

mod generator;
mod movelist;
mod perft;

pub use generator::{
    generate_evasions, generate_legal, generate_quiet, generate_quiet_checks, generate_tactical,
};
pub use movelist::{ExtMove, MoveList};
pub use perft::{perft, perft_divide};

use thiserror::Error;

use crate::position::Position;
use crate::types::{Move, PieceType, Square};

/// 指し手文字列の解析エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("malformed move string: {0}")]
    Malformed(String),
    #[error("illegal move in this position: {0}")]
    Illegal(String),
}

/// 座標形式の指し手を現局面の合法手に解決する
pub fn parse_uci_move(pos: &mut Position, s: &str) -> Result<Move, MoveParseError> {
    let malformed = || MoveParseError::Malformed(s.to_string());
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(malformed());
    }
    Square::parse(&s[0..2]).ok_or_else(malformed)?;
    Square::parse(&s[2..4]).ok_or_else(malformed)?;
    if let Some(c) = s[4..].chars().next() {
        match PieceType::from_char(c) {
            Some(PieceType::Queen | PieceType::Rook | PieceType::Bishop | PieceType::Knight)
                if c.is_ascii_lowercase() => {}
            _ => return Err(malformed()),
        }
    }

    generate_legal(pos)
        .iter()
        .map(|ext| ext.mv)
        .find(|mv| mv.to_uci() == s)
        .ok_or_else(|| MoveParseError::Illegal(s.to_string()))
}
