//! # rflux-core
//!
//! 0x88 盤面表現によるチェスエンジンコアライブラリ。
//!
//! ## モジュール構成
//!
//! - `types`: 基本型（Color, Square, Piece, Move, Value, etc.）
//! - `position`: 局面表現と make_move/undo_move、ハッシュ、繰り返し検出、利き、SEE
//! - `movegen`: 段階別の指し手生成と perft
//! - `eval`: 評価関数（駒割り + 駒位置 + 歩の形）
//! - `tt`: 置換表（Transposition Table）
//! - `search`: 反復深化 PVS 探索、手の順序付け、時間管理
//!

// 基本型
pub mod types;

// 盤面表現
pub mod position;

// 指し手生成
pub mod movegen;

// 評価
pub mod eval;

// 置換表
pub mod tt;

// 探索
pub mod search;
