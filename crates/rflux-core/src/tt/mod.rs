//! 置換表モジュール
//!
//! 探索結果をキャッシュする置換表（Transposition Table）。
//!
//! - `TTEntry`: エントリ（キー、深さ、値、境界、最善手、詰めろフラグ、世代）
//! - `TranspositionTable`: テーブル本体（`key % len` の1スロット方式）
//! - 世代管理（古い世代のエントリは常に上書き、`get` では無視）
//!
//! 詰みスコアは格納時に「この局面からの手数」に正規化し、
//! 読み出し時に探索高さへ戻す（`TTEntry::value`）。

mod entry;
mod table;

pub use entry::TTEntry;
pub use table::TranspositionTable;

/// 置換表の既定サイズ（MB）
pub const DEFAULT_HASH_MB: usize = 16;
