//! 探索モジュール
//!
//! 反復深化による Alpha-Beta 探索と各種枝刈り。
//!
//! - Iterative Deepening + Aspiration Windows
//! - Principal Variation Search
//! - 静止探索（Quiescence Search）
//! - 各種枝刈り（Null Move, Futility, Delta, LMR, Mate Distance）と延長
//! - 段階的な指し手生成（MovePicker）、killer / history
//! - 時間管理と協調的な停止
//!
//! 探索は `Search::start` で専用スレッド上で行い、進行状況は `InfoSink` に届く。

mod alpha_beta;
mod config;
mod engine;
mod history;
mod info;
mod killer;
mod limits;
mod movepicker;
mod pruning;
mod pv;
mod qsearch;
mod root_search;
mod search_helpers;
mod stats;
mod time_manager;
mod time_options;

#[cfg(test)]
mod tests;

pub use alpha_beta::SearchWorker;
pub use config::SearchConfig;
pub use engine::{Search, SearchError, SearchOutcome};
pub use history::{HistoryTable, HISTORY_MAX};
pub use info::{InfoSink, NullSink, SearchEvent, SearchInfo, SearchStatus, REPORT_INTERVAL_MS};
pub use killer::{KillerTable, KILLER_SLOTS};
pub use limits::{SearchLimits, TimePoint};
pub use movepicker::{MovePicker, Stage};
pub use pv::PvTable;
#[cfg(feature = "search-stats")]
pub use stats::SearchStats;
pub use time_manager::{allocate, HardDeadline, SearchSignals, TimeManager};
pub use time_options::TimeOptions;
