//! 探索スレッドの管理
//!
//! `Search` は探索ワーカーを所有し、`start` で専用スレッドに渡して探索させる。
//! 探索が終わるとワーカーは `wait` で手元に戻り、置換表などは次の探索に引き継がれる。

use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};
use thiserror::Error;

use crate::eval::Evaluator;
use crate::position::Position;
use crate::types::{Depth, Move, Value};

use super::alpha_beta::SearchWorker;
use super::info::InfoSink;
use super::time_manager::SearchSignals;
use super::{SearchConfig, SearchLimits, TimeOptions};

/// 探索スレッドのスタックサイズ
///
/// 探索は最大 MAX_PLY まで再帰するため、既定のスタックでは足りない。
const SEARCH_STACK_SIZE: usize = 64 * 1024 * 1024;

/// 探索の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// 最後に完了した反復の最善手
    BestMove {
        best: Move,
        ponder: Option<Move>,
        value: Value,
        depth: Depth,
    },
    /// ルートに合法手がない（王手なら詰み、そうでなければステイルメイト）
    NoLegalMove { in_check: bool },
    /// 1回も反復を完了できなかった
    Stopped,
}

impl SearchOutcome {
    pub fn best_move(&self) -> Option<Move> {
        match self {
            SearchOutcome::BestMove { best, .. } => Some(*best),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("a search is already running")]
    AlreadyRunning,
    #[error("failed to spawn search thread: {0}")]
    Spawn(#[from] io::Error),
}

type SearchHandle = JoinHandle<(Box<SearchWorker>, SearchOutcome)>;

/// 探索のハンドル
///
/// 同時に走る探索は1つだけ。探索中の停止・ponderhit は共有フラグで伝える。
pub struct Search {
    signals: Arc<SearchSignals>,
    /// 探索していない間のワーカー（探索中は探索スレッドが所有する）
    worker: Option<Box<SearchWorker>>,
    handle: Option<SearchHandle>,
    /// 直前の探索結果（`wait` で未回収のまま次の操作が来たとき用）
    last_outcome: Option<SearchOutcome>,
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl Search {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        let signals = SearchSignals::new();
        let worker = Box::new(SearchWorker::new(config, Arc::clone(&signals)));
        Self::from_worker(signals, worker)
    }

    pub fn with_evaluator(config: SearchConfig, evaluator: Box<dyn Evaluator>) -> Self {
        let signals = SearchSignals::new();
        let worker = SearchWorker::with_evaluator(config, Arc::clone(&signals), evaluator);
        Self::from_worker(signals, Box::new(worker))
    }

    fn from_worker(signals: Arc<SearchSignals>, worker: Box<SearchWorker>) -> Self {
        Self {
            signals,
            worker: Some(worker),
            handle: None,
            last_outcome: None,
        }
    }

    /// 探索を開始する（すぐに戻る）
    ///
    /// 局面は複製して探索スレッドに渡す。
    pub fn start(
        &mut self,
        pos: &Position,
        limits: SearchLimits,
        sink: Box<dyn InfoSink>,
    ) -> Result<(), SearchError> {
        if self.handle.is_some() {
            return Err(SearchError::AlreadyRunning);
        }
        let Some(mut worker) = self.worker.take() else {
            return Err(SearchError::AlreadyRunning);
        };

        self.signals.reset();
        self.last_outcome = None;
        let config = worker.config().clone();
        let mut pos = pos.clone();

        let spawned = thread::Builder::new()
            .name("rflux-search".to_string())
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                let outcome = worker.run(&mut pos, limits, sink);
                (worker, outcome)
            });

        match spawned {
            Ok(handle) => {
                debug!("search thread started");
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                // spawn に失敗するとクロージャごとワーカーが失われるので作り直す
                let worker = SearchWorker::new(config, Arc::clone(&self.signals));
                self.worker = Some(Box::new(worker));
                Err(SearchError::Spawn(e))
            }
        }
    }

    /// 停止を要求して探索の終了を待つ
    ///
    /// 最初の反復が完了するまでは停止は保留される。
    pub fn stop(&mut self) -> SearchOutcome {
        if self.handle.is_none() {
            warn!("stop requested while no search is running");
        }
        self.signals.request_stop();
        self.wait()
    }

    /// 探索の終了を待ち、結果を返す
    pub fn wait(&mut self) -> SearchOutcome {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok((worker, outcome)) => {
                    self.worker = Some(worker);
                    self.last_outcome = Some(outcome);
                }
                Err(_) => {
                    warn!("search thread panicked");
                    let config = SearchConfig::default();
                    self.worker =
                        Some(Box::new(SearchWorker::new(config, Arc::clone(&self.signals))));
                    self.last_outcome = Some(SearchOutcome::Stopped);
                }
            }
        }
        self.last_outcome.unwrap_or(SearchOutcome::Stopped)
    }

    /// ponder していた手が指された
    pub fn ponderhit(&self) {
        self.signals.ponderhit.store(true, Ordering::SeqCst);
    }

    /// 探索スレッドが動いているか
    pub fn is_searching(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 新しい対局（探索中なら止めてから）
    pub fn new_game(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
        if let Some(worker) = self.worker.as_mut() {
            worker.new_game();
        }
    }

    /// 設定を変更する（探索中なら終了を待ってから）
    pub fn set_config(&mut self, config: SearchConfig) {
        self.wait();
        if let Some(worker) = self.worker.as_mut() {
            worker.set_config(config);
        }
    }

    pub fn config(&self) -> Option<&SearchConfig> {
        self.worker.as_ref().map(|w| w.config())
    }

    pub fn set_time_options(&mut self, options: TimeOptions) {
        self.wait();
        if let Some(worker) = self.worker.as_mut() {
            worker.set_time_options(options);
        }
    }

    pub fn signals(&self) -> &Arc<SearchSignals> {
        &self.signals
    }
}

impl Drop for Search {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.signals.request_stop();
            self.signals.allow_stop();
            self.wait();
        }
    }
}
