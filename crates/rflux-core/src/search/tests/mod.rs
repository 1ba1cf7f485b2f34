//! 探索のテスト
//!
//! 探索はスタックを大きく消費するため、ワーカーを使うテストは別スレッドで実行する。

mod alpha_beta;

use std::sync::{Arc, Mutex};
use std::thread;

use crate::position::Position;
use crate::search::{
    SearchConfig, SearchEvent, SearchLimits, SearchOutcome, SearchSignals, SearchWorker,
};

const STACK_SIZE: usize = 64 * 1024 * 1024;

/// 大きなスタックのスレッドで `f` を実行する
pub(super) fn with_stack<F>(f: F)
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

/// 1回探索して、結果と受け取ったイベントを返す
pub(super) fn run_search(
    worker: &mut SearchWorker,
    fen: &str,
    limits: SearchLimits,
) -> (SearchOutcome, Vec<SearchEvent>) {
    let mut pos = Position::from_fen(fen).unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let collected = Arc::clone(&events);
    let outcome = worker.run(
        &mut pos,
        limits,
        Box::new(move |e: SearchEvent| collected.lock().unwrap().push(e)),
    );
    let events = events.lock().unwrap().clone();
    (outcome, events)
}

pub(super) fn new_worker(config: SearchConfig) -> SearchWorker {
    SearchWorker::new(config, SearchSignals::new())
}
