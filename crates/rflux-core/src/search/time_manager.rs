//! 時間管理（TimeManager）
//!
//! 残り時間・インクリメント・moves_to_go から、1手に使う目安時間（soft）と
//! 打ち切り時間（hard）を計算する。hard は別スレッドのタイマーが停止フラグを立てて守る。

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use super::{SearchLimits, TimeOptions, TimePoint};
use crate::types::Color;

// =============================================================================
// SearchSignals
// =============================================================================

/// 探索スレッドと呼び出し側が共有するフラグ
#[derive(Debug, Default)]
pub struct SearchSignals {
    /// 停止要求
    pub stop: AtomicBool,
    /// 停止要求を受け付けてよいか（最初の反復が完了するまで false）
    pub may_stop: AtomicBool,
    /// ponderhit 通知
    pub ponderhit: AtomicBool,
}

impl SearchSignals {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 新しい探索の開始前にすべてのフラグを下ろす
    pub fn reset(&self) {
        self.stop.store(false, Ordering::SeqCst);
        self.may_stop.store(false, Ordering::SeqCst);
        self.ponderhit.store(false, Ordering::SeqCst);
    }

    #[inline]
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn allow_stop(&self) {
        self.may_stop.store(true, Ordering::SeqCst);
    }

    /// 停止要求があり、かつそれに従ってよい状態か
    #[inline]
    pub fn aborted(&self) -> bool {
        self.stop.load(Ordering::Relaxed) && self.may_stop.load(Ordering::Relaxed)
    }

    /// ponderhit 通知を取り出す（一度だけ true を返す）
    #[inline]
    pub fn take_ponderhit(&self) -> bool {
        self.ponderhit.swap(false, Ordering::SeqCst)
    }
}

// =============================================================================
// TimeManager
// =============================================================================

/// 1回の探索の時間配分
#[derive(Debug, Clone)]
pub struct TimeManager {
    start: Instant,
    /// 目安時間（ミリ秒）。次の反復がこれを超えそうなら打ち切る
    soft: TimePoint,
    /// 打ち切り時間（ミリ秒）。0ならタイマーなし
    hard: TimePoint,
    /// 反復ごとの時間判断を行うか
    enabled: bool,
}

impl TimeManager {
    /// 探索制限から時間配分を決める
    ///
    /// - 持ち時間制（ponder以外）: soft/hard を計算し、時間判断を有効にする
    /// - move_time: hard = move_time のタイマーのみ
    /// - depth / nodes / infinite / ponder: タイマーなし
    pub fn new(limits: &SearchLimits, us: Color, options: &TimeOptions) -> Self {
        let mut tm = Self {
            start: Instant::now(),
            soft: 0,
            hard: 0,
            enabled: false,
        };
        if limits.move_time > 0 {
            tm.soft = limits.move_time;
            tm.hard = limits.move_time;
        } else if limits.use_time_management() && !limits.ponder {
            tm.enable(limits, us, options);
        }
        tm
    }

    /// 時間判断を有効にし、配分を計算し直して計測を再開する（ponderhit）
    pub fn enable(&mut self, limits: &SearchLimits, us: Color, options: &TimeOptions) {
        let (soft, hard) =
            allocate(limits.time_left(us), limits.increment(us), limits.moves_to_go, options);
        self.soft = soft;
        self.hard = hard;
        self.enabled = true;
        self.start = Instant::now();
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn soft(&self) -> TimePoint {
        self.soft
    }

    #[inline]
    pub fn hard(&self) -> TimePoint {
        self.hard
    }

    /// 計測開始からの経過時間（ミリ秒）
    #[inline]
    pub fn elapsed(&self) -> TimePoint {
        self.start.elapsed().as_millis() as TimePoint
    }

    /// 次の反復に `next` ミリ秒かかるとき、hard を超えるか
    #[inline]
    pub fn exceeds_hard(&self, next: TimePoint) -> bool {
        self.hard < self.elapsed() + next
    }

    /// 次の反復に `next` ミリ秒かかるとき、soft を超えるか
    #[inline]
    pub fn exceeds_soft(&self, next: TimePoint) -> bool {
        self.soft < self.elapsed() + next
    }
}

/// 持ち時間から (soft, hard) を計算する
///
/// 持ち時間がなければ fallback と、その1.5倍を返す。
pub fn allocate(
    time_left: TimePoint,
    increment: TimePoint,
    moves_to_go: i32,
    options: &TimeOptions,
) -> (TimePoint, TimePoint) {
    if time_left <= 0 {
        let soft = options.fallback;
        return (soft, soft + soft / 2);
    }

    let moves_to_go: TimePoint = if (1..=options.moves_to_go).contains(&moves_to_go) {
        moves_to_go.into()
    } else {
        options.moves_to_go.into()
    };
    let increment = increment.max(0);

    let max_time = ((time_left as f64 * options.safety) as TimePoint - options.overhead).max(0);
    let pool = max_time + (moves_to_go - 1) * increment;

    let soft = (pool / moves_to_go).min(max_time);
    let hard = (pool / options.hard_divisor.max(1)).max(soft).min(max_time);
    (soft, hard)
}

// =============================================================================
// HardDeadline
// =============================================================================

/// hard リミットで停止フラグを立てるタイマー
///
/// drop すると解除される（タイマースレッドは即座に終了する）。
pub struct HardDeadline {
    cancel: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl HardDeadline {
    pub fn arm(after: TimePoint, signals: Arc<SearchSignals>) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<()>();
        let timeout = Duration::from_millis(after.max(0) as u64);
        let handle = thread::Builder::new().name("rflux-timer".to_string()).spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(timeout) {
                debug!("hard deadline reached after {} ms", timeout.as_millis());
                signals.request_stop();
            }
        })?;
        Ok(Self {
            cancel: Some(tx),
            handle: Some(handle),
        })
    }
}

impl Drop for HardDeadline {
    fn drop(&mut self) {
        // 送信側を落とすと recv_timeout が Disconnected で戻る
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_with_clock() {
        let opts = TimeOptions::default();
        // max = 60000 * 0.95 - 1000 = 56000
        let (soft, hard) = allocate(60_000, 0, 0, &opts);
        assert_eq!(soft, 56_000 / 40);
        assert_eq!(hard, 56_000 / 8);
    }

    #[test]
    fn test_allocate_with_increment() {
        let opts = TimeOptions::default();
        // pool = 56000 + 39 * 1000 = 95000
        let (soft, hard) = allocate(60_000, 1000, 0, &opts);
        assert_eq!(soft, 95_000 / 40);
        assert_eq!(hard, 95_000 / 8);
    }

    #[test]
    fn test_allocate_moves_to_go() {
        let opts = TimeOptions::default();
        // moves_to_go = 1: soft = max、hard も max で頭打ち
        let (soft, hard) = allocate(10_000, 0, 1, &opts);
        assert_eq!(soft, 8500);
        assert_eq!(hard, 8500);

        // 範囲外は40として扱う
        assert_eq!(allocate(60_000, 0, 100, &opts), allocate(60_000, 0, 0, &opts));
    }

    #[test]
    fn test_allocate_low_clock() {
        let opts = TimeOptions::default();
        let (soft, hard) = allocate(500, 0, 0, &opts);
        assert_eq!(soft, 0);
        assert_eq!(hard, 0);
    }

    #[test]
    fn test_allocate_without_clock() {
        let opts = TimeOptions::default();
        assert_eq!(allocate(0, 0, 0, &opts), (2000, 3000));
    }

    #[test]
    fn test_time_manager_modes() {
        let opts = TimeOptions::default();

        let tm = TimeManager::new(&SearchLimits::move_time(300), Color::White, &opts);
        assert!(!tm.enabled());
        assert_eq!(tm.hard(), 300);

        let tm = TimeManager::new(&SearchLimits::depth(4), Color::White, &opts);
        assert!(!tm.enabled());
        assert_eq!(tm.hard(), 0);

        let clock = SearchLimits {
            time: [60_000, 60_000],
            ..SearchLimits::default()
        };
        let tm = TimeManager::new(&clock, Color::Black, &opts);
        assert!(tm.enabled());
        assert_eq!(tm.soft(), 1400);

        let ponder = SearchLimits {
            ponder: true,
            ..clock.clone()
        };
        let mut tm = TimeManager::new(&ponder, Color::White, &opts);
        assert!(!tm.enabled());
        tm.enable(&ponder, Color::White, &opts);
        assert!(tm.enabled());
        assert_eq!(tm.soft(), 1400);
    }

    #[test]
    fn test_hard_deadline_sets_stop() {
        let signals = SearchSignals::new();
        let deadline = HardDeadline::arm(10, Arc::clone(&signals)).unwrap();
        let begin = Instant::now();
        while !signals.stop_requested() && begin.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(signals.stop_requested());
        drop(deadline);
    }

    #[test]
    fn test_hard_deadline_disarmed_on_drop() {
        let signals = SearchSignals::new();
        let deadline = HardDeadline::arm(60_000, Arc::clone(&signals)).unwrap();
        drop(deadline);
        assert!(!signals.stop_requested());
    }

    #[test]
    fn test_signals_abort_needs_may_stop() {
        let signals = SearchSignals::new();
        signals.request_stop();
        assert!(!signals.aborted());
        signals.allow_stop();
        assert!(signals.aborted());
        signals.reset();
        assert!(!signals.stop_requested());
        signals.ponderhit.store(true, Ordering::SeqCst);
        assert!(signals.take_ponderhit());
        assert!(!signals.take_ponderhit());
    }
}
