//! ルート探索と反復深化
//!
//! - ルートの手の生成と並べ替え（前回の反復の値順、最善手を先頭に）
//! - Aspiration Window（外れたら段階的に広げて再探索）
//! - MultiPV
//! - 反復ごとの時間判断（次の反復が収まるか、簡単な取り返し、詰み、唯一の手）
//! - ponderhit の反映
//!
//! 最初の反復が完了するまでは停止要求に従わない。
//! 途中で打ち切られた反復の結果は捨て、最後に完了した反復の結果を返す。

use std::time::Instant;

use log::{debug, info, warn};

use crate::movegen::generate_legal;
use crate::position::Position;
use crate::types::{Bound, Depth, Move, PieceType, Value, MAX_DEPTH};

use super::alpha_beta::SearchWorker;
use super::engine::SearchOutcome;
use super::info::{InfoSink, Reporter, SearchInfo};
use super::movepicker::MovePicker;
use super::time_manager::{HardDeadline, TimeManager};
use super::{SearchLimits, TimePoint};

/// Aspiration Window の初期幅
pub(super) const ASPIRATION_WINDOW: i32 = 20;

/// 窓を外したときに広げる量（最後は全幅）
pub(super) const ASPIRATION_ADJUSTMENTS: [i32; 7] =
    [20, 20, 40, 80, 160, 320, Value::MATE.raw()];

/// 反復間でこれ以上値が動いたら時間を延長する
const TIME_EXTENSION_MARGIN: i32 = 30;

/// 同じ最善手がこの回数を超えて続いた取り返しは即指しする
const EASY_RECAPTURE_STABILITY: u32 = 4;

// =============================================================================
// IterationResult
// =============================================================================

/// 完了した1回の反復の結果
#[derive(Debug, Clone, Copy)]
pub(super) struct IterationResult {
    pub best_move: Move,
    pub ponder_move: Move,
    pub value: Value,
    pub bound: Bound,
    pub depth: Depth,
    /// 反復の所要時間（ミリ秒）
    pub time: TimePoint,
}

impl IterationResult {
    /// 詰みスコアで、その手数を読み切っているか
    fn mate_within_depth(&self) -> bool {
        self.value.is_mate_score() && self.depth >= Value::MATE.raw() - self.value.raw().abs()
    }
}

/// ルートの手と並べ替えキー
#[derive(Debug, Clone, Copy)]
struct RootMove {
    mv: Move,
    sort_value: Value,
}

// =============================================================================
// 探索の入口
// =============================================================================

impl SearchWorker {
    /// 1回の探索を実行する
    ///
    /// 進行状況と最終結果は `sink` に送られる。停止は共有フラグで要求する。
    pub fn run(
        &mut self,
        pos: &mut Position,
        limits: SearchLimits,
        sink: Box<dyn InfoSink>,
    ) -> SearchOutcome {
        self.prepare(pos, limits, sink);
        debug!(
            "search start: fen={} limits={:?} soft={} hard={} analyze={}",
            pos.to_fen(),
            self.limits,
            self.time.soft(),
            self.time.hard(),
            self.analyze_mode
        );

        let outcome = self.iterative_deepening(pos);
        self.deadline = None;

        let hashfull = self.tt.hashfull();
        self.reporter.send_summary(hashfull);
        let (best, ponder) = match outcome {
            SearchOutcome::BestMove { best, ponder, .. } => (Some(best), ponder),
            _ => (None, None),
        };
        self.reporter.send_best_move(best, ponder);

        info!(
            "search finished: depth={} nodes={} time={}ms nps={} hashfull={} outcome={:?}",
            self.reporter.depth(),
            self.reporter.nodes(),
            self.reporter.elapsed_ms(),
            self.reporter.nps(),
            hashfull,
            outcome
        );
        #[cfg(feature = "search-stats")]
        debug!("{}", self.stats.format_report());

        outcome
    }

    /// 探索ごとの状態を初期化し、時間配分とタイマーを設定する
    fn prepare(&mut self, pos: &Position, limits: SearchLimits, sink: Box<dyn InfoSink>) {
        self.us = pos.side_to_move();
        self.analyze_mode = self.config.analyze_mode || limits.infinite;
        if self.analyze_mode {
            self.tt.increase_age();
        }
        self.node_limit = limits.nodes;
        self.time = TimeManager::new(&limits, self.us, &self.time_options);
        self.limits = limits;

        self.killers.clear();
        self.history.clear();
        self.pv.clear_all();
        self.reporter = Reporter::new(sink);
        self.best = None;
        self.root_move_count = 0;
        #[cfg(feature = "search-stats")]
        self.stats.reset();

        self.deadline = None;
        self.arm_deadline();
    }

    /// hard リミットのタイマーを仕掛ける
    fn arm_deadline(&mut self) {
        let hard = self.time.hard();
        if hard <= 0 {
            return;
        }
        match HardDeadline::arm(hard, self.signals.clone()) {
            Ok(deadline) => self.deadline = Some(deadline),
            Err(e) => warn!("failed to start search timer: {e}"),
        }
    }

    /// ponderhit: 時間管理を開始し、既に結論が出ていれば止める
    pub(super) fn on_ponderhit(&mut self) {
        debug!("ponderhit after {} ms", self.reporter.elapsed_ms());
        self.time.enable(&self.limits, self.us, &self.time_options);
        self.deadline = None;
        self.arm_deadline();

        if let Some(best) = self.best {
            self.signals.allow_stop();
            if best.mate_within_depth() || self.root_move_count == 1 {
                self.signals.request_stop();
            }
        }
    }

    // =========================================================================
    // 反復深化
    // =========================================================================

    fn iterative_deepening(&mut self, pos: &mut Position) -> SearchOutcome {
        let in_check = pos.attack(self.us).is_check();
        let mut root_moves = self.generate_root_moves(pos);
        self.root_move_count = root_moves.len();

        if root_moves.is_empty() {
            debug!("no legal move at root (in_check={in_check})");
            return SearchOutcome::NoLegalMove { in_check };
        }

        let multi_pv = self.config.multi_pv.clamp(1, root_moves.len());
        let max_depth = if self.limits.depth > 0 {
            self.limits.depth.min(MAX_DEPTH)
        } else {
            MAX_DEPTH
        };

        let mut lines: Vec<SearchInfo> = Vec::new();
        let mut alpha = -Value::MATE;
        let mut beta = Value::MATE;
        let mut equal_results = 0u32;

        for depth in 1..=max_depth {
            self.reporter.start_iteration(depth);
            let started = Instant::now();

            let mut result =
                self.search_root(pos, &mut root_moves, &mut lines, depth, alpha, beta, in_check);

            if self.config.use_aspiration_window && multi_pv <= 1 && !self.aborted() {
                for widen in ASPIRATION_ADJUSTMENTS {
                    if result.value > alpha && result.value < beta {
                        break;
                    }
                    alpha = (alpha - widen).max(-Value::MATE);
                    beta = (beta + widen).min(Value::MATE);
                    debug!(
                        "depth {depth}: aspiration re-search [{}, {}]",
                        alpha.raw(),
                        beta.raw()
                    );
                    result = self.search_root(
                        pos,
                        &mut root_moves,
                        &mut lines,
                        depth,
                        alpha,
                        beta,
                        in_check,
                    );
                    if self.aborted() {
                        break;
                    }
                }
                alpha = (result.value - ASPIRATION_WINDOW).max(-Value::MATE);
                beta = (result.value + ASPIRATION_WINDOW).min(Value::MATE);
            }

            if self.aborted() {
                debug!("depth {depth} aborted, keeping the previous iteration");
                break;
            }

            result.time = started.elapsed().as_millis() as TimePoint;
            self.record_iteration_time(depth, result.time);

            if result.best_move.is_none() {
                break;
            }

            let previous = self.best;
            equal_results = match previous {
                Some(prev) if prev.best_move == result.best_move => equal_results + 1,
                _ => 0,
            };

            let stop = self.time.enabled()
                && self.should_stop(pos, &result, previous.map(|p| p.value), equal_results);

            result.ponder_move = self.pv.line(0).get(1).copied().unwrap_or(Move::NONE);
            self.best = Some(result);
            debug!(
                "depth {depth} done: best={} value={} bound={:?} time={}ms nodes={}",
                result.best_move,
                result.value.raw(),
                result.bound,
                result.time,
                self.reporter.nodes()
            );

            if stop {
                break;
            }

            // 最初の反復が完了したので停止要求に従ってよい
            self.signals.allow_stop();
            if self.signals.take_ponderhit() {
                self.on_ponderhit();
            }
            if self.signals.stop_requested() {
                break;
            }
        }

        match self.best {
            Some(best) => SearchOutcome::BestMove {
                best: best.best_move,
                ponder: best.ponder_move.is_some().then_some(best.ponder_move),
                value: best.value,
                depth: best.depth,
            },
            None => SearchOutcome::Stopped,
        }
    }

    /// 反復を終えた後、次の反復に入らず指すべきか
    fn should_stop(
        &mut self,
        pos: &Position,
        result: &IterationResult,
        previous_value: Option<Value>,
        equal_results: u32,
    ) -> bool {
        let depth = result.depth as usize;
        let extended = match previous_value {
            Some(prev) => (result.value - prev).raw().abs() > TIME_EXTENSION_MARGIN,
            None => true,
        } || equal_results < 1;

        let next = match self.time_table[depth + 1] {
            0 => result.time * 2,
            t => t,
        };

        if self.time.exceeds_hard(next) {
            debug!("stop: next iteration ({next} ms) would exceed the hard limit");
            self.adjust_time_table(depth);
            return true;
        }
        if !extended && self.time.exceeds_soft(next) {
            debug!("stop: next iteration ({next} ms) would exceed the soft limit");
            self.adjust_time_table(depth);
            return true;
        }
        if !extended
            && pos.capture_square() == Some(result.best_move.to())
            && result.best_move.captured().value() >= PieceType::Knight.value()
            && equal_results > EASY_RECAPTURE_STABILITY
        {
            debug!("stop: easy recapture {}", result.best_move);
            return true;
        }
        if result.mate_within_depth() {
            debug!("stop: mate found at depth {}", result.depth);
            return true;
        }
        if self.root_move_count == 1 {
            debug!("stop: single legal move");
            return true;
        }
        false
    }

    /// 深さごとの所要時間を記録する（深さ1は計測誤差が大きいので除く）
    fn record_iteration_time(&mut self, depth: Depth, time: TimePoint) {
        let depth = depth as usize;
        if depth <= 1 {
            return;
        }
        self.time_table[depth] = match self.time_table[depth] {
            0 => time,
            t => (t + time) / 2,
        };
    }

    /// 時間切れで打ち切ったとき、深い反復の見積もりを補正する
    fn adjust_time_table(&mut self, depth: usize) {
        if depth <= 1 {
            for t in self.time_table.iter_mut().skip(depth + 1) {
                *t = 0;
            }
        } else {
            for i in depth + 1..self.time_table.len() {
                self.time_table[i] = (self.time_table[i] + self.time_table[i - 1] * 2) / 2;
            }
        }
    }

    // =========================================================================
    // ルート
    // =========================================================================

    /// ルートの手を生成する（`search_moves` が指定されていればその合法手だけ）
    fn generate_root_moves(&mut self, pos: &mut Position) -> Vec<RootMove> {
        let root = |mv| RootMove {
            mv,
            sort_value: -Value::INFINITE,
        };

        if !self.limits.search_moves.is_empty() {
            let legal = generate_legal(pos);
            let mut moves = Vec::with_capacity(self.limits.search_moves.len());
            for &mv in &self.limits.search_moves {
                if legal.contains(mv) {
                    moves.push(root(mv));
                } else {
                    warn!("ignoring illegal search move {mv}");
                }
            }
            return moves;
        }

        let tt_move = match self.tt.get(pos.key()) {
            Some(entry) if self.config.use_transposition_table => entry.mv(),
            _ => Move::NONE,
        };
        let mut picker = MovePicker::new(pos, tt_move, [Move::NONE; 2], &self.history);
        let mut moves = Vec::new();
        loop {
            let mv = picker.next_move(pos, &self.history);
            if mv.is_none() {
                break;
            }
            moves.push(root(mv));
        }
        moves
    }

    /// ルートノードの探索
    ///
    /// 読み筋は手ごとに通知する。MultiPV では各手を全幅の窓で読み、上位 N 本を送る。
    /// 終わったら値順に並べ替え、最善手を先頭に置く。
    #[allow(clippy::too_many_arguments)]
    fn search_root(
        &mut self,
        pos: &mut Position,
        root_moves: &mut [RootMove],
        lines: &mut Vec<SearchInfo>,
        depth: Depth,
        mut alpha: Value,
        beta: Value,
        in_check: bool,
    ) -> IterationResult {
        self.pv.clear(0);
        self.reporter.count_node(0);

        let multi_pv = self.config.multi_pv.clamp(1, root_moves.len());
        let old_alpha = alpha;
        let single_reply = in_check && root_moves.len() == 1;

        let mut best_value = -Value::INFINITE;
        let mut best_move = Move::NONE;
        let mut bound = Bound::Upper;
        let mut first_info: Option<SearchInfo> = None;
        let mut best_info: Option<SearchInfo> = None;

        for index in 0..root_moves.len() {
            let mv = root_moves[index].mv;
            self.reporter.current_move(mv, index + 1);

            let new_depth = self.new_depth(pos, depth, mv, single_reply, false);

            pos.make_move(mv);
            let mut value;
            if best_value == -Value::INFINITE {
                value = -self.search_node(pos, new_depth, -beta, -alpha, 1, true, true);
            } else {
                value = -self.search_node(pos, new_depth, -alpha - 1, -alpha, 1, false, true);
                if value > alpha && value < beta {
                    value = -self.search_node(pos, new_depth, -beta, -alpha, 1, true, true);
                }
            }
            pos.undo_move(mv);

            if self.aborted() {
                break;
            }

            let (value, move_bound, sort_value) = if value <= alpha {
                (alpha, Bound::Upper, old_alpha)
            } else if value >= beta {
                (beta, Bound::Lower, beta)
            } else {
                (value, Bound::Exact, value)
            };
            root_moves[index].sort_value = sort_value;

            let mut line = Vec::with_capacity(self.pv.line(1).len() + 1);
            line.push(mv);
            line.extend_from_slice(self.pv.line(1));
            let hashfull = self.tt.hashfull();
            let info = self.reporter.make_info(1, value, move_bound, line, hashfull);

            if multi_pv > 1 {
                self.report_multi_pv(lines, info.clone(), index, multi_pv);
            }
            if first_info.is_none() {
                first_info = Some(info.clone());
            }

            if value > best_value {
                best_value = value;
                best_move = mv;
                self.pv.update(0, mv);

                if value > alpha {
                    bound = Bound::Exact;
                    alpha = value;
                    if depth > 1 && multi_pv <= 1 {
                        self.reporter.send_pv(info.clone());
                    }
                    best_info = Some(info);

                    if value >= beta {
                        bound = Bound::Lower;
                        break;
                    }
                }
            }

            if multi_pv > 1 {
                alpha = old_alpha;
            }
        }

        if !self.aborted() {
            if self.config.use_transposition_table && best_move.is_some() {
                self.tt.put(pos.key(), depth, best_value, bound, best_move, false, 0);
            }

            if multi_pv <= 1 {
                // 深さ1は最善手だけ、全手 fail-low なら先頭の手の読み筋を送る
                let report = if depth == 1 || best_info.is_none() {
                    best_info.or(first_info)
                } else {
                    None
                };
                if let Some(info) = report {
                    self.reporter.send_pv(info);
                }
            }

            for root_move in root_moves.iter_mut() {
                if root_move.mv == best_move {
                    root_move.sort_value = Value::INFINITE;
                }
            }
            root_moves.sort_by(|a, b| b.sort_value.cmp(&a.sort_value));
        }

        IterationResult {
            best_move,
            ponder_move: Move::NONE,
            value: best_value,
            bound,
            depth,
            time: 0,
        }
    }

    /// MultiPV の読み筋を更新し、上位に入っていれば上位 N 本をまとめて送る
    fn report_multi_pv(
        &mut self,
        lines: &mut Vec<SearchInfo>,
        info: SearchInfo,
        index: usize,
        multi_pv: usize,
    ) {
        let mv = info.pv[0];
        match lines.iter_mut().find(|l| l.pv.first() == Some(&mv)) {
            Some(line) => *line = info,
            None => lines.push(info),
        }
        lines.sort_by(|a, b| b.value.cmp(&a.value));

        let rank = lines.iter().position(|l| l.pv.first() == Some(&mv)).unwrap_or(0);
        if index < multi_pv || rank < multi_pv {
            for (n, line) in lines.iter().take(multi_pv).enumerate() {
                let mut line = line.clone();
                line.multi_pv = n + 1;
                self.reporter.send_pv(line);
            }
        }
    }
}
