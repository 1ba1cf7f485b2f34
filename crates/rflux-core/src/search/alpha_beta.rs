//! Alpha-Beta探索の実装
//!
//! - Principal Variation Search (PVS)
//! - 置換表によるカットと指し手ヒント
//! - Mate Distance Pruning
//! - Null Move Pruning（検証つき）と詰めろ検出
//! - Internal Iterative Deepening
//! - Futility / Extended Futility Pruning
//! - Late Move Reduction（再探索つき）
//! - 延長（取り返し・王手・7段目の歩・唯一の回避手・詰めろ）

use std::sync::Arc;

use crate::eval::{Evaluator, MaterialEvaluator};
use crate::position::Position;
use crate::tt::TranspositionTable;
use crate::types::{Bound, Color, Depth, Move, PieceType, Value, MAX_DEPTH, MAX_PLY};

use super::history::HistoryTable;
use super::info::{NullSink, Reporter};
use super::killer::KillerTable;
use super::movepicker::MovePicker;
use super::pruning::{
    futility_margin, futility_value, is_quiet_candidate, null_move_allowed, NullMoveOutcome,
    IID_MIN_DEPTH, LMR_MIN_DEPTH, LMR_MIN_SEARCHED,
};
use super::pv::PvTable;
use super::root_search::{IterationResult, ASPIRATION_ADJUSTMENTS, ASPIRATION_WINDOW};
#[cfg(feature = "search-stats")]
use super::stats::SearchStats;
use super::stats::inc_stat;
use super::time_manager::{HardDeadline, SearchSignals, TimeManager};
use super::{SearchConfig, SearchLimits, TimeOptions, TimePoint};

/// 深さごとの所要時間テーブルの長さ（次の深さも引けるよう2つ余分に持つ）
pub(super) const TIME_TABLE_SIZE: usize = MAX_DEPTH as usize + 2;

/// IID で窓を外したときに広げる量（その次は全幅）
const IID_ASPIRATION_ADJUSTMENT: i32 = ASPIRATION_ADJUSTMENTS[0];

// =============================================================================
// SearchWorker
// =============================================================================

/// 探索ワーカー
///
/// 置換表・killer・history・評価関数を所有し、探索スレッド上で1回の探索を実行する。
/// 探索中は探索スレッドだけがこれらを読み書きする。
pub struct SearchWorker {
    // =========================================================================
    // 探索をまたいで保持する状態
    // =========================================================================
    /// 置換表
    pub(super) tt: TranspositionTable,
    pub(super) killers: KillerTable,
    pub(super) history: HistoryTable,
    pub(super) evaluator: Box<dyn Evaluator>,
    pub(super) config: SearchConfig,
    pub(super) time_options: TimeOptions,
    /// 深さごとの反復の平均所要時間（ミリ秒、0は未計測）
    pub(super) time_table: [TimePoint; TIME_TABLE_SIZE],
    /// 呼び出し側と共有するフラグ
    pub(super) signals: Arc<SearchSignals>,

    // =========================================================================
    // 1回の探索の状態
    // =========================================================================
    pub(super) limits: SearchLimits,
    pub(super) us: Color,
    pub(super) time: TimeManager,
    pub(super) deadline: Option<HardDeadline>,
    pub(super) reporter: Reporter,
    pub(super) pv: PvTable,
    /// ノード数制限（0なら無制限）
    pub(super) node_limit: u64,
    /// 弱い成りも読み、置換表の世代を探索ごとに進める
    pub(super) analyze_mode: bool,
    /// 最後に完了した反復の結果
    pub(super) best: Option<IterationResult>,
    /// ルートの手の数
    pub(super) root_move_count: usize,

    #[cfg(feature = "search-stats")]
    pub(super) stats: SearchStats,
}

impl SearchWorker {
    /// 素材評価を使うワーカーを作成
    pub fn new(config: SearchConfig, signals: Arc<SearchSignals>) -> Self {
        Self::with_evaluator(config, signals, Box::new(MaterialEvaluator::new()))
    }

    pub fn with_evaluator(
        config: SearchConfig,
        signals: Arc<SearchSignals>,
        evaluator: Box<dyn Evaluator>,
    ) -> Self {
        let time_options = TimeOptions::default();
        let limits = SearchLimits::default();
        let time = TimeManager::new(&limits, Color::White, &time_options);
        Self {
            tt: TranspositionTable::new(config.hash_mb),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            evaluator,
            config,
            time_options,
            time_table: [0; TIME_TABLE_SIZE],
            signals,
            limits,
            us: Color::White,
            time,
            deadline: None,
            reporter: Reporter::new(Box::new(NullSink)),
            pv: PvTable::new(),
            node_limit: 0,
            analyze_mode: false,
            best: None,
            root_move_count: 0,
            #[cfg(feature = "search-stats")]
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// 設定を差し替える（置換表サイズが変われば作り直す）
    pub fn set_config(&mut self, config: SearchConfig) {
        if config.hash_mb != self.config.hash_mb {
            self.tt.resize(config.hash_mb);
        }
        self.config = config;
    }

    pub fn time_options(&self) -> TimeOptions {
        self.time_options
    }

    pub fn set_time_options(&mut self, options: TimeOptions) {
        self.time_options = options;
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// 新しい対局の開始（置換表・所要時間テーブル・評価キャッシュを消去）
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.time_table = [0; TIME_TABLE_SIZE];
        self.killers.clear();
        self.history.clear();
        self.evaluator.new_game();
    }

    #[cfg(feature = "search-stats")]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    // =========================================================================
    // 通常探索
    // =========================================================================

    /// 通常探索ノード
    ///
    /// 深さが尽きたら静止探索に入る。`do_null` は null move を試してよいか
    /// （null move 直後と検証探索では false）。
    #[allow(clippy::too_many_arguments)]
    pub(super) fn search_node(
        &mut self,
        pos: &mut Position,
        depth: Depth,
        mut alpha: Value,
        mut beta: Value,
        ply: usize,
        pv_node: bool,
        do_null: bool,
    ) -> Value {
        if depth <= 0 {
            return self.quiescence(pos, 0, alpha, beta, ply, pv_node, true);
        }

        self.pv.clear(ply);
        self.update_search(ply);
        inc_stat!(self, nodes_searched);

        if self.aborted() || ply >= MAX_PLY {
            return self.evaluator.evaluate(pos);
        }

        if pos.is_repetition() || pos.half_move_clock() >= 100 {
            return Value::DRAW;
        }

        if self.config.use_mate_distance_pruning {
            alpha = alpha.max(Value::mated_in(ply as i32));
            if alpha >= beta {
                return alpha;
            }
            beta = beta.min(Value::mate_in(ply as i32 + 1));
            if beta <= alpha {
                return beta;
            }
        }

        // =====================================================================
        // 置換表
        // =====================================================================
        let mut tt_move = Move::NONE;
        let mut mate_threat = false;
        if self.config.use_transposition_table {
            if let Some(entry) = self.tt.get(pos.key()) {
                tt_move = entry.mv();
                mate_threat = entry.mate_threat();

                if !pv_node && entry.depth() >= depth {
                    // 境界の種類に応じて窓を狭め、閉じればそこで返す
                    let value = entry.value(ply as i32);
                    match entry.bound() {
                        Bound::Exact => {
                            inc_stat!(self, tt_cutoff);
                            return value;
                        }
                        Bound::Lower => alpha = alpha.max(value),
                        Bound::Upper => beta = beta.min(value),
                        Bound::None => {}
                    }
                    if alpha >= beta {
                        inc_stat!(self, tt_cutoff);
                        return value;
                    }
                }
            }
        }

        let in_check = pos.attack(pos.side_to_move()).is_check();
        let mut static_eval: Option<Value> = None;

        // =====================================================================
        // Null Move Pruning
        // =====================================================================
        if self.config.use_null_move_pruning
            && null_move_allowed(pos, pv_node, depth, do_null, in_check, mate_threat)
        {
            let eval = self.evaluator.evaluate(pos);
            static_eval = Some(eval);
            match self.try_null_move_pruning(pos, depth, alpha, beta, ply, eval, mate_threat) {
                NullMoveOutcome::Cutoff(value) => return value,
                NullMoveOutcome::Continue { mate_threat: threat } => mate_threat = threat,
            }
        }

        // =====================================================================
        // Internal Iterative Deepening
        // =====================================================================
        if self.config.use_internal_iterative_deepening
            && pv_node
            && depth >= IID_MIN_DEPTH
            && tt_move.is_none()
        {
            inc_stat!(self, iid_applied);
            match self.internal_iterative_deepening(pos, depth, ply) {
                Some(mv) => tt_move = mv,
                None if self.aborted() => return alpha,
                None => {}
            }
        }

        // =====================================================================
        // 指し手ループ
        // =====================================================================
        let killers = self.killers.get(ply);
        let mut picker = MovePicker::new(pos, tt_move, killers, &self.history);
        let single_reply = in_check && picker.evasion_count() == 1;

        let mut best_value = -Value::INFINITE;
        let mut best_move = Move::NONE;
        let mut bound = Bound::Upper;
        let mut searched = 0usize;

        loop {
            let mv = picker.next_move(pos, &self.history);
            if mv.is_none() {
                break;
            }

            // 解析モード以外では弱い成りを読まない
            if self.config.use_minor_promotion_pruning
                && !self.analyze_mode
                && matches!(mv.promotion(), Some(pt) if pt != PieceType::Queen)
            {
                continue;
            }

            let mut new_depth = self.new_depth(pos, depth, mv, single_reply, mate_threat);

            // -----------------------------------------------------------------
            // Futility Pruning（frontier / pre-frontier）
            // -----------------------------------------------------------------
            if !pv_node && !in_check {
                let margin = futility_margin(
                    depth,
                    new_depth,
                    self.config.use_futility_pruning,
                    self.config.use_extended_futility_pruning,
                );
                if let Some(margin) = margin {
                    if is_quiet_candidate(pos, mv, self.config.use_check_extension) {
                        let eval = match static_eval {
                            Some(eval) => eval,
                            None => {
                                let eval = self.evaluator.evaluate(pos);
                                static_eval = Some(eval);
                                eval
                            }
                        };
                        let value = futility_value(eval, margin, mv);
                        if value <= alpha {
                            inc_stat!(self, futility_pruned);
                            best_value = best_value.max(value);
                            continue;
                        }
                    }
                }
            }

            // -----------------------------------------------------------------
            // Late Move Reduction
            // -----------------------------------------------------------------
            let mut reduced = false;
            if self.config.use_late_move_reduction
                && !pv_node
                && searched >= LMR_MIN_SEARCHED
                && depth >= LMR_MIN_DEPTH
                && new_depth < depth
                && !in_check
                && !mv.is_capture()
                && is_quiet_candidate(pos, mv, self.config.use_check_extension)
            {
                inc_stat!(self, lmr_applied);
                new_depth -= 1;
                reduced = true;
            }

            pos.make_move(mv);

            // -----------------------------------------------------------------
            // Principal Variation Search
            // -----------------------------------------------------------------
            let mut value;
            if !pv_node || best_value == -Value::INFINITE {
                value = -self.search_node(pos, new_depth, -beta, -alpha, ply + 1, pv_node, true);
            } else {
                let probe_depth = if new_depth >= depth { depth - 1 } else { new_depth };
                value =
                    -self.search_node(pos, probe_depth, -alpha - 1, -alpha, ply + 1, false, true);
                if value > alpha && value < beta {
                    value = -self.search_node(pos, new_depth, -beta, -alpha, ply + 1, true, true);
                }
            }

            // LMR で β を超えたら元の深さで読み直す
            if self.config.use_late_move_reduction_research && reduced && value >= beta {
                inc_stat!(self, lmr_research);
                new_depth += 1;
                value = -self.search_node(pos, new_depth, -beta, -alpha, ply + 1, pv_node, true);
            }

            pos.undo_move(mv);

            if self.aborted() {
                break;
            }

            searched += 1;

            if value > best_value {
                best_value = value;
                best_move = mv;
                self.pv.update(ply, mv);

                if value > alpha {
                    bound = Bound::Exact;
                    alpha = value;

                    if value >= beta {
                        bound = Bound::Lower;
                        inc_stat!(self, cutoffs);
                        if searched == 1 {
                            inc_stat!(self, first_move_cutoffs);
                        }
                        break;
                    }
                }
            }
        }

        // 合法手なし：詰みかステイルメイト
        if best_value == -Value::INFINITE {
            bound = Bound::Exact;
            best_value = if in_check {
                Value::mated_in(ply as i32)
            } else {
                Value::DRAW
            };
        }

        if !self.aborted() {
            if best_move.is_some() {
                self.update_quiet_stats(best_move, depth, ply);
            }
            if self.config.use_transposition_table {
                self.tt.put(
                    pos.key(),
                    depth,
                    best_value,
                    bound,
                    best_move,
                    mate_threat,
                    ply as i32,
                );
            }
        }

        best_value
    }

    /// Internal Iterative Deepening
    ///
    /// 深さ1から `depth - 1` まで浅い探索を繰り返し、このノードの最善手を得る。
    /// 各深さは前回の値の周りの窓で探索し、外れたら外れた側を一度広げ、
    /// それでも外れたら全幅で探索し直す。打ち切られたら `None`。
    pub(super) fn internal_iterative_deepening(
        &mut self,
        pos: &mut Position,
        depth: Depth,
        ply: usize,
    ) -> Option<Move> {
        let mut alpha = -Value::MATE;
        let mut beta = Value::MATE;

        for iid_depth in 1..depth {
            let mut value = self.search_node(pos, iid_depth, alpha, beta, ply, true, false);
            if self.aborted() {
                return None;
            }
            if !self.config.use_aspiration_window {
                continue;
            }

            if value <= alpha || value >= beta {
                if value <= alpha {
                    alpha = (alpha - IID_ASPIRATION_ADJUSTMENT).max(-Value::MATE);
                } else {
                    beta = (beta + IID_ASPIRATION_ADJUSTMENT).min(Value::MATE);
                }
                value = self.search_node(pos, iid_depth, alpha, beta, ply, true, false);
                if self.aborted() {
                    return None;
                }
                if value <= alpha || value >= beta {
                    value = self.search_node(
                        pos,
                        iid_depth,
                        -Value::MATE,
                        Value::MATE,
                        ply,
                        true,
                        false,
                    );
                    if self.aborted() {
                        return None;
                    }
                }
            }
            alpha = (value - ASPIRATION_WINDOW).max(-Value::MATE);
            beta = (value + ASPIRATION_WINDOW).min(Value::MATE);
        }

        let best = self.pv.first(ply);
        self.pv.clear(ply);
        best
    }
}
