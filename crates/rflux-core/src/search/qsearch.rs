//! 静止探索（Quiescence Search）
//!
//! 探索の末端で、捕獲手（と最初の1手に限り王手になる静かな手）だけを読んで
//! 駒の取り合いが落ち着いた局面の評価値を返す。

use crate::position::Position;
use crate::types::{Bound, Depth, Move, Value, MAX_PLY};

use super::alpha_beta::SearchWorker;
use super::movepicker::MovePicker;
use super::pruning::{futility_value, DELTA_MARGIN};
use super::search_helpers::is_dangerous_move;
use super::stats::inc_stat;

impl SearchWorker {
    /// 静止探索
    ///
    /// `checking_depth` が 0 以上の間は王手になる静かな手も生成する。
    /// 王手されている局面では回避手をすべて読み、`checking_depth` を1増やす。
    /// 置換表は `use_tt` のとき（静止探索の入口）だけ参照・格納する。
    #[allow(clippy::too_many_arguments)]
    pub(super) fn quiescence(
        &mut self,
        pos: &mut Position,
        mut checking_depth: Depth,
        mut alpha: Value,
        mut beta: Value,
        ply: usize,
        pv_node: bool,
        use_tt: bool,
    ) -> Value {
        self.pv.clear(ply);
        self.update_search(ply);
        inc_stat!(self, qnodes_searched);

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

        let use_tt = use_tt && self.config.use_transposition_table;
        if use_tt {
            if let Some(entry) = self.tt.get(pos.key()) {
                let value = entry.value(ply as i32);
                if entry.bound().can_cutoff(value, alpha, beta) {
                    inc_stat!(self, tt_cutoff);
                    return value;
                }
            }
        }

        let in_check = pos.attack(pos.side_to_move()).is_check();

        let mut bound = Bound::Upper;
        let mut best_value = -Value::INFINITE;
        let mut static_eval = Value::INFINITE;

        if !in_check {
            // stand pat
            let value = self.evaluator.evaluate(pos);
            static_eval = value;
            best_value = value;

            if value > alpha {
                bound = Bound::Exact;
                alpha = value;
                if value >= beta {
                    if use_tt {
                        self.tt.put(
                            pos.key(),
                            0,
                            value,
                            Bound::Lower,
                            Move::NONE,
                            false,
                            ply as i32,
                        );
                    }
                    return value;
                }
            }
        } else {
            checking_depth += 1;
        }

        let generate_checks = self.config.use_quiescence_checks && checking_depth >= 0;
        let mut picker = MovePicker::new_quiescence(pos, generate_checks, &self.history);

        loop {
            let mv = picker.next_move(pos, &self.history);
            if mv.is_none() {
                break;
            }

            if self.config.use_delta_pruning
                && !pv_node
                && !in_check
                && !pos.is_checking_move(mv)
                && !is_dangerous_move(pos, mv)
            {
                let value = futility_value(static_eval, DELTA_MARGIN, mv);
                if value <= alpha {
                    inc_stat!(self, delta_pruned);
                    best_value = best_value.max(value);
                    continue;
                }
            }

            pos.make_move(mv);
            let value =
                -self.quiescence(pos, checking_depth - 1, -beta, -alpha, ply + 1, pv_node, false);
            pos.undo_move(mv);

            if self.aborted() {
                break;
            }

            if value > best_value {
                best_value = value;
                self.pv.update(ply, mv);

                if value > alpha {
                    bound = Bound::Exact;
                    alpha = value;
                    if value >= beta {
                        bound = Bound::Lower;
                        break;
                    }
                }
            }
        }

        if best_value == -Value::INFINITE {
            // 王手されていて回避手がない
            debug_assert!(in_check);
            best_value = Value::mated_in(ply as i32);
        }

        if use_tt && !self.aborted() {
            self.tt.put(pos.key(), 0, best_value, bound, Move::NONE, false, ply as i32);
        }

        best_value
    }
}
