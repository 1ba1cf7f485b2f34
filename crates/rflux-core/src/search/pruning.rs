//! 枝刈りヘルパー群
//!
//! - Null Move Pruning（検証探索つき）
//! - Futility Pruning / Extended Futility Pruning
//! - Delta Pruning（静止探索）
//! - Late Move Reduction の適用条件

use crate::position::{GamePhase, Position};
use crate::types::{Bound, Depth, Move, PieceType, Value};

use super::alpha_beta::SearchWorker;
use super::search_helpers::is_dangerous_move;
use super::stats::inc_stat;

// =============================================================================
// 定数
// =============================================================================

/// Null move を試す最小深さ
pub(super) const NULL_MOVE_MIN_DEPTH: Depth = 2;
/// 検証つき null move の削減量
const NULL_MOVE_REDUCTION_VERIFIED: Depth = 3;
/// 検証なし null move の削減量
const NULL_MOVE_REDUCTION: Depth = 2;
/// 検証探索の削減量
const NULL_MOVE_VERIFICATION_REDUCTION: Depth = 3;

/// frontier（残り1手）の futility margin
pub(super) const FUTILITY_FRONTIER_MARGIN: i32 = 2 * PieceType::Pawn.value();
/// pre-frontier（残り2手）の futility margin
pub(super) const FUTILITY_PREFRONTIER_MARGIN: i32 = PieceType::Rook.value();
/// 静止探索の delta margin
pub(super) const DELTA_MARGIN: i32 = PieceType::Pawn.value();

/// LMR を適用する最小深さ
pub(super) const LMR_MIN_DEPTH: Depth = 3;
/// LMR を適用するまでに探索済みであるべき手数
pub(super) const LMR_MIN_SEARCHED: usize = 3;

/// Internal Iterative Deepening を行う最小深さ
pub(super) const IID_MIN_DEPTH: Depth = 2;

// =============================================================================
// Null Move Pruning
// =============================================================================

/// Null move の結果
pub(super) enum NullMoveOutcome {
    /// β カット（この値を返す）
    Cutoff(Value),
    /// カットできず。詰めろを検出したかどうか
    Continue { mate_threat: bool },
}

impl SearchWorker {
    /// Null move pruning
    ///
    /// 静的評価が β 以上なら手番をパスして浅く探索し、それでも β を超えればカットする。
    /// 検証つきの場合は、残り深さを減らした通常探索で確かめてからカットする。
    /// パスして詰まされるなら詰めろとして延長に使う。
    #[allow(clippy::too_many_arguments)]
    pub(super) fn try_null_move_pruning(
        &mut self,
        pos: &mut Position,
        depth: Depth,
        alpha: Value,
        beta: Value,
        ply: usize,
        static_eval: Value,
        mut mate_threat: bool,
    ) -> NullMoveOutcome {
        if static_eval < beta {
            return NullMoveOutcome::Continue { mate_threat };
        }
        inc_stat!(self, nmp_attempted);

        let verified = self.config.use_verified_null_move;
        let reduction = if verified {
            NULL_MOVE_REDUCTION_VERIFIED
        } else {
            NULL_MOVE_REDUCTION
        };

        pos.make_move(Move::NULL);
        let mut value =
            -self.search_node(pos, depth - 1 - reduction, -beta, -beta + 1, ply + 1, false, false);
        pos.undo_move(Move::NULL);

        if verified && depth > NULL_MOVE_VERIFICATION_REDUCTION && value >= beta {
            inc_stat!(self, nmp_verified);
            value = self.search_node(
                pos,
                depth - NULL_MOVE_VERIFICATION_REDUCTION,
                alpha,
                beta,
                ply,
                true,
                false,
            );
            if value >= beta {
                inc_stat!(self, nmp_cutoff);
                return NullMoveOutcome::Cutoff(value);
            }
        }

        if value < Value::MATED_IN_MAX_PLY {
            mate_threat = true;
        }

        if value >= beta {
            // 証明されていない詰みスコアは返さない
            let value = value.min(Value::MATE_IN_MAX_PLY);
            if !self.aborted() {
                self.tt.put(
                    pos.key(),
                    depth,
                    value,
                    Bound::Lower,
                    Move::NONE,
                    mate_threat,
                    ply as i32,
                );
            }
            inc_stat!(self, nmp_cutoff);
            return NullMoveOutcome::Cutoff(value);
        }

        NullMoveOutcome::Continue { mate_threat }
    }
}

/// Null move を試してよい局面か（静的評価を除く条件）
#[inline]
pub(super) fn null_move_allowed(
    pos: &Position,
    pv_node: bool,
    depth: Depth,
    do_null: bool,
    in_check: bool,
    mate_threat: bool,
) -> bool {
    !pv_node
        && depth >= NULL_MOVE_MIN_DEPTH
        && do_null
        && !in_check
        && !mate_threat
        && pos.game_phase() != GamePhase::Endgame
}

// =============================================================================
// Futility Pruning
// =============================================================================

/// 静的評価 + margin + 取る駒の価値（その手で届きうる上限の見積もり）
#[inline]
pub(super) fn futility_value(static_eval: Value, margin: i32, mv: Move) -> Value {
    static_eval + margin + mv.captured().value()
}

/// futility / LMR の対象にしてよい手か
///
/// 王手延長が有効なら王手になる手は延長で深さが減らないので、ここでは判定しない。
#[inline]
pub(super) fn is_quiet_candidate(
    pos: &mut Position,
    mv: Move,
    use_check_extension: bool,
) -> bool {
    (use_check_extension || !pos.is_checking_move(mv)) && !is_dangerous_move(pos, mv)
}

/// futility margin（frontier / pre-frontier）
///
/// 該当しなければ None。
#[inline]
pub(super) fn futility_margin(
    depth: Depth,
    new_depth: Depth,
    use_futility: bool,
    use_extended_futility: bool,
) -> Option<i32> {
    if use_extended_futility && depth == 2 && new_depth == 1 {
        Some(FUTILITY_PREFRONTIER_MARGIN)
    } else if use_futility && depth == 1 && new_depth == 0 {
        Some(FUTILITY_FRONTIER_MARGIN)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::parse_uci_move;

    #[test]
    fn test_futility_margin() {
        assert_eq!(futility_margin(1, 0, true, true), Some(200));
        assert_eq!(futility_margin(2, 1, true, true), Some(500));
        assert_eq!(futility_margin(2, 1, true, false), None);
        assert_eq!(futility_margin(1, 1, true, true), None);
        assert_eq!(futility_margin(3, 2, true, true), None);
    }

    #[test]
    fn test_futility_value_includes_capture() {
        let mut pos = Position::from_fen("4k3/8/8/3r4/8/8/8/3RK3 w - - 0 1").unwrap();
        let capture = parse_uci_move(&mut pos, "d1d5").unwrap();
        let quiet = parse_uci_move(&mut pos, "d1d2").unwrap();
        let eval = Value::new(-300);
        assert_eq!(futility_value(eval, 200, capture), Value::new(400));
        assert_eq!(futility_value(eval, 200, quiet), Value::new(-100));
    }

    #[test]
    fn test_null_move_disabled_in_endgame() {
        let pos = Position::from_fen("4k3/pppp4/8/8/8/8/PPPP4/4K3 w - - 0 1").unwrap();
        assert_eq!(pos.game_phase(), GamePhase::Endgame);
        assert!(!null_move_allowed(&pos, false, 4, true, false, false));

        let pos = Position::startpos();
        assert!(null_move_allowed(&pos, false, 4, true, false, false));
        assert!(!null_move_allowed(&pos, true, 4, true, false, false));
        assert!(!null_move_allowed(&pos, false, 1, true, false, false));
        assert!(!null_move_allowed(&pos, false, 4, false, false, false));
        assert!(!null_move_allowed(&pos, false, 4, true, true, false));
        assert!(!null_move_allowed(&pos, false, 4, true, false, true));
    }
}
