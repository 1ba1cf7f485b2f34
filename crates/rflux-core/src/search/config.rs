//! 探索設定
//!
//! 置換表サイズ、MultiPV、解析モードと、各探索技法の有効/無効。
//! 既定値はすべての技法が有効な通常の探索。

use serde::{Deserialize, Serialize};

use crate::tt::DEFAULT_HASH_MB;

/// 探索設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 置換表サイズ（MB）
    pub hash_mb: usize,
    /// 報告する候補手の数（1以上）
    pub multi_pv: usize,
    /// 解析モード（弱い成りも探索し、探索ごとに置換表の世代を進める）
    pub analyze_mode: bool,

    pub use_transposition_table: bool,
    pub use_mate_distance_pruning: bool,
    pub use_aspiration_window: bool,

    pub use_null_move_pruning: bool,
    pub use_verified_null_move: bool,
    pub use_internal_iterative_deepening: bool,

    pub use_futility_pruning: bool,
    pub use_extended_futility_pruning: bool,
    pub use_delta_pruning: bool,
    pub use_late_move_reduction: bool,
    pub use_late_move_reduction_research: bool,
    pub use_minor_promotion_pruning: bool,

    pub use_recapture_extension: bool,
    pub use_check_extension: bool,
    pub use_pawn_extension: bool,
    pub use_single_reply_extension: bool,
    pub use_mate_threat_extension: bool,

    /// 静止探索で王手になる静かな手も生成する
    pub use_quiescence_checks: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
            multi_pv: 1,
            analyze_mode: false,

            use_transposition_table: true,
            use_mate_distance_pruning: true,
            use_aspiration_window: true,

            use_null_move_pruning: true,
            use_verified_null_move: true,
            use_internal_iterative_deepening: true,

            use_futility_pruning: true,
            use_extended_futility_pruning: true,
            use_delta_pruning: true,
            use_late_move_reduction: true,
            use_late_move_reduction_research: true,
            use_minor_promotion_pruning: true,

            use_recapture_extension: true,
            use_check_extension: true,
            use_pawn_extension: true,
            use_single_reply_extension: true,
            use_mate_threat_extension: true,

            use_quiescence_checks: true,
        }
    }
}

impl SearchConfig {
    /// 枝刈り・延長をすべて無効にした設定（素の alpha-beta、テスト用）
    pub fn plain() -> Self {
        Self {
            use_transposition_table: false,
            use_mate_distance_pruning: false,
            use_aspiration_window: false,
            use_null_move_pruning: false,
            use_verified_null_move: false,
            use_internal_iterative_deepening: false,
            use_futility_pruning: false,
            use_extended_futility_pruning: false,
            use_delta_pruning: false,
            use_late_move_reduction: false,
            use_late_move_reduction_research: false,
            use_minor_promotion_pruning: false,
            use_recapture_extension: false,
            use_check_extension: false,
            use_pawn_extension: false,
            use_single_reply_extension: false,
            use_mate_threat_extension: false,
            use_quiescence_checks: false,
            ..Self::default()
        }
    }
}
