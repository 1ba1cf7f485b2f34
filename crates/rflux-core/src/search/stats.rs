//! 探索統計（search-stats feature有効時のみ）
//!
//! 探索中の各種枝刈りの発生回数を記録し、チューニングやデバッグに使用する。

/// 探索統計カウンタ
///
/// `search-stats` featureが有効な場合のみコンパイルされる。
#[cfg(feature = "search-stats")]
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// 通常探索ノード数
    pub nodes_searched: u64,
    /// 静止探索ノード数
    pub qnodes_searched: u64,
    /// TT（置換表）カットオフ回数
    pub tt_cutoff: u64,
    /// NMP（Null Move Pruning）試行回数
    pub nmp_attempted: u64,
    /// NMPによる枝刈り成功回数
    pub nmp_cutoff: u64,
    /// NMP検証探索の回数
    pub nmp_verified: u64,
    /// IID実行回数
    pub iid_applied: u64,
    /// Futility Pruning回数（extended futility を含む）
    pub futility_pruned: u64,
    /// 静止探索の delta pruning 回数
    pub delta_pruned: u64,
    /// LMR適用回数
    pub lmr_applied: u64,
    /// LMRによる再探索回数
    pub lmr_research: u64,
    /// 延長の回数
    pub extensions: u64,
    /// β カットの回数
    pub cutoffs: u64,
    /// 1手目での β カットの回数（Move Ordering品質）
    pub first_move_cutoffs: u64,
}

#[cfg(feature = "search-stats")]
impl SearchStats {
    /// 統計をリセット
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 統計をフォーマットして文字列として返す
    pub fn format_report(&self) -> String {
        let rate = |num: u64, den: u64| {
            if den > 0 {
                num as f64 / den as f64 * 100.0
            } else {
                0.0
            }
        };
        let mut report = String::new();
        report.push_str("=== Search Statistics ===\n");
        report.push_str(&format!("Nodes searched:      {:>12}\n", self.nodes_searched));
        report.push_str(&format!("QNodes searched:     {:>12}\n", self.qnodes_searched));
        report.push_str(&format!("TT cutoffs:          {:>12}\n", self.tt_cutoff));
        report.push_str("--- Pre-Move Pruning ---\n");
        report.push_str(&format!("NMP attempted:       {:>12}\n", self.nmp_attempted));
        report.push_str(&format!("NMP cutoffs:         {:>12}\n", self.nmp_cutoff));
        report.push_str(&format!("NMP verified:        {:>12}\n", self.nmp_verified));
        report.push_str(&format!("IID applied:         {:>12}\n", self.iid_applied));
        report.push_str("--- Move Loop ---\n");
        report.push_str(&format!("Futility pruned:     {:>12}\n", self.futility_pruned));
        report.push_str(&format!("Delta pruned:        {:>12}\n", self.delta_pruned));
        report.push_str(&format!("LMR applied:         {:>12}\n", self.lmr_applied));
        report.push_str(&format!("LMR re-search:       {:>12}\n", self.lmr_research));
        report.push_str(&format!("Extensions:          {:>12}\n", self.extensions));
        report.push_str("--- Move Ordering Quality ---\n");
        report.push_str(&format!(
            "First move cutoffs:  {:>12} / {} ({:.1}%)\n",
            self.first_move_cutoffs,
            self.cutoffs,
            rate(self.first_move_cutoffs, self.cutoffs)
        ));
        report
    }
}

// =============================================================================
// 統計マクロ
// =============================================================================

/// 統計カウンタをインクリメントするマクロ（feature有効時のみ実行）
/// SearchWorker から呼び出される（self.stats へアクセス）
#[cfg(feature = "search-stats")]
macro_rules! inc_stat {
    ($self:expr, $field:ident) => {
        $self.stats.$field += 1;
    };
}

#[cfg(not(feature = "search-stats"))]
macro_rules! inc_stat {
    ($self:expr, $field:ident) => {};
}

// マクロを search モジュール内で使えるようにする
pub(super) use inc_stat;

#[cfg(all(test, feature = "search-stats"))]
mod tests {
    use super::*;

    #[test]
    fn test_stats_report_and_reset() {
        let mut stats = SearchStats {
            nodes_searched: 10,
            cutoffs: 4,
            first_move_cutoffs: 3,
            ..Default::default()
        };
        let report = stats.format_report();
        assert!(report.contains("Nodes searched"));
        assert!(report.contains("75.0%"));

        stats.reset();
        assert_eq!(stats.nodes_searched, 0);
    }
}
