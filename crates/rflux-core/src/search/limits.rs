//! 探索制限（SearchLimits）
//!
//! `go` コマンドのパラメータを表現する。

use crate::types::{Color, Depth, Move};

// =============================================================================
// TimePoint
// =============================================================================

/// 時間（ミリ秒）
pub type TimePoint = i64;

// =============================================================================
// SearchLimits
// =============================================================================

/// 探索制限条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// 両者の残り時間（ミリ秒）
    pub time: [TimePoint; Color::NUM],

    /// フィッシャールール：1手ごとの時間増加（ミリ秒）
    pub inc: [TimePoint; Color::NUM],

    /// 次の時間切れまでの手数（0なら指定なし）
    pub moves_to_go: i32,

    /// 探索深さ固定（0以外なら有効）
    pub depth: Depth,

    /// 探索ノード数制限（0以外なら有効）
    pub nodes: u64,

    /// 思考時間固定（ミリ秒、0以外なら有効）
    pub move_time: TimePoint,

    /// 思考時間無制限フラグ（解析モードも有効になる）
    pub infinite: bool,

    /// ponder有効フラグ
    pub ponder: bool,

    /// 探索対象の手のリスト
    /// 空なら全合法手を探索
    pub search_moves: Vec<Move>,
}

impl SearchLimits {
    /// 新しいSearchLimitsを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 固定深さの探索
    pub fn depth(depth: Depth) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// 固定ノード数の探索
    pub fn nodes(nodes: u64) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    /// 固定時間の探索
    pub fn move_time(move_time: TimePoint) -> Self {
        Self {
            move_time,
            ..Self::default()
        }
    }

    /// 無制限探索（stopまで）
    pub fn infinite() -> Self {
        Self {
            infinite: true,
            ..Self::default()
        }
    }

    /// 持ち時間による時間制御を行うべきかの判定
    ///
    /// 以下のいずれかが指定されている場合は時間制御を行わない：
    /// - depth（固定深さ）
    /// - nodes（ノード数制限）
    /// - move_time（固定思考時間）
    /// - infinite（無制限）
    ///
    /// ponderは含めない。ponder中は ponderhit まで時間制御を保留する。
    #[inline]
    pub fn use_time_management(&self) -> bool {
        self.depth == 0 && self.nodes == 0 && self.move_time == 0 && !self.infinite
    }

    /// 指定した色の残り時間を取得
    #[inline]
    pub fn time_left(&self, color: Color) -> TimePoint {
        self.time[color.index()]
    }

    /// 指定した色のインクリメント時間を取得
    #[inline]
    pub fn increment(&self, color: Color) -> TimePoint {
        self.inc[color.index()]
    }
}
