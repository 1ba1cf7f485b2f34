//! 時間管理オプション
use serde::{Deserialize, Serialize};

use super::TimePoint;

/// 時間管理に関するオプション
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOptions {
    /// moves_to_go の既定値かつ上限
    pub moves_to_go: i32,
    /// 残り時間のうち使ってよい割合
    pub safety: f64,
    /// 通信遅延などの固定マージン（ミリ秒）
    pub overhead: TimePoint,
    /// 持ち時間が与えられないときの思考時間（ミリ秒）
    pub fallback: TimePoint,
    /// ハードリミット = 使用可能時間 / hard_divisor
    pub hard_divisor: i64,
}

impl Default for TimeOptions {
    fn default() -> Self {
        Self {
            moves_to_go: 40,
            safety: 0.95,
            overhead: 1000,
            fallback: 2000,
            hard_divisor: 8,
        }
    }
}
