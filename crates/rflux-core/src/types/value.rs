//! 評価値（Value）
//!
//! `Value::MATE` 付近を詰みスコアとして予約している。
//! 通常の評価値は [-MATE_IN_MAX_PLY, MATE_IN_MAX_PLY] の内側に収まる。

use super::MAX_PLY;

/// 評価値（センチポーン単位）
///
/// 通常の局面評価と、詰み表現（`mate_in` / `mated_in` 系）を同一の整数スケールで扱う。
/// `is_mate_score` と `mate_ply` により、詰みスコアかどうかと手数の復元が可能。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Value(i32);

impl Value {
    /// ゼロ
    pub const ZERO: Value = Value(0);
    /// 引き分け
    pub const DRAW: Value = Value(0);
    /// 詰み（勝ち側の最大スコア）
    pub const MATE: Value = Value(32000);
    /// 無限大
    pub const INFINITE: Value = Value(32001);
    /// 無効値
    pub const NONE: Value = Value(32002);

    /// 最大探索高さ内での詰みスコア
    ///
    /// これを超える値は「高さ相対の詰み手数」として置換表で正規化される。
    pub const MATE_IN_MAX_PLY: Value = Value(Self::MATE.0 - MAX_PLY as i32);
    /// 最大探索高さ内での詰まされスコア
    pub const MATED_IN_MAX_PLY: Value = Value(-Self::MATE_IN_MAX_PLY.0);

    /// 値から生成
    #[inline]
    pub const fn new(v: i32) -> Value {
        Value(v)
    }

    /// ply手で詰ますスコア
    #[inline]
    pub const fn mate_in(ply: i32) -> Value {
        Value(Self::MATE.0 - ply)
    }

    /// ply手で詰まされるスコア
    #[inline]
    pub const fn mated_in(ply: i32) -> Value {
        Value(-Self::MATE.0 + ply)
    }

    /// 勝ちスコアかどうか
    #[inline]
    pub const fn is_win(self) -> bool {
        self.0 > Self::MATE_IN_MAX_PLY.0
    }

    /// 負けスコアかどうか
    #[inline]
    pub const fn is_loss(self) -> bool {
        self.0 < Self::MATED_IN_MAX_PLY.0
    }

    /// 詰みスコア（勝ちまたは負け）かどうか
    #[inline]
    pub const fn is_mate_score(self) -> bool {
        self.is_win() || self.is_loss()
    }

    /// 生の値を取得
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// 詰み手数（ply）を取得（詰みスコアの場合のみ有効）
    #[inline]
    pub const fn mate_ply(self) -> i32 {
        if self.is_win() {
            Self::MATE.0 - self.0
        } else if self.is_loss() {
            self.0 + Self::MATE.0
        } else {
            0
        }
    }

    /// 詰みまでの手数（自分の手番数）。負値は詰まされる側
    ///
    /// 詰みスコアでなければ `None`。
    #[inline]
    pub const fn mate_moves(self) -> Option<i32> {
        if self.is_win() {
            Some((self.mate_ply() + 1) / 2)
        } else if self.is_loss() {
            Some(-(self.mate_ply() + 1) / 2)
        } else {
            None
        }
    }

    /// 置換表に格納する形（高さ相対 → ルート相対の逆、「この局面からの詰み手数」）に変換
    #[inline]
    pub const fn to_tt(self, height: i32) -> Value {
        if self.is_win() {
            Value(self.0 + height)
        } else if self.is_loss() {
            Value(self.0 - height)
        } else {
            self
        }
    }

    /// 置換表から読み出した値を現在の高さに合わせて復元
    #[inline]
    pub const fn from_tt(self, height: i32) -> Value {
        if self.is_win() {
            Value(self.0 - height)
        } else if self.is_loss() {
            Value(self.0 + height)
        } else {
            self
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::ZERO
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mate_moves() {
            Some(n) => write!(f, "mate {n}"),
            None => write!(f, "cp {}", self.0),
        }
    }
}

impl std::ops::Neg for Value {
    type Output = Value;

    #[inline]
    fn neg(self) -> Value {
        Value(-self.0)
    }
}

impl std::ops::Add for Value {
    type Output = Value;

    #[inline]
    fn add(self, rhs: Value) -> Value {
        Value(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Value {
    type Output = Value;

    #[inline]
    fn sub(self, rhs: Value) -> Value {
        Value(self.0 - rhs.0)
    }
}

impl std::ops::Add<i32> for Value {
    type Output = Value;

    #[inline]
    fn add(self, rhs: i32) -> Value {
        Value(self.0 + rhs)
    }
}

impl std::ops::Sub<i32> for Value {
    type Output = Value;

    #[inline]
    fn sub(self, rhs: i32) -> Value {
        Value(self.0 - rhs)
    }
}

impl std::ops::AddAssign for Value {
    #[inline]
    fn add_assign(&mut self, rhs: Value) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Value {
    #[inline]
    fn sub_assign(&mut self, rhs: Value) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Mul<i32> for Value {
    type Output = Value;

    #[inline]
    fn mul(self, rhs: i32) -> Value {
        Value(self.0 * rhs)
    }
}

impl std::ops::Div<i32> for Value {
    type Output = Value;

    #[inline]
    fn div(self, rhs: i32) -> Value {
        Value(self.0 / rhs)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value(v)
    }
}

impl From<Value> for i32 {
    fn from(v: Value) -> i32 {
        v.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_constants() {
        assert_eq!(Value::ZERO.raw(), 0);
        assert_eq!(Value::DRAW.raw(), 0);
        assert_eq!(Value::MATE.raw(), 32000);
        assert_eq!(Value::INFINITE.raw(), 32001);
        assert_eq!(Value::NONE.raw(), 32002);
        assert_eq!(Value::MATE_IN_MAX_PLY.raw(), 32000 - 256);
    }

    #[test]
    fn test_value_mate_in() {
        let v = Value::mate_in(5);
        assert!(v.is_win());
        assert!(!v.is_loss());
        assert!(v.is_mate_score());
        assert_eq!(v.mate_ply(), 5);
        assert_eq!(v.mate_moves(), Some(3));
    }

    #[test]
    fn test_value_mated_in() {
        let v = Value::mated_in(4);
        assert!(!v.is_win());
        assert!(v.is_loss());
        assert!(v.is_mate_score());
        assert_eq!(v.mate_ply(), 4);
        assert_eq!(v.mate_moves(), Some(-2));
    }

    #[test]
    fn test_value_is_win_loss() {
        assert!(Value::MATE.is_win());
        assert!(!Value::MATE.is_loss());

        assert!(!Value::ZERO.is_win());
        assert!(!Value::ZERO.is_loss());
        assert!(!Value::ZERO.is_mate_score());
        assert_eq!(Value::new(150).mate_moves(), None);
    }

    #[test]
    fn test_value_tt_roundtrip() {
        // ルートから高さ3で見つけた「高さ5で詰ます」スコア
        let v = Value::mate_in(5);
        let stored = v.to_tt(3);
        assert_eq!(stored, Value::mate_in(2));
        assert_eq!(stored.from_tt(3), v);
        // 別の高さで読むと、そこからの距離に換算される
        assert_eq!(stored.from_tt(7), Value::mate_in(9));

        let l = Value::mated_in(6);
        assert_eq!(l.to_tt(2).from_tt(2), l);
        assert_eq!(Value::new(77).to_tt(10), Value::new(77));
    }

    #[test]
    fn test_value_arith() {
        let a = Value::new(100);
        let b = Value::new(50);
        assert_eq!(a + b, Value::new(150));
        assert_eq!(a - b, Value::new(50));
        assert_eq!(a + 1, Value::new(101));
        assert_eq!(-a, Value::new(-100));
        assert_eq!(a * 3, Value::new(300));
        assert_eq!(a / 2, Value::new(50));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::new(-35).to_string(), "cp -35");
        assert_eq!(Value::mate_in(1).to_string(), "mate 1");
        assert_eq!(Value::mated_in(2).to_string(), "mate -1");
    }
}
