//! 境界値種別（Bound）

use super::Value;

/// 境界値種別（置換表に格納する値の種類）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Bound {
    /// なし
    #[default]
    None = 0,
    /// 上界（fail-low: 真の値はこれ以下）
    Upper = 1,
    /// 下界（fail-high: 真の値はこれ以上）
    Lower = 2,
    /// 正確な値
    Exact = 3,
}

impl Bound {
    /// 置換表の値で探索窓 [alpha, beta] を打ち切れるか
    #[inline]
    pub const fn can_cutoff(self, value: Value, alpha: Value, beta: Value) -> bool {
        match self {
            Bound::Exact => true,
            Bound::Lower => value.raw() >= beta.raw(),
            Bound::Upper => value.raw() <= alpha.raw(),
            Bound::None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_can_cutoff() {
        let alpha = Value::new(-50);
        let beta = Value::new(50);

        assert!(Bound::Exact.can_cutoff(Value::new(0), alpha, beta));
        assert!(Bound::Lower.can_cutoff(Value::new(50), alpha, beta));
        assert!(!Bound::Lower.can_cutoff(Value::new(49), alpha, beta));
        assert!(Bound::Upper.can_cutoff(Value::new(-50), alpha, beta));
        assert!(!Bound::Upper.can_cutoff(Value::new(-49), alpha, beta));
        assert!(!Bound::None.can_cutoff(Value::new(0), alpha, beta));
    }
}
