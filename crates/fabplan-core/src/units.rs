//! 數量單位模型
//!
//! 成品/半成品以「顆」(pieces) 計、晶圓需求以「晶粒」(die) 計、晶圓庫存以「片」(wafers) 計。
//! 三者是不同型別，晶粒與晶圓之間只能透過 [`GrossDie`] 換算。

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::PlanError;

/// 可加總的數量
pub trait Quantity:
    Copy
    + fmt::Debug
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Sum
    + Send
    + Sync
{
    /// 零值
    const ZERO: Self;

    /// 取得原始數值
    fn value(self) -> Decimal;

    /// 取兩者較大值
    fn max_of(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// 取兩者較小值
    fn min_of(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl Quantity for Decimal {
    const ZERO: Self = Decimal::ZERO;

    fn value(self) -> Decimal {
        self
    }
}

macro_rules! quantity_type {
    ($(#[$meta:meta])* $name:ident, $unit:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Decimal);

        impl $name {
            pub const ZERO: Self = Self(Decimal::ZERO);

            pub fn new(value: Decimal) -> Self {
                Self(value)
            }

            pub fn is_negative(&self) -> bool {
                self.0 < Decimal::ZERO
            }
        }

        impl Quantity for $name {
            const ZERO: Self = Self(Decimal::ZERO);

            fn value(self) -> Decimal {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(Decimal::from(value))
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::ZERO, |acc, q| acc + q)
            }
        }

        impl<'a> Sum<&'a $name> for $name {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                iter.copied().sum()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $unit)
            }
        }
    };
}

quantity_type!(
    /// 成品/半成品數量（顆）
    Pieces,
    "pcs"
);

quantity_type!(
    /// 晶粒數量
    Die,
    "die"
);

quantity_type!(
    /// 晶圓數量（片）
    Wafers,
    "wfr"
);

impl Pieces {
    /// 換算為晶粒：一顆成品封裝一顆晶粒
    pub fn as_die(self) -> Die {
        Die(self.0)
    }
}

/// 單片晶圓毛晶粒數（gross die per wafer）
///
/// 只能建立大於零的值，避免換算時除以零或被默默當成 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct GrossDie(Decimal);

impl GrossDie {
    /// 建立毛晶粒數，非正值回傳 None
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    /// 從浮點數建立（上游表格的 GROSS DIE 欄位）
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Decimal::try_from(value).ok().and_then(Self::new)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// 晶圓片數 → 晶粒數
    pub fn die_from_wafers(&self, wafers: Wafers) -> Die {
        Die(wafers.0 * self.0)
    }

    /// 晶粒數 → 晶圓片數
    pub fn wafers_from_die(&self, die: Die) -> Wafers {
        Wafers(die.0 / self.0)
    }
}

impl TryFrom<Decimal> for GrossDie {
    type Error = PlanError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| PlanError::InvalidYield(value.to_string()))
    }
}

impl From<GrossDie> for Decimal {
    fn from(value: GrossDie) -> Self {
        value.0
    }
}

impl fmt::Display for GrossDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} die/wfr", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantity_arithmetic() {
        let a = Pieces::from(150);
        let b = Pieces::from(200);

        assert_eq!(a + b, Pieces::from(350));
        assert_eq!(a - b, Pieces::from(-50));
        assert!((a - b).is_negative());
        assert_eq!(a.max_of(b), b);
        assert_eq!(a.min_of(b), a);

        let total: Pieces = vec![a, b, Pieces::from(50)].into_iter().sum();
        assert_eq!(total, Pieces::from(400));
    }

    #[test]
    fn test_gross_die_rejects_non_positive() {
        assert!(GrossDie::new(Decimal::ZERO).is_none());
        assert!(GrossDie::new(dec!(-3)).is_none());
        assert!(GrossDie::from_f64(f64::NAN).is_none());
        assert_eq!(GrossDie::from_f64(500.0).map(|g| g.value()), Some(dec!(500)));
    }

    #[test]
    fn test_gross_die_conversion() {
        let gross_die = GrossDie::new(dec!(500)).unwrap();

        assert_eq!(gross_die.die_from_wafers(Wafers::from(600)), Die::from(300_000));
        assert_eq!(gross_die.wafers_from_die(Die::from(1250)), Wafers::new(dec!(2.5)));
        assert_eq!(Pieces::from(42).as_die(), Die::from(42));
    }

    #[test]
    fn test_gross_die_deserialize_validates() {
        let ok: GrossDie = serde_json::from_str("\"812\"").unwrap();
        assert_eq!(ok.value(), dec!(812));

        assert!(serde_json::from_str::<GrossDie>("\"0\"").is_err());
    }
}
