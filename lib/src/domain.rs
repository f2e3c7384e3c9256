use crate::{require, Payload, TreeError, TreeResult};

/// Range of keys a tree accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyDomain<V> {
    /// Any value of the payload type.
    #[default]
    Unbounded,
    /// Values strictly between `min` and `max`. The bounds themselves are
    /// reserved as the outer neighbors used when deriving insert positions.
    Open { min: V, max: V },
}

impl<V: Payload> KeyDomain<V> {
    pub fn open(min: V, max: V) -> Self {
        debug_assert!(min < max);
        KeyDomain::Open { min, max }
    }

    pub fn contains(&self, value: &V) -> bool {
        match self {
            KeyDomain::Unbounded => true,
            KeyDomain::Open { min, max } => min < value && value < max,
        }
    }

    pub fn check(&self, value: &V) -> TreeResult {
        require(
            self.contains(value),
            TreeError::OutOfRange,
            "Value outside of key domain",
        )
    }

    pub fn lower(&self) -> Option<V> {
        match self {
            KeyDomain::Unbounded => None,
            KeyDomain::Open { min, .. } => Some(*min),
        }
    }

    pub fn upper(&self) -> Option<V> {
        match self {
            KeyDomain::Unbounded => None,
            KeyDomain::Open { max, .. } => Some(*max),
        }
    }
}

/// Keys that can name the value halfway between two neighbors. Used to
/// compute the value that lands at a chosen empty slot.
pub trait Midpoint: Payload {
    const LOWEST: Self;
    const HIGHEST: Self;

    /// floor((low + high) / 2) without overflow. Requires low <= high.
    fn halfway(low: &Self, high: &Self) -> Self;
}

macro_rules! impl_unsigned_midpoint {
    ($($t:ty),*) => {
        $(
            impl Midpoint for $t {
                const LOWEST: Self = <$t>::MIN;
                const HIGHEST: Self = <$t>::MAX;

                fn halfway(low: &Self, high: &Self) -> Self {
                    low + (high - low) / 2
                }
            }
        )*
    };
}

macro_rules! impl_signed_midpoint {
    ($($t:ty),*) => {
        $(
            impl Midpoint for $t {
                const LOWEST: Self = <$t>::MIN;
                const HIGHEST: Self = <$t>::MAX;

                fn halfway(low: &Self, high: &Self) -> Self {
                    (*low as i128 + *high as i128).div_euclid(2) as $t
                }
            }
        )*
    };
}

impl_unsigned_midpoint!(u32, u64);
impl_signed_midpoint!(i32, i64);
