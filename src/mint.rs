//! Montgomery-reduced modular integers with a compile-time modulus.
//!
//! Values live in the Montgomery domain `x·R mod m` where `R = 2^BITS`, so a
//! multiplication costs one double-width product plus one REDC and no division.
//! The internal representative is kept lazily reduced in `[0, 2m)`; `val()`
//! projects back to the canonical residue in `[0, m)`.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, Sub, SubAssign};

/// Backing unsigned word of a Montgomery domain.
///
/// Implementations pair the word with its double-width type so that REDC can
/// be expressed once per width. The `4*m` headroom required by the lazy
/// reduction is checked where moduli are constructed, not here.
pub trait Word:
    Copy
    + Eq
    + Ord
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Rem<Output = Self>
{
    /// Width of the word in bits (`R = 2^BITS`).
    const BITS: u32;
    /// The additive identity.
    const ZERO: Self;
    /// The multiplicative identity.
    const ONE: Self;

    /// Truncating conversion from `u64`.
    fn from_u64(x: u64) -> Self;
    /// Widening conversion to `u64` (lossless for the supported widths).
    fn as_u64(self) -> u64;
    /// Multiplication modulo `2^BITS`.
    fn wrapping_mul(self, rhs: Self) -> Self;
    /// Subtraction modulo `2^BITS`.
    fn wrapping_sub(self, rhs: Self) -> Self;
    /// Negation modulo `2^BITS`.
    fn wrapping_neg(self) -> Self;
    /// `(a * b) mod m` through the double-width type.
    fn mul_mod(a: Self, b: Self, m: Self) -> Self;
    /// `REDC(a * b)` for `a, b < 2m`; the result lies in `[0, 2m)`.
    fn mont_mul(a: Self, b: Self, m: Self, neg_inv: Self) -> Self;
    /// `REDC(a)` for `a < 2m`, leaving the Montgomery domain; result `< 2m`.
    fn mont_reduce(a: Self, m: Self, neg_inv: Self) -> Self;
}

macro_rules! impl_word {
    ($w:ty, $d:ty) => {
        impl Word for $w {
            const BITS: u32 = <$w>::BITS;
            const ZERO: $w = 0;
            const ONE: $w = 1;

            fn from_u64(x: u64) -> $w {
                x as $w
            }

            fn as_u64(self) -> u64 {
                self as u64
            }

            fn wrapping_mul(self, rhs: $w) -> $w {
                <$w>::wrapping_mul(self, rhs)
            }

            fn wrapping_sub(self, rhs: $w) -> $w {
                <$w>::wrapping_sub(self, rhs)
            }

            fn wrapping_neg(self) -> $w {
                <$w>::wrapping_neg(self)
            }

            fn mul_mod(a: $w, b: $w, m: $w) -> $w {
                ((a as $d * b as $d) % m as $d) as $w
            }

            fn mont_mul(a: $w, b: $w, m: $w, neg_inv: $w) -> $w {
                let t = a as $d * b as $d;
                let q = (t as $w).wrapping_mul(neg_inv);
                ((t + q as $d * m as $d) >> <$w>::BITS) as $w
            }

            fn mont_reduce(a: $w, m: $w, neg_inv: $w) -> $w {
                let q = <$w>::wrapping_mul(a, neg_inv);
                ((a as $d + q as $d * m as $d) >> <$w>::BITS) as $w
            }
        }
    };
}
impl_word!(u32, u64);
impl_word!(u64, u128);

/// A compile-time modulus together with its Montgomery constants.
///
/// `MOD` must be odd and `4*MOD` must fit in the backing word; both are
/// enforced at monomorphization time. `R2 = R^2 mod m` enters the domain and
/// `NEG_INV = -m^{-1} mod R` drives REDC; both are fixed for the lifetime of
/// the modulus.
pub trait Modulus: Copy + Eq + fmt::Debug {
    /// Backing word type.
    type W: Word;
    /// The modulus itself.
    const MOD: Self::W;
    /// `R^2 mod m`.
    const R2: Self::W;
    /// `-m^{-1} mod 2^BITS`, obtained by Newton's iteration.
    const NEG_INV: Self::W;
}

macro_rules! impl_static_modulus {
    ($mod_name:ident, $mint_name:ident, $w:ty, $d:ty) => {
        /// Compile-time modulus tag for this word width.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $mod_name<const MOD: $w>;

        impl<const MOD: $w> Modulus for $mod_name<MOD> {
            type W = $w;

            const MOD: $w = {
                assert!(MOD & 1 == 1 && MOD > 1, "modulus must be an odd number > 1");
                assert!(
                    MOD >> (<$w>::BITS - 2) == 0,
                    "4*modulus must fit in the backing word"
                );
                MOD
            };

            const R2: $w = {
                // R mod m == (R - m) mod m == wrapping_neg(m) mod m.
                let r = (0 as $w).wrapping_sub(MOD) % MOD;
                ((r as $d * r as $d) % MOD as $d) as $w
            };

            const NEG_INV: $w = {
                let mut inv: $w = MOD;
                while MOD.wrapping_mul(inv) != 1 {
                    inv = inv.wrapping_mul((2 as $w).wrapping_sub(MOD.wrapping_mul(inv)));
                }
                inv.wrapping_neg()
            };
        }

        /// Montgomery mint over this word width.
        pub type $mint_name<const MOD: $w> = Mint<$mod_name<MOD>>;
    };
}
impl_static_modulus!(Mod32, Mint32, u32, u64);
impl_static_modulus!(Mod64, Mint64, u64, u128);

/// Modular integer in the Montgomery domain of `M`.
#[derive(Clone, Copy)]
pub struct Mint<M: Modulus>(M::W);

impl<M: Modulus> Mint<M> {
    /// The zero element.
    pub fn zero() -> Self {
        Mint(M::W::ZERO)
    }

    /// The one element.
    pub fn one() -> Self {
        Mint(M::W::mont_mul(M::W::ONE, M::R2, M::MOD, M::NEG_INV))
    }

    /// The modulus this value is reduced by.
    pub fn modulus() -> M::W {
        M::MOD
    }

    /// Canonical residue in `[0, m)`.
    pub fn val(self) -> M::W {
        let x = M::W::mont_reduce(self.0, M::MOD, M::NEG_INV);
        if x >= M::MOD {
            x - M::MOD
        } else {
            x
        }
    }

    /// Montgomery representative reduced into `[0, m)`, for comparisons.
    fn canon(self) -> M::W {
        if self.0 >= M::MOD {
            self.0 - M::MOD
        } else {
            self.0
        }
    }

    /// Binary exponentiation. A negative exponent inverts first, which
    /// requires the modulus to be prime.
    pub fn pow(self, t: i64) -> Self {
        if t < 0 {
            return self.pow(-t).inv();
        }
        let mut t = t as u64;
        let mut res = Self::one();
        let mut mul = self;
        while t > 0 {
            if t & 1 == 1 {
                res *= mul;
            }
            mul *= mul;
            t >>= 1;
        }
        res
    }

    /// Multiplicative inverse by the extended Euclidean algorithm.
    ///
    /// The modulus must be prime and `self` nonzero; the result is undefined
    /// otherwise.
    pub fn inv(self) -> Self {
        debug_assert!(self.canon() != M::W::ZERO, "inverse of zero");
        let mut x = self.val().as_u64() as i64;
        let mut y = M::MOD.as_u64() as i64;
        let mut u = 1i64;
        let mut v = 0i64;
        while y != 0 {
            let t = x / y;
            x -= y * t;
            u -= v * t;
            std::mem::swap(&mut x, &mut y);
            std::mem::swap(&mut u, &mut v);
        }
        Self::from(u)
    }
}

impl<M: Modulus> From<i64> for Mint<M> {
    fn from(x: i64) -> Self {
        let m = M::MOD.as_u64() as i64;
        // The +m bias keeps negative inputs in range; the representative
        // stays below 2m as required by the lazy reduction.
        let v = (x % m + m) as u64;
        Mint(M::W::mont_mul(
            M::W::from_u64(v),
            M::R2,
            M::MOD,
            M::NEG_INV,
        ))
    }
}

impl<M: Modulus> From<u64> for Mint<M> {
    fn from(x: u64) -> Self {
        let v = x % M::MOD.as_u64();
        Mint(M::W::mont_mul(
            M::W::from_u64(v),
            M::R2,
            M::MOD,
            M::NEG_INV,
        ))
    }
}

impl<M: Modulus> From<i32> for Mint<M> {
    fn from(x: i32) -> Self {
        Self::from(x as i64)
    }
}

impl<M: Modulus> From<u32> for Mint<M> {
    fn from(x: u32) -> Self {
        Self::from(x as u64)
    }
}

impl<M: Modulus> From<usize> for Mint<M> {
    fn from(x: usize) -> Self {
        Self::from(x as u64)
    }
}

impl<M: Modulus> AddAssign for Mint<M> {
    fn add_assign(&mut self, rhs: Self) {
        let m2 = M::MOD + M::MOD;
        let t = self.0 + rhs.0;
        self.0 = if t >= m2 { t - m2 } else { t };
    }
}

impl<M: Modulus> SubAssign for Mint<M> {
    fn sub_assign(&mut self, rhs: Self) {
        let m2 = M::MOD + M::MOD;
        let t = self.0 + m2 - rhs.0;
        self.0 = if t >= m2 { t - m2 } else { t };
    }
}

impl<M: Modulus> MulAssign for Mint<M> {
    fn mul_assign(&mut self, rhs: Self) {
        self.0 = M::W::mont_mul(self.0, rhs.0, M::MOD, M::NEG_INV);
    }
}

impl<M: Modulus> DivAssign for Mint<M> {
    fn div_assign(&mut self, rhs: Self) {
        *self *= rhs.inv();
    }
}

macro_rules! forward_binop {
    ($op:ident, $method:ident, $assign_method:ident) => {
        impl<M: Modulus> $op for Mint<M> {
            type Output = Self;
            fn $method(mut self, rhs: Self) -> Self {
                self.$assign_method(rhs);
                self
            }
        }
    };
}
forward_binop!(Add, add, add_assign);
forward_binop!(Sub, sub, sub_assign);
forward_binop!(Mul, mul, mul_assign);
forward_binop!(Div, div, div_assign);

impl<M: Modulus> Neg for Mint<M> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::zero() - self
    }
}

impl<M: Modulus> PartialEq for Mint<M> {
    fn eq(&self, other: &Self) -> bool {
        self.canon() == other.canon()
    }
}

impl<M: Modulus> Eq for Mint<M> {}

impl<M: Modulus> Default for Mint<M> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<M: Modulus> fmt::Debug for Mint<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.val())
    }
}

impl<M: Modulus> fmt::Display for Mint<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.val())
    }
}
