//! Montgomery arithmetic for a modulus chosen at runtime.
//!
//! Instead of a process-wide `set_mod` the modulus lives in an explicit
//! [`DynMontgomery`] handle and every operation goes through it. Values of
//! different handles must never be mixed; the handle cannot detect that.

use thiserror::Error;

use crate::mint::Word;

/// Rejected runtime modulus.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModulusError {
    /// Montgomery reduction needs `gcd(m, 2^BITS) = 1`.
    #[error("modulus {0} must be odd")]
    EvenModulus(u64),
    /// The lazy-reduction scheme keeps representatives below `2m` and sums
    /// below `4m`, so `4m` must be representable.
    #[error("modulus {0} too large: 4*m must fit in the backing word")]
    TooLarge(u64),
}

/// Runtime modulus handle carrying the precomputed Montgomery constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynMontgomery<W: Word> {
    m: W,
    r2: W,
    neg_inv: W,
}

/// Value in the Montgomery domain of some [`DynMontgomery`] handle.
///
/// The raw representative is meaningless without the handle that created it.
#[derive(Debug, Clone, Copy)]
pub struct DynMint<W: Word>(W);

impl<W: Word> DynMontgomery<W> {
    /// Validates `m` and precomputes `R^2 mod m` and `-m^{-1} mod R`.
    pub fn new(m: W) -> Result<Self, ModulusError> {
        if m.as_u64() & 1 == 0 {
            return Err(ModulusError::EvenModulus(m.as_u64()));
        }
        if m.as_u64() >> (W::BITS - 2) != 0 {
            return Err(ModulusError::TooLarge(m.as_u64()));
        }
        let r = W::ZERO.wrapping_sub(m) % m;
        let r2 = W::mul_mod(r, r, m);
        let mut neg_inv = m;
        while m.wrapping_mul(neg_inv) != W::ONE {
            neg_inv = neg_inv.wrapping_mul(W::from_u64(2).wrapping_sub(m.wrapping_mul(neg_inv)));
        }
        Ok(Self {
            m,
            r2,
            neg_inv: neg_inv.wrapping_neg(),
        })
    }

    /// The modulus of this handle.
    pub fn modulus(&self) -> W {
        self.m
    }

    /// Lifts a residue into the Montgomery domain.
    pub fn from_u64(&self, x: u64) -> DynMint<W> {
        let v = W::from_u64(x % self.m.as_u64());
        DynMint(W::mont_mul(v, self.r2, self.m, self.neg_inv))
    }

    /// Lifts a possibly negative integer into the Montgomery domain.
    pub fn from_i64(&self, x: i64) -> DynMint<W> {
        let m = self.m.as_u64() as i64;
        self.from_u64((x % m + m) as u64)
    }

    /// Canonical residue of `x` in `[0, m)`.
    pub fn val(&self, x: DynMint<W>) -> W {
        let v = W::mont_reduce(x.0, self.m, self.neg_inv);
        if v >= self.m {
            v - self.m
        } else {
            v
        }
    }

    /// The zero element.
    pub fn zero(&self) -> DynMint<W> {
        DynMint(W::ZERO)
    }

    /// The one element.
    pub fn one(&self) -> DynMint<W> {
        self.from_u64(1)
    }

    /// Addition in the Montgomery domain.
    pub fn add(&self, a: DynMint<W>, b: DynMint<W>) -> DynMint<W> {
        let m2 = self.m + self.m;
        let t = a.0 + b.0;
        DynMint(if t >= m2 { t - m2 } else { t })
    }

    /// Subtraction in the Montgomery domain.
    pub fn sub(&self, a: DynMint<W>, b: DynMint<W>) -> DynMint<W> {
        let m2 = self.m + self.m;
        let t = a.0 + m2 - b.0;
        DynMint(if t >= m2 { t - m2 } else { t })
    }

    /// Multiplication (REDC) in the Montgomery domain.
    pub fn mul(&self, a: DynMint<W>, b: DynMint<W>) -> DynMint<W> {
        DynMint(W::mont_mul(a.0, b.0, self.m, self.neg_inv))
    }

    /// Binary exponentiation.
    pub fn pow(&self, a: DynMint<W>, mut t: u64) -> DynMint<W> {
        let mut res = self.one();
        let mut mul = a;
        while t > 0 {
            if t & 1 == 1 {
                res = self.mul(res, mul);
            }
            mul = self.mul(mul, mul);
            t >>= 1;
        }
        res
    }

    /// Multiplicative inverse by the extended Euclidean algorithm.
    ///
    /// The modulus must be prime and `x` nonzero; the result is undefined
    /// otherwise.
    pub fn inv(&self, x: DynMint<W>) -> DynMint<W> {
        let mut a = self.val(x).as_u64() as i64;
        let mut b = self.m.as_u64() as i64;
        let mut u = 1i64;
        let mut v = 0i64;
        while b != 0 {
            let t = a / b;
            a -= b * t;
            u -= v * t;
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut u, &mut v);
        }
        self.from_i64(u)
    }
}
