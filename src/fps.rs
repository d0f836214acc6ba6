//! Truncated formal power series over a prime field.
//!
//! `Fps<C>` is a coefficient vector whose multiplication is delegated to a
//! [`Convolution`] strategy, so the same series type runs over an NTT-friendly
//! modulus directly or over an arbitrary modulus through CRT. The analytic
//! operations (`inv`, `log`, `exp`, `pow`) are Newton/doubling constructions
//! on top of that multiplication.
//!
//! Shifts follow the low-order-first coefficient layout: `f << k` discards the
//! `k` lowest coefficients (divides by `x^k`), `f >> k` prepends `k` zeros
//! (multiplies by `x^k`).

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Shl, Shr, Sub};

use itertools::{
    EitherOrBoth::{Both, Left, Right},
    Itertools,
};

use crate::garner::ArbitraryConvolution;
use crate::mint::{Mint, Mod32, Modulus};
use crate::ntt::NttConvolution;

/// Multiplication strategy for [`Fps`].
///
/// Instances must be interchangeable: `C::default()` is constructed wherever a
/// product is needed, which stays cheap because the primitive-root search
/// behind both provided strategies is memoized.
pub trait Convolution: Default {
    /// The coefficient field.
    type M: Modulus;

    /// Full (untruncated) product of two coefficient sequences.
    fn convolve(&self, a: &[Mint<Self::M>], b: &[Mint<Self::M>]) -> Vec<Mint<Self::M>>;
}

impl<M: Modulus> Convolution for NttConvolution<M> {
    type M = M;

    fn convolve(&self, a: &[Mint<M>], b: &[Mint<M>]) -> Vec<Mint<M>> {
        NttConvolution::convolve(self, a, b)
    }
}

impl<M: Modulus<W = u32>> Convolution for ArbitraryConvolution<M> {
    type M = M;

    fn convolve(&self, a: &[Mint<M>], b: &[Mint<M>]) -> Vec<Mint<M>> {
        ArbitraryConvolution::convolve(self, a, b)
    }
}

/// Formal power series with coefficients in `Mint<C::M>`, lowest degree first.
pub struct Fps<C: Convolution> {
    coef: Vec<Mint<C::M>>,
    _conv: PhantomData<fn() -> C>,
}

/// Series over an NTT-friendly prime modulus.
pub type NttFps<const MOD: u32> = Fps<NttConvolution<Mod32<MOD>>>;
/// Series over an arbitrary odd 32-bit modulus, multiplied through CRT.
pub type ArbitraryFps<const MOD: u32> = Fps<ArbitraryConvolution<Mod32<MOD>>>;

impl<C: Convolution> Fps<C> {
    /// The zero series of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self::from_vec(vec![Mint::zero(); n])
    }

    fn from_vec(coef: Vec<Mint<C::M>>) -> Self {
        Self {
            coef,
            _conv: PhantomData,
        }
    }

    /// Number of stored coefficients.
    pub fn len(&self) -> usize {
        self.coef.len()
    }

    /// Whether no coefficients are stored.
    pub fn is_empty(&self) -> bool {
        self.coef.is_empty()
    }

    /// The stored coefficients.
    pub fn coeffs(&self) -> &[Mint<C::M>] {
        &self.coef
    }

    /// First `sz` coefficients, zero-extended to exactly `sz`.
    pub fn pre(&self, sz: usize) -> Self {
        let mut coef = vec![Mint::zero(); sz];
        let m = self.coef.len().min(sz);
        coef[..m].copy_from_slice(&self.coef[..m]);
        Self::from_vec(coef)
    }

    /// Multiplicative inverse modulo `x^deg` by Newton doubling.
    ///
    /// Requires a nonzero constant term; the modulus must be prime. O(N log N).
    pub fn inv(&self, deg: usize) -> Self {
        assert!(
            !self.coef.is_empty() && self.coef[0] != Mint::zero(),
            "series inverse requires a nonzero constant term"
        );
        let mut res = Self::from_vec(vec![self.coef[0].inv()]);
        let mut i = 1;
        while i < deg {
            res = (res.clone() + res.clone() - res.clone() * res * self.pre(2 * i)).pre(2 * i);
            i *= 2;
        }
        res.pre(deg)
    }

    /// Formal derivative. Empty and constant series differentiate to the empty
    /// series.
    pub fn diff(&self) -> Self {
        if self.coef.len() <= 1 {
            return Self::default();
        }
        Self::from_vec(
            self.coef[1..]
                .iter()
                .enumerate()
                .map(|(i, &x)| x * Mint::from(i + 1))
                .collect(),
        )
    }

    /// Formal antiderivative with zero constant term; one coefficient longer
    /// than the input.
    pub fn integral(&self) -> Self {
        let mut coef = vec![Mint::zero(); self.coef.len() + 1];
        for (i, &x) in self.coef.iter().enumerate() {
            coef[i + 1] = x / Mint::from(i + 1);
        }
        Self::from_vec(coef)
    }

    /// Logarithm modulo `x^deg`, as `integral(f'/f)`.
    ///
    /// Requires constant term 1 and `deg >= 1`. O(N log N).
    pub fn log(&self, deg: usize) -> Self {
        assert!(
            !self.coef.is_empty() && self.coef[0] == Mint::one(),
            "series logarithm requires constant term 1"
        );
        assert!(deg >= 1, "series logarithm needs at least one term");
        (self.diff() / self.pre(deg)).pre(deg - 1).integral()
    }

    /// Exponential modulo `x^deg` by Newton doubling against [`Fps::log`].
    ///
    /// Requires constant term 0. O(N log² N).
    pub fn exp(&self, deg: usize) -> Self {
        assert!(
            !self.coef.is_empty() && self.coef[0] == Mint::zero(),
            "series exponential requires constant term 0"
        );
        let mut res = Self::from_vec(vec![Mint::one()]);
        let mut i = 1;
        while i < deg {
            res = (res.clone() * (self.pre(2 * i) + Mint::one() - res.log(2 * i))).pre(2 * i);
            i *= 2;
        }
        res.pre(deg)
    }

    /// `t`-th power modulo `x^deg`, handling a zero lowest coefficient by
    /// factoring out the lowest nonzero term.
    ///
    /// `t = 0` gives the constant series 1; negative `t` inverts the positive
    /// power and then requires an invertible constant term. If the lowest
    /// nonzero term alone pushes the result past `x^deg`, the answer is the
    /// zero series of length `deg` without any transform work.
    pub fn pow(&self, t: i64, deg: usize) -> Self {
        if t == 0 {
            let mut res = Self::zeros(deg);
            if deg > 0 {
                res[0] = Mint::one();
            }
            return res;
        }
        if t < 0 {
            return self.pow(-t, deg).inv(deg);
        }
        let t_u = t as u64;
        let mut z = 0u64;
        for i in 0..self.coef.len() {
            let c = self.coef[i];
            if c != Mint::zero() {
                let res = (((self.clone() << i) / c).log(deg) * Mint::from(t)).exp(deg);
                // The accumulated shift i*t is below deg here, so it fits.
                return (res * c.pow(t) >> (i as u64 * t_u) as usize).pre(deg);
            }
            z += t_u;
            if z >= deg as u64 {
                return Self::zeros(deg);
            }
        }
        Self::zeros(deg)
    }
}

impl<C: Convolution> From<Vec<Mint<C::M>>> for Fps<C> {
    fn from(coef: Vec<Mint<C::M>>) -> Self {
        Self::from_vec(coef)
    }
}

impl<C: Convolution> From<Vec<i64>> for Fps<C> {
    fn from(coef: Vec<i64>) -> Self {
        Self::from_vec(coef.into_iter().map(Mint::from).collect())
    }
}

impl<C: Convolution> Clone for Fps<C> {
    fn clone(&self) -> Self {
        Self::from_vec(self.coef.clone())
    }
}

impl<C: Convolution> Default for Fps<C> {
    fn default() -> Self {
        Self::from_vec(Vec::new())
    }
}

impl<C: Convolution> PartialEq for Fps<C> {
    fn eq(&self, other: &Self) -> bool {
        self.coef == other.coef
    }
}

impl<C: Convolution> Eq for Fps<C> {}

impl<C: Convolution> fmt::Debug for Fps<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.coef).finish()
    }
}

impl<C: Convolution> Index<usize> for Fps<C> {
    type Output = Mint<C::M>;

    fn index(&self, i: usize) -> &Mint<C::M> {
        &self.coef[i]
    }
}

impl<C: Convolution> IndexMut<usize> for Fps<C> {
    fn index_mut(&mut self, i: usize) -> &mut Mint<C::M> {
        &mut self.coef[i]
    }
}

impl<C: Convolution> Add for Fps<C> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_vec(
            self.coef
                .into_iter()
                .zip_longest(rhs.coef)
                .map(|p| match p {
                    Both(a, b) => a + b,
                    Left(a) => a,
                    Right(b) => b,
                })
                .collect(),
        )
    }
}

impl<C: Convolution> Sub for Fps<C> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_vec(
            self.coef
                .into_iter()
                .zip_longest(rhs.coef)
                .map(|p| match p {
                    Both(a, b) => a - b,
                    Left(a) => a,
                    Right(b) => -b,
                })
                .collect(),
        )
    }
}

/// Full product; the result is not truncated.
impl<C: Convolution> Mul for Fps<C> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_vec(C::default().convolve(&self.coef, &rhs.coef))
    }
}

/// Multiplies by the divisor's inverse taken to `max(len, rhs.len)` terms;
/// truncate the result yourself if a fixed precision is wanted.
impl<C: Convolution> Div for Fps<C> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let deg = self.coef.len().max(rhs.coef.len());
        let inv = rhs.inv(deg);
        self * inv
    }
}

impl<C: Convolution> Neg for Fps<C> {
    type Output = Self;

    fn neg(mut self) -> Self {
        for x in &mut self.coef {
            *x = -*x;
        }
        self
    }
}

impl<C: Convolution> Add<Mint<C::M>> for Fps<C> {
    type Output = Self;

    fn add(mut self, rhs: Mint<C::M>) -> Self {
        if self.coef.is_empty() {
            self.coef.push(Mint::zero());
        }
        self.coef[0] += rhs;
        self
    }
}

impl<C: Convolution> Sub<Mint<C::M>> for Fps<C> {
    type Output = Self;

    fn sub(mut self, rhs: Mint<C::M>) -> Self {
        if self.coef.is_empty() {
            self.coef.push(Mint::zero());
        }
        self.coef[0] -= rhs;
        self
    }
}

impl<C: Convolution> Mul<Mint<C::M>> for Fps<C> {
    type Output = Self;

    fn mul(mut self, rhs: Mint<C::M>) -> Self {
        for x in &mut self.coef {
            *x *= rhs;
        }
        self
    }
}

impl<C: Convolution> Div<Mint<C::M>> for Fps<C> {
    type Output = Self;

    fn div(mut self, rhs: Mint<C::M>) -> Self {
        let ri = rhs.inv();
        for x in &mut self.coef {
            *x *= ri;
        }
        self
    }
}

/// Discards the `sz` lowest coefficients (division by `x^sz`).
impl<C: Convolution> Shl<usize> for Fps<C> {
    type Output = Self;

    fn shl(mut self, sz: usize) -> Self {
        if self.coef.len() <= sz {
            self.coef.clear();
        } else {
            self.coef.drain(..sz);
        }
        self
    }
}

/// Prepends `sz` zero coefficients (multiplication by `x^sz`).
impl<C: Convolution> Shr<usize> for Fps<C> {
    type Output = Self;

    fn shr(self, sz: usize) -> Self {
        let mut coef = vec![Mint::zero(); sz];
        coef.extend(self.coef);
        Self::from_vec(coef)
    }
}
