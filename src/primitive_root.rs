//! Primitive-root search, extending [`Mint`] and [`DynMontgomery`].
//!
//! The modulus must be prime in both variants; behavior is unspecified
//! otherwise. Static moduli get the smallest root, found deterministically and
//! memoized per modulus value so that convolution construction stays cheap.
//! Runtime moduli draw candidates from an injected RNG, so determinism is the
//! caller's choice of seed.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use rand::Rng;

use crate::dynamic::{DynMint, DynMontgomery};
use crate::factorize::factorize;
use crate::mint::{Mint, Modulus, Word};

/// Smallest primitive roots already found, keyed by modulus value.
static ROOT_CACHE: OnceLock<Mutex<HashMap<u64, u64>>> = OnceLock::new();

impl<M: Modulus> Mint<M> {
    /// The smallest primitive root of the (prime) modulus.
    ///
    /// Factors `m-1` once, then tests candidates `1, 2, 3, …` against every
    /// prime divisor. Deterministic, so repeated calls agree; the result is
    /// memoized process-wide.
    pub fn primitive_root() -> Self {
        let m = M::MOD.as_u64();
        let cache = ROOT_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        if let Some(&g) = cache
            .lock()
            .expect("primitive root cache poisoned")
            .get(&m)
        {
            return Self::from(g);
        }
        let phi = m - 1;
        let primes: Vec<u64> = factorize(phi).into_keys().collect();
        let mut g = Self::one();
        loop {
            if primes
                .iter()
                .all(|&q| g.pow((phi / q) as i64) != Self::one())
            {
                cache
                    .lock()
                    .expect("primitive root cache poisoned")
                    .insert(m, g.val().as_u64());
                return g;
            }
            g += Self::one();
        }
    }
}

impl<W: Word> DynMontgomery<W> {
    /// A primitive root of the (prime) modulus, drawn from `rng`.
    ///
    /// Terminates with probability 1 for any genuine prime; the returned root
    /// varies with the RNG state.
    pub fn primitive_root<R: Rng>(&self, rng: &mut R) -> DynMint<W> {
        let m = self.modulus().as_u64();
        let phi = m - 1;
        let primes: Vec<u64> = factorize(phi).into_keys().collect();
        loop {
            let g = self.from_u64(rng.gen_range(1..m));
            if primes
                .iter()
                .all(|&q| self.val(self.pow(g, phi / q)).as_u64() != 1)
            {
                return g;
            }
        }
    }
}
