//! Convolution for moduli that are not NTT-friendly, via three NTT-friendly
//! primes and Garner's sequential CRT reconstruction.
//!
//! The three primes are fixed per variant and chosen so that their product
//! exceeds any true convolution value for the supported coefficient and
//! length ranges, i.e. `max(a)·max(b)·min(len(a), len(b)) < p0·p1·p2`. That
//! bound is a documented precondition, not a runtime check.

use crate::mint::{Mint, Mint32, Mint64, Mod32, Mod64, Modulus};
use crate::ntt::NttConvolution;

/// First CRT prime, `5·2^25 + 1`.
const MOD0: u32 = 167_772_161;
/// Second CRT prime, `7·2^26 + 1`.
const MOD1: u32 = 469_762_049;
/// Third CRT prime, `45·2^24 + 1`.
const MOD2: u32 = 754_974_721;

/// Convolution under an arbitrary odd 32-bit modulus `M::MOD`.
///
/// Runs the inputs through three fixed [`NttConvolution`] instances and
/// recombines each coefficient with Garner's algorithm; the pairwise
/// reciprocals of the primes are cached at construction.
#[derive(Debug, Clone, Copy)]
pub struct ArbitraryConvolution<M: Modulus<W = u32>> {
    conv0: NttConvolution<Mod32<MOD0>>,
    conv1: NttConvolution<Mod32<MOD1>>,
    conv2: NttConvolution<Mod32<MOD2>>,
    r01: u64,
    r12: u64,
    r02r12: u64,
    _marker: std::marker::PhantomData<M>,
}

impl<M: Modulus<W = u32>> Default for ArbitraryConvolution<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Modulus<W = u32>> ArbitraryConvolution<M> {
    /// Creates the instance and caches `p0^{-1} mod p1`, `p1^{-1} mod p2` and
    /// `p0^{-1}·p1^{-1} mod p2`.
    pub fn new() -> Self {
        let r01 = Mint32::<MOD1>::from(MOD0).inv().val() as u64;
        let r02 = Mint32::<MOD2>::from(MOD0).inv().val() as u64;
        let r12 = Mint32::<MOD2>::from(MOD1).inv().val() as u64;
        Self {
            conv0: NttConvolution::new(),
            conv1: NttConvolution::new(),
            conv2: NttConvolution::new(),
            r01,
            r12,
            r02r12: r02 * r12 % MOD2 as u64,
            _marker: std::marker::PhantomData,
        }
    }

    /// Garner reconstruction of one coefficient from its three residues.
    /// `p0p1` is `p0·p1` already reduced by the target modulus, so the result
    /// is only congruent to the true value modulo `M::MOD`; it fits in a
    /// `u64` and the caller finishes the reduction.
    fn reconstruct(&self, c0: u64, c1: u64, c2: u64, p0p1: u64) -> u64 {
        let t0 = c0;
        let t1 = (c1 + MOD1 as u64 - t0) * self.r01 % MOD1 as u64;
        let t2 = ((c2 + MOD2 as u64 - t0) * self.r02r12
            + (MOD2 as u64 - t1) * self.r12)
            % MOD2 as u64;
        t0 + t1 * MOD0 as u64 + t2 * p0p1
    }

    /// Convolution of two field-element sequences. Empty input yields empty
    /// output. O(N log N).
    pub fn convolve(&self, a: &[Mint<M>], b: &[Mint<M>]) -> Vec<Mint<M>> {
        let ia: Vec<u64> = a.iter().map(|x| x.val() as u64).collect();
        let ib: Vec<u64> = b.iter().map(|x| x.val() as u64).collect();
        let c0 = self.conv0.convolve_raw(&ia, &ib);
        let c1 = self.conv1.convolve_raw(&ia, &ib);
        let c2 = self.conv2.convolve_raw(&ia, &ib);
        let w = MOD0 as u64 * MOD1 as u64 % M::MOD as u64;
        (0..c0.len())
            .map(|i| Mint::from(self.reconstruct(c0[i], c1[i], c2[i], w)))
            .collect()
    }

    /// Convolution of raw residues in `[0, M::MOD)`, reduced modulo `M::MOD`.
    pub fn convolve_raw(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let c0 = self.conv0.convolve_raw(a, b);
        let c1 = self.conv1.convolve_raw(a, b);
        let c2 = self.conv2.convolve_raw(a, b);
        let m = M::MOD as u64;
        let w = MOD0 as u64 * MOD1 as u64 % m;
        (0..c0.len())
            .map(|i| self.reconstruct(c0[i], c1[i], c2[i], w) % m)
            .collect()
    }
}

/// First 64-bit CRT prime, `32715·2^47 + 1`.
const P0: u64 = 4_604_226_931_544_555_521;
/// Second 64-bit CRT prime, `32721·2^47 + 1`.
const P1: u64 = 4_605_071_356_474_687_489;
/// Third 64-bit CRT prime, `65515·2^46 + 1`.
const P2: u64 = 4_610_208_274_799_656_961;

/// Convolution with wrap-around modulo `2^64`, via three 62-bit NTT-friendly
/// primes and the same Garner reconstruction as [`ArbitraryConvolution`].
#[derive(Debug, Clone, Copy)]
pub struct ConvolutionU64 {
    conv0: NttConvolution<Mod64<P0>>,
    conv1: NttConvolution<Mod64<P1>>,
    conv2: NttConvolution<Mod64<P2>>,
    r01: u64,
    r12: u64,
    r02r12: u64,
}

impl Default for ConvolutionU64 {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvolutionU64 {
    /// Creates the instance and caches the pairwise prime reciprocals.
    pub fn new() -> Self {
        let r01 = Mint64::<P1>::from(P0).inv().val();
        let r02 = Mint64::<P2>::from(P0).inv().val();
        let r12 = Mint64::<P2>::from(P1).inv().val();
        Self {
            conv0: NttConvolution::new(),
            conv1: NttConvolution::new(),
            conv2: NttConvolution::new(),
            r01,
            r12,
            r02r12: (r02 as u128 * r12 as u128 % P2 as u128) as u64,
        }
    }

    /// Convolution of `u64` sequences with every coefficient taken modulo
    /// `2^64`. Empty input yields empty output. O(N log N).
    pub fn convolve(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let c0 = self.conv0.convolve_raw(a, b);
        let c1 = self.conv1.convolve_raw(a, b);
        let c2 = self.conv2.convolve_raw(a, b);
        let w = P0.wrapping_mul(P1);
        (0..c0.len())
            .map(|i| {
                let t0 = c0[i];
                // Wrapping keeps the exact nonnegative representative here:
                // the residues are below their primes, so the +p term undoes
                // any borrow from the subtraction.
                let d1 = c1[i].wrapping_sub(t0).wrapping_add(P1);
                let t1 = (d1 as u128 * self.r01 as u128 % P1 as u128) as u64;
                let d2 = c2[i].wrapping_sub(t0).wrapping_add(P2);
                let t2 = ((d2 as u128 * self.r02r12 as u128
                    + (P2 - t1) as u128 * self.r12 as u128)
                    % P2 as u128) as u64;
                t0.wrapping_add(t1.wrapping_mul(P0))
                    .wrapping_add(t2.wrapping_mul(w))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    type M1e9 = Mod32<1_000_000_007>;

    fn brute_mod(a: &[u64], b: &[u64], m: u64) -> Vec<u64> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let mut c = vec![0u64; a.len() + b.len() - 1];
        for (i, &x) in a.iter().enumerate() {
            for (j, &y) in b.iter().enumerate() {
                c[i + j] = ((c[i + j] as u128 + x as u128 * y as u128) % m as u128) as u64;
            }
        }
        c
    }

    #[test]
    fn non_ntt_friendly_modulus_matches_brute_force() {
        let conv = ArbitraryConvolution::<M1e9>::new();
        let m = 1_000_000_007u64;
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..50 {
            let la = rng.gen_range(1..40);
            let lb = rng.gen_range(1..40);
            let a: Vec<u64> = (0..la).map(|_| rng.gen_range(0..m)).collect();
            let b: Vec<u64> = (0..lb).map(|_| rng.gen_range(0..m)).collect();
            assert_eq!(conv.convolve_raw(&a, &b), brute_mod(&a, &b, m));
        }
    }

    #[test]
    fn field_and_raw_paths_agree() {
        let conv = ArbitraryConvolution::<M1e9>::new();
        let mut rng = StdRng::seed_from_u64(13);
        let a: Vec<u64> = (0..25).map(|_| rng.gen_range(0..1_000_000_007)).collect();
        let b: Vec<u64> = (0..31).map(|_| rng.gen_range(0..1_000_000_007)).collect();
        let am: Vec<Mint<M1e9>> = a.iter().map(|&x| Mint::from(x)).collect();
        let bm: Vec<Mint<M1e9>> = b.iter().map(|&x| Mint::from(x)).collect();
        let via_field: Vec<u64> = conv
            .convolve(&am, &bm)
            .into_iter()
            .map(|x| x.val() as u64)
            .collect();
        assert_eq!(via_field, conv.convolve_raw(&a, &b));
    }

    #[test]
    fn known_product_under_1e9_7() {
        let conv = ArbitraryConvolution::<M1e9>::new();
        assert_eq!(
            conv.convolve_raw(&[1, 2, 3], &[4, 5]),
            vec![4, 13, 22, 15]
        );
    }

    #[test]
    fn works_for_ntt_friendly_target_too() {
        let conv = ArbitraryConvolution::<Mod32<998244353>>::new();
        let mut rng = StdRng::seed_from_u64(14);
        let a: Vec<u64> = (0..20).map(|_| rng.gen_range(0..998244353)).collect();
        let b: Vec<u64> = (0..20).map(|_| rng.gen_range(0..998244353)).collect();
        assert_eq!(conv.convolve_raw(&a, &b), brute_mod(&a, &b, 998244353));
    }

    #[test]
    fn empty_inputs() {
        let conv = ArbitraryConvolution::<M1e9>::new();
        assert!(conv.convolve_raw(&[], &[1, 2]).is_empty());
        let conv64 = ConvolutionU64::new();
        assert!(conv64.convolve(&[], &[]).is_empty());
    }

    #[test]
    fn u64_convolution_wraps_mod_2_64() {
        fn brute_wrapping(a: &[u64], b: &[u64]) -> Vec<u64> {
            let mut c = vec![0u64; a.len() + b.len() - 1];
            for (i, &x) in a.iter().enumerate() {
                for (j, &y) in b.iter().enumerate() {
                    c[i + j] = c[i + j].wrapping_add(x.wrapping_mul(y));
                }
            }
            c
        }
        let conv = ConvolutionU64::new();
        let mut rng = StdRng::seed_from_u64(15);
        for _ in 0..10 {
            let la = rng.gen_range(1..12);
            let lb = rng.gen_range(1..12);
            let a: Vec<u64> = (0..la).map(|_| rng.gen()).collect();
            let b: Vec<u64> = (0..lb).map(|_| rng.gen()).collect();
            assert_eq!(conv.convolve(&a, &b), brute_wrapping(&a, &b));
        }
    }
}
