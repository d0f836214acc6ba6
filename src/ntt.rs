//! Convolution modulo an NTT-friendly prime `mod = d·2^s + 1`.
//!
//! Forward/inverse transforms are radix-4 with one extra radix-2 stage when
//! the length exponent is odd, driven by a root table precomputed per call.
//! The inverse transform is unnormalized; `convolve` multiplies by `n2^{-1}`
//! at the end.

use crate::mint::{Mint, Modulus, Word};

/// Convolution under the NTT-friendly prime modulus `M::MOD`.
///
/// Construction runs the primitive-root search once; everything else is a
/// pure function of the inputs.
#[derive(Debug, Clone, Copy)]
pub struct NttConvolution<M: Modulus> {
    pr: Mint<M>,
}

impl<M: Modulus> Default for NttConvolution<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Modulus> NttConvolution<M> {
    /// Creates the instance, seeding the root table base from the smallest
    /// primitive root of the modulus.
    pub fn new() -> Self {
        Self {
            pr: Mint::primitive_root(),
        }
    }

    // ------------------------------------------------------------
    // 補助: 1 の原始 n2 乗根のテーブル
    // ------------------------------------------------------------
    /// `root[i] = g^((mod-1)/n2 * i)` for `0 <= i <= n2`.
    fn root_table(&self, n2: usize) -> Vec<Mint<M>> {
        let m = M::MOD.as_u64();
        let g = self.pr.pow(((m - 1) / n2 as u64) as i64);
        let mut root = vec![Mint::one(); n2 + 1];
        for i in 0..n2 {
            root[i + 1] = root[i] * g;
        }
        root
    }

    /// Convolution of two coefficient sequences.
    ///
    /// For `mod = d·2^s + 1` the inputs must satisfy
    /// `a.len() + b.len() - 1 <= 2^s`; longer inputs are a contract violation
    /// (use [`NttConvolution::large`] instead). Empty input yields empty
    /// output. O(N log N).
    pub fn convolve(&self, a: &[Mint<M>], b: &[Mint<M>]) -> Vec<Mint<M>> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let n = a.len() + b.len() - 1;
        let mut n2 = 1usize;
        while n2 < n {
            n2 *= 2;
        }
        assert_eq!(
            (M::MOD.as_u64() - 1) % n2 as u64,
            0,
            "convolution length exceeds the transform capacity of the modulus"
        );
        let root = self.root_table(n2);
        let mut a2 = vec![Mint::zero(); n2];
        let mut b2 = vec![Mint::zero(); n2];
        a2[..a.len()].copy_from_slice(a);
        b2[..b.len()].copy_from_slice(b);
        ntt(&mut a2, &root);
        ntt(&mut b2, &root);
        for i in 0..n2 {
            a2[i] *= b2[i];
        }
        intt(&mut a2, &root);
        let ni = Mint::from(n2).inv();
        a2.truncate(n);
        for x in &mut a2 {
            *x *= ni;
        }
        a2
    }

    /// Convolution of raw residues in `[0, mod)`, lifted into the field and
    /// projected back. Same contract as [`NttConvolution::convolve`].
    pub fn convolve_raw(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let a: Vec<Mint<M>> = a.iter().map(|&x| Mint::from(x)).collect();
        let b: Vec<Mint<M>> = b.iter().map(|&x| Mint::from(x)).collect();
        self.convolve(&a, &b)
            .into_iter()
            .map(|x| x.val().as_u64())
            .collect()
    }

    /// Convolution of inputs longer than the transform capacity `2^s`.
    ///
    /// Splits both inputs into chunks of `2^(s-1)`, transforms each chunk at
    /// the maximal length, multiplies all chunk pairs in the transform domain
    /// and overlap-adds the partial products. Trades recomputation for
    /// supporting arbitrary lengths under a fixed modulus.
    pub fn large(&self, a: &[Mint<M>], b: &[Mint<M>]) -> Vec<Mint<M>> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let n = a.len() + b.len() - 1;
        let n2 = 1usize << (M::MOD.as_u64() - 1).trailing_zeros();
        let half = n2 / 2;
        let root = self.root_table(n2);
        let transform_chunks = |v: &[Mint<M>]| -> Vec<Vec<Mint<M>>> {
            v.chunks(half)
                .map(|chunk| {
                    let mut v2 = vec![Mint::zero(); n2];
                    v2[..chunk.len()].copy_from_slice(chunk);
                    ntt(&mut v2, &root);
                    v2
                })
                .collect()
        };
        let asets = transform_chunks(a);
        let bsets = transform_chunks(b);
        let mut csets = vec![vec![Mint::zero(); n2]; asets.len() + bsets.len() - 1];
        for (i, ai) in asets.iter().enumerate() {
            for (j, bj) in bsets.iter().enumerate() {
                let target = &mut csets[i + j];
                for k in 0..n2 {
                    target[k] += ai[k] * bj[k];
                }
            }
        }
        for cs in &mut csets {
            intt(cs, &root);
        }
        let mut c = vec![Mint::zero(); n];
        for (i, cs) in csets.iter().enumerate() {
            let offset = half * i;
            let len = n2.min(n - offset);
            for j in 0..len {
                c[j + offset] += cs[j];
            }
        }
        let ni = Mint::from(n2).inv();
        for x in &mut c {
            *x *= ni;
        }
        c
    }
}

// ------------------------------------------------------------
// 基数 4 バタフライ本体
// ------------------------------------------------------------

/// In-place forward transform of a power-of-two-length slice.
fn ntt<M: Modulus>(v: &mut [Mint<M>], root: &[Mint<M>]) {
    let n = v.len();
    if n <= 1 {
        return;
    }
    if n == 2 {
        let v0 = v[0];
        v[0] = v0 + v[1];
        v[1] = v0 - v[1];
        return;
    }
    let e = n.trailing_zeros() as usize;
    let mut d = e;
    let n2 = 1usize << e;
    if e & 1 == 1 {
        // One radix-2 stage brings the remaining depth to an even number.
        let b = n2 >> 1;
        for i in 0..b {
            let s = v[i];
            let t = v[i + b];
            v[i] = s + t;
            v[i + b] = (s - t) * root[n2 - i];
        }
        d -= 1;
    }
    let mut b = 1usize << (d - 2);
    while d >= 2 {
        let mut i = 0;
        while i < n2 {
            for j in 0..b {
                let p0 = i + j;
                let p1 = p0 + b;
                let p2 = p1 + b;
                let p3 = p2 + b;
                let t0 = v[p0];
                let t1 = v[p1];
                let t2 = v[p2];
                let t3 = v[p3];
                let t0p2 = t0 + t2;
                let t1p3 = t1 + t3;
                let t0m2 = (t0 - t2) * root[n2 - (j << (e - d))];
                let t1m3 = (t1 - t3) * root[n2 - ((j + b) << (e - d))];
                v[p0] = t0p2 + t1p3;
                v[p1] = (t0p2 - t1p3) * root[n2 - (j << (e - d + 1))];
                v[p2] = t0m2 + t1m3;
                v[p3] = (t0m2 - t1m3) * root[n2 - (j << (e - d + 1))];
            }
            i += b << 2;
        }
        d -= 2;
        b >>= 2;
    }
}

/// In-place inverse transform; leaves the `n2^{-1}` normalization to the
/// caller.
fn intt<M: Modulus>(v: &mut [Mint<M>], root: &[Mint<M>]) {
    let n = v.len();
    if n <= 1 {
        return;
    }
    if n == 2 {
        let v0 = v[0];
        v[0] = v0 + v[1];
        v[1] = v0 - v[1];
        return;
    }
    let e = n.trailing_zeros() as usize;
    let mut d = 2;
    let n2 = 1usize << e;
    let mut b = 1usize;
    while d <= e {
        let mut i = 0;
        while i < n2 {
            for j in 0..b {
                let p0 = i + j;
                let p1 = p0 + b;
                let p2 = p1 + b;
                let p3 = p2 + b;
                let t0 = v[p0];
                let t1 = v[p1] * root[j << (e - d + 1)];
                let t2 = v[p2];
                let t3 = v[p3] * root[j << (e - d + 1)];
                let t0p1 = t0 + t1;
                let t2p3 = (t2 + t3) * root[j << (e - d)];
                let t0m1 = t0 - t1;
                let t2m3 = (t2 - t3) * root[(j + b) << (e - d)];
                v[p0] = t0p1 + t2p3;
                v[p1] = t0m1 + t2m3;
                v[p2] = t0p1 - t2p3;
                v[p3] = t0m1 - t2m3;
            }
            i += b << 2;
        }
        d += 2;
        b <<= 2;
    }
    if e & 1 == 1 {
        let b = n2 >> 1;
        for i in 0..b {
            let s = v[i];
            let t = v[i + b] * root[i];
            v[i] = s + t;
            v[i + b] = s - t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::{Mint32, Mod32};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    type M998 = Mod32<998244353>;
    type M257 = Mod32<257>;

    fn brute<M: Modulus>(a: &[Mint<M>], b: &[Mint<M>]) -> Vec<Mint<M>> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let mut c = vec![Mint::zero(); a.len() + b.len() - 1];
        for (i, &x) in a.iter().enumerate() {
            for (j, &y) in b.iter().enumerate() {
                c[i + j] += x * y;
            }
        }
        c
    }

    #[test]
    fn small_known_product() {
        let conv = NttConvolution::<M998>::new();
        let c = conv.convolve_raw(&[1, 2, 3], &[4, 5]);
        assert_eq!(c, vec![4, 13, 22, 15]);
    }

    #[test]
    fn output_length_is_sum_minus_one() {
        let conv = NttConvolution::<M998>::new();
        for (la, lb) in [(1, 1), (1, 5), (7, 3), (16, 16)] {
            let a = vec![Mint32::<998244353>::one(); la];
            let b = vec![Mint32::<998244353>::one(); lb];
            assert_eq!(conv.convolve(&a, &b).len(), la + lb - 1);
        }
    }

    #[test]
    fn matches_brute_force() {
        let conv = NttConvolution::<M998>::new();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            let la = rng.gen_range(1..50);
            let lb = rng.gen_range(1..50);
            let a: Vec<Mint32<998244353>> =
                (0..la).map(|_| Mint::from(rng.gen_range(0..998244353u64))).collect();
            let b: Vec<Mint32<998244353>> =
                (0..lb).map(|_| Mint::from(rng.gen_range(0..998244353u64))).collect();
            assert_eq!(conv.convolve(&a, &b), brute(&a, &b));
        }
    }

    #[test]
    fn small_modulus_within_capacity() {
        // 257 = 2^8 + 1 supports transform lengths up to 256.
        let conv = NttConvolution::<M257>::new();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let la = rng.gen_range(1..128);
            let lb = rng.gen_range(1..129);
            let a: Vec<Mint32<257>> =
                (0..la).map(|_| Mint::from(rng.gen_range(0..257u64))).collect();
            let b: Vec<Mint32<257>> =
                (0..lb).map(|_| Mint::from(rng.gen_range(0..257u64))).collect();
            assert_eq!(conv.convolve(&a, &b), brute(&a, &b));
        }
    }

    #[test]
    #[should_panic(expected = "transform capacity")]
    fn capacity_overflow_asserts() {
        let conv = NttConvolution::<M257>::new();
        let a = vec![Mint32::<257>::one(); 200];
        let b = vec![Mint32::<257>::one(); 200];
        let _ = conv.convolve(&a, &b);
    }

    #[test]
    fn large_handles_over_capacity_inputs() {
        let conv = NttConvolution::<M257>::new();
        let mut rng = StdRng::seed_from_u64(10);
        for _ in 0..5 {
            let la = rng.gen_range(200..400);
            let lb = rng.gen_range(200..400);
            let a: Vec<Mint32<257>> =
                (0..la).map(|_| Mint::from(rng.gen_range(0..257u64))).collect();
            let b: Vec<Mint32<257>> =
                (0..lb).map(|_| Mint::from(rng.gen_range(0..257u64))).collect();
            assert_eq!(conv.large(&a, &b), brute(&a, &b));
        }
    }

    #[test]
    fn large_with_odd_length_exponent() {
        // 97 = 3·2^5 + 1: the full transform length 32 has an odd exponent,
        // so the radix-2 stage runs inside every chunk transform.
        let conv = NttConvolution::<Mod32<97>>::new();
        let mut rng = StdRng::seed_from_u64(30);
        for _ in 0..10 {
            let la = rng.gen_range(33..80);
            let lb = rng.gen_range(33..80);
            let a: Vec<Mint32<97>> =
                (0..la).map(|_| Mint::from(rng.gen_range(0..97u64))).collect();
            let b: Vec<Mint32<97>> =
                (0..lb).map(|_| Mint::from(rng.gen_range(0..97u64))).collect();
            assert_eq!(conv.large(&a, &b), brute(&a, &b));
        }
    }

    #[test]
    fn large_agrees_with_convolve_in_range() {
        let conv = NttConvolution::<M257>::new();
        let mut rng = StdRng::seed_from_u64(11);
        let a: Vec<Mint32<257>> =
            (0..40).map(|_| Mint::from(rng.gen_range(0..257u64))).collect();
        let b: Vec<Mint32<257>> =
            (0..33).map(|_| Mint::from(rng.gen_range(0..257u64))).collect();
        assert_eq!(conv.large(&a, &b), conv.convolve(&a, &b));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let conv = NttConvolution::<M998>::new();
        let empty: Vec<Mint32<998244353>> = Vec::new();
        let a = vec![Mint32::<998244353>::one(); 3];
        assert!(conv.convolve(&empty, &a).is_empty());
        assert!(conv.convolve(&a, &empty).is_empty());
        assert!(conv.large(&empty, &empty).is_empty());
        assert!(conv.convolve_raw(&[], &[1, 2]).is_empty());
    }
}
