//! Miller–Rabin primality testing and Pollard's rho factorization.
//!
//! Both run on [`DynMontgomery`] arithmetic, so they accept any odd modulus
//! candidate below `2^62`. Consumed by the primitive-root search; also usable
//! on its own.

use std::collections::BTreeMap;

use num_integer::gcd;

use crate::dynamic::DynMontgomery;

/// Deterministic Miller–Rabin for `n < 2^62`.
pub fn is_prime(n: u64) -> bool {
    if n == 2 {
        return true;
    }
    if n < 2 || n % 2 == 0 {
        return false;
    }
    let mont = DynMontgomery::<u64>::new(n).expect("odd n < 2^62 is a valid modulus");
    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }
    // Sprp base sets proven exhaustive for the respective ranges.
    let bases: &[u64] = if n < 1 << 32 {
        &[2, 7, 61]
    } else {
        &[2, 325, 9375, 28178, 450775, 9780504, 1795265022]
    };
    let one = mont.one();
    let minus_one = mont.from_i64(-1);
    'base: for &b in bases {
        if b % n == 0 {
            continue;
        }
        let a = mont.from_u64(b);
        let mut t = mont.pow(a, d);
        if mont.val(t) == mont.val(one) {
            continue;
        }
        for _ in 0..s {
            if mont.val(t) == mont.val(minus_one) {
                continue 'base;
            }
            t = mont.mul(t, t);
        }
        return false;
    }
    true
}

/// One prime factor of composite `n`, by Brent's cycle-finding variant of
/// Pollard's rho. O(n^(1/4)) expected.
fn find_prime_factor(n: u64) -> u64 {
    if n % 2 == 0 {
        return 2;
    }
    let mont = DynMontgomery::<u64>::new(n).expect("odd n < 2^62 is a valid modulus");
    let m = ((n as f64).powf(0.125).round() as u64) + 1;
    for c in 1..n {
        let c = mont.from_u64(c);
        let mut y = mont.zero();
        let mut x = y;
        let mut yc = y;
        let mut q = mont.one();
        let mut r = 1u64;
        let mut k = 0u64;
        let mut g = 1u64;
        while g == 1 {
            x = y;
            while k < r * 3 / 4 {
                y = mont.add(mont.mul(y, y), c);
                k += 1;
            }
            while k < r && g == 1 {
                yc = y;
                let l = m.min(r - k);
                for _ in 0..l {
                    y = mont.add(mont.mul(y, y), c);
                    q = mont.mul(q, mont.sub(x, y));
                }
                g = gcd(mont.val(q), n);
                k += m;
            }
            k = r;
            r *= 2;
        }
        if g == n {
            g = 1;
            y = yc;
            while g == 1 {
                y = mont.add(mont.mul(y, y), c);
                g = gcd(mont.val(mont.sub(x, y)), n);
            }
        }
        if g == n {
            continue;
        }
        if is_prime(g) {
            return g;
        } else if is_prime(n / g) {
            return n / g;
        }
        return find_prime_factor(g);
    }
    unreachable!("every composite has a prime factor")
}

/// Factorization of `n` as a prime → exponent map. Requires `0 < n < 2^62`.
pub fn factorize(mut n: u64) -> BTreeMap<u64, u32> {
    assert!(n > 0, "cannot factorize zero");
    let mut res = BTreeMap::new();
    while n > 1 && !is_prime(n) {
        let p = find_prime_factor(n);
        while n % p == 0 {
            n /= p;
            *res.entry(p).or_insert(0) += 1;
        }
    }
    if n > 1 {
        *res.entry(n).or_insert(0) += 1;
    }
    res
}
