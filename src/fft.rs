//! Radix-2 NTT domains over the BN254 scalar field
//!
//! A [`Domain`] evaluates polynomials on a power-of-two subgroup of `Fr*`,
//! or on a multiplicative coset `shift·⟨g⟩` of it. Both decimation orderings
//! are exposed so callers can skip reordering passes they do not need:
//!
//! - [`Decimation::Dif`]: natural-order input, bit-reversed output
//! - [`Decimation::Dit`]: bit-reversed input, natural-order output
//!
//! A forward DIF pass followed by an inverse DIT pass round-trips without any
//! explicit permutation. Interpolation into natural-order coefficients is an
//! inverse DIF pass followed by [`bit_reverse`].
//!
//! The coset variant is what makes negacyclic arithmetic cheap: with a shift
//! satisfying `shiftᵈ = -1`, every evaluation point is a root of `Xᵈ + 1`, so
//! pointwise products in evaluation form already carry the reduction modulo
//! `Xᵈ + 1` and the inverse transform recovers the reduced coefficients.

use ark_bn254::Fr;
use ark_ff::{FftField, Field, One};
use thiserror::Error;

/// Two-adicity of the BN254 scalar field: `r - 1 = 2²⁸ · t` with `t` odd.
pub const TWO_ADICITY: u32 = 28;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("domain of size {0} does not fit in the 2^28-order subgroup")]
    UnsupportedSize(usize),
    #[error("the coset shift must be invertible")]
    NonInvertibleShift,
}

/// Butterfly ordering of a transform pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decimation {
    /// Decimation in frequency: natural input, bit-reversed output.
    Dif,
    /// Decimation in time: bit-reversed input, natural output.
    Dit,
}

/// Evaluation domain `shift·⟨g⟩` with `g` of power-of-two order.
#[derive(Debug, Clone)]
pub struct Domain {
    /// Number of evaluation points (power of two).
    pub cardinality: usize,
    /// `cardinality⁻¹` in `Fr`.
    pub cardinality_inv: Fr,
    /// Generator of the subgroup of order `cardinality`.
    pub generator: Fr,
    /// `generator⁻¹`.
    pub generator_inv: Fr,
    /// Coset shift (1 when evaluating on the plain subgroup).
    pub shift: Fr,
    /// `shift⁻¹`.
    pub shift_inv: Fr,
    /// Powers `g⁰ … g^(n/2 - 1)`.
    twiddles: Vec<Fr>,
    /// Powers of `g⁻¹`, same layout.
    twiddles_inv: Vec<Fr>,
}

impl Domain {
    /// Build a domain with cardinality `size` rounded up to the next power
    /// of two, optionally shifted onto a coset.
    pub fn new(size: usize, shift: Option<Fr>) -> Result<Self, Error> {
        let cardinality = size.max(1).next_power_of_two();
        if cardinality.trailing_zeros() > TWO_ADICITY {
            return Err(Error::UnsupportedSize(size));
        }
        let generator =
            Fr::get_root_of_unity(cardinality as u64).ok_or(Error::UnsupportedSize(size))?;
        let generator_inv = generator.inverse().ok_or(Error::UnsupportedSize(size))?;
        let cardinality_inv = Fr::from(cardinality as u64)
            .inverse()
            .ok_or(Error::UnsupportedSize(size))?;
        let shift = shift.unwrap_or_else(Fr::one);
        let shift_inv = shift.inverse().ok_or(Error::NonInvertibleShift)?;

        let half = cardinality / 2;
        let mut twiddles = Vec::with_capacity(half);
        let mut twiddles_inv = Vec::with_capacity(half);
        let mut w = Fr::one();
        let mut w_inv = Fr::one();
        for _ in 0..half {
            twiddles.push(w);
            twiddles_inv.push(w_inv);
            w *= generator;
            w_inv *= generator_inv;
        }

        Ok(Self {
            cardinality,
            cardinality_inv,
            generator,
            generator_inv,
            shift,
            shift_inv,
            twiddles,
            twiddles_inv,
        })
    }

    /// Forward transform in place. With `on_coset`, entry `i` (natural
    /// order) is pre-scaled by `shiftⁱ` so the output is the evaluation on
    /// `shift·⟨g⟩` instead of `⟨g⟩`.
    pub fn fft(&self, a: &mut [Fr], decimation: Decimation, on_coset: bool) {
        assert_eq!(a.len(), self.cardinality, "input length must match the domain");
        if on_coset {
            let bitrev_layout = decimation == Decimation::Dit;
            scale_by_powers(a, self.shift, Fr::one(), bitrev_layout);
        }
        match decimation {
            Decimation::Dif => self.butterflies_dif(a, &self.twiddles),
            Decimation::Dit => self.butterflies_dit(a, &self.twiddles),
        }
    }

    /// Inverse transform in place. Output entry `i` (natural order) is
    /// scaled by `1/n`, and additionally by `shift⁻ⁱ` with `on_coset`.
    pub fn fft_inverse(&self, a: &mut [Fr], decimation: Decimation, on_coset: bool) {
        assert_eq!(a.len(), self.cardinality, "input length must match the domain");
        match decimation {
            Decimation::Dif => self.butterflies_dif(a, &self.twiddles_inv),
            Decimation::Dit => self.butterflies_dit(a, &self.twiddles_inv),
        }
        let shift = if on_coset { self.shift_inv } else { Fr::one() };
        let bitrev_layout = decimation == Decimation::Dif;
        scale_by_powers(a, shift, self.cardinality_inv, bitrev_layout);
    }

    /// Gentleman–Sande butterflies: natural input, bit-reversed output.
    fn butterflies_dif(&self, a: &mut [Fr], twiddles: &[Fr]) {
        let n = a.len();
        let mut m = n / 2;
        let mut stride = 1;
        while m >= 1 {
            for k in (0..n).step_by(2 * m) {
                for j in 0..m {
                    let u = a[k + j];
                    let v = a[k + j + m];
                    a[k + j] = u + v;
                    a[k + j + m] = (u - v) * twiddles[j * stride];
                }
            }
            stride *= 2;
            m /= 2;
        }
    }

    /// Cooley–Tukey butterflies: bit-reversed input, natural output.
    fn butterflies_dit(&self, a: &mut [Fr], twiddles: &[Fr]) {
        let n = a.len();
        let mut m = 1;
        let mut stride = n / 2;
        while m < n {
            for k in (0..n).step_by(2 * m) {
                for j in 0..m {
                    let u = a[k + j];
                    let t = a[k + j + m] * twiddles[j * stride];
                    a[k + j] = u + t;
                    a[k + j + m] = u - t;
                }
            }
            stride /= 2;
            m *= 2;
        }
    }
}

/// Multiply entry with natural index `i` by `extra · baseⁱ`. When the slice
/// is laid out in bit-reversed order, `bitrev_layout` maps the running power
/// to the right position.
fn scale_by_powers(a: &mut [Fr], base: Fr, extra: Fr, bitrev_layout: bool) {
    let n = a.len();
    if n <= 1 {
        if let Some(x) = a.first_mut() {
            *x *= extra;
        }
        return;
    }
    let log_n = n.trailing_zeros();
    let mut pow = extra;
    for i in 0..n {
        let pos = if bitrev_layout {
            i.reverse_bits() >> (usize::BITS - log_n)
        } else {
            i
        };
        a[pos] *= pow;
        pow *= base;
    }
}

/// In-place bit-reversal permutation. The length must be a power of two.
pub fn bit_reverse<T>(a: &mut [T]) {
    let n = a.len();
    if n <= 1 {
        return;
    }
    debug_assert!(n.is_power_of_two(), "length must be a power of two");
    let log_n = n.trailing_zeros();
    for i in 0..n {
        let r = i.reverse_bits() >> (usize::BITS - log_n);
        if i < r {
            a.swap(i, r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::UniformRand;
    use ark_std::Zero;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    /// O(n²) evaluation of `coeffs` on `shift·gⁱ`, natural order.
    fn naive_dft(coeffs: &[Fr], generator: Fr, shift: Fr) -> Vec<Fr> {
        let n = coeffs.len();
        (0..n)
            .map(|i| {
                let x = shift * generator.pow([i as u64]);
                let mut acc = Fr::zero();
                for c in coeffs.iter().rev() {
                    acc = acc * x + c;
                }
                acc
            })
            .collect()
    }

    #[test]
    fn cardinality_rounds_up() {
        let d = Domain::new(5, None).unwrap();
        assert_eq!(d.cardinality, 8);
        let d = Domain::new(8, None).unwrap();
        assert_eq!(d.cardinality, 8);
    }

    #[test]
    fn oversized_domain_rejected() {
        assert!(matches!(
            Domain::new(1 << 29, None),
            Err(Error::UnsupportedSize(_))
        ));
    }

    #[test]
    fn bit_reverse_involution() {
        let mut a: Vec<u32> = (0..16).collect();
        let orig = a.clone();
        bit_reverse(&mut a);
        assert_ne!(a, orig);
        bit_reverse(&mut a);
        assert_eq!(a, orig);
    }

    #[test]
    fn dif_matches_naive_dft() {
        let mut rng = test_rng();
        let domain = Domain::new(8, None).unwrap();
        let coeffs: Vec<Fr> = (0..8).map(|_| Fr::rand(&mut rng)).collect();

        let mut evals = coeffs.clone();
        domain.fft(&mut evals, Decimation::Dif, false);
        bit_reverse(&mut evals);

        assert_eq!(evals, naive_dft(&coeffs, domain.generator, Fr::one()));
    }

    #[test]
    fn coset_dif_matches_naive_dft() {
        let mut rng = test_rng();
        let shift = Fr::get_root_of_unity(32).unwrap();
        let domain = Domain::new(16, Some(shift)).unwrap();
        let coeffs: Vec<Fr> = (0..16).map(|_| Fr::rand(&mut rng)).collect();

        let mut evals = coeffs.clone();
        domain.fft(&mut evals, Decimation::Dif, true);
        bit_reverse(&mut evals);

        assert_eq!(evals, naive_dft(&coeffs, domain.generator, shift));
    }

    #[test]
    fn dif_then_dit_roundtrip() {
        let mut rng = test_rng();
        for on_coset in [false, true] {
            let domain = Domain::new(32, Some(Fr::GENERATOR)).unwrap();
            let coeffs: Vec<Fr> = (0..32).map(|_| Fr::rand(&mut rng)).collect();

            let mut a = coeffs.clone();
            domain.fft(&mut a, Decimation::Dif, on_coset);
            domain.fft_inverse(&mut a, Decimation::Dit, on_coset);
            assert_eq!(a, coeffs);
        }
    }

    #[test]
    fn inverse_dif_then_bitreverse_interpolates() {
        // Interpolation pattern used by the lookup prover: evaluations in,
        // natural-order coefficients out.
        let mut rng = test_rng();
        let domain = Domain::new(16, None).unwrap();
        let coeffs: Vec<Fr> = (0..16).map(|_| Fr::rand(&mut rng)).collect();
        let evals = naive_dft(&coeffs, domain.generator, Fr::one());

        let mut rec = evals;
        domain.fft_inverse(&mut rec, Decimation::Dif, false);
        bit_reverse(&mut rec);
        assert_eq!(rec, coeffs);
    }

    #[test]
    fn negacyclic_product_via_coset() {
        // With shiftᵈ = -1 every evaluation point is a root of Xᵈ + 1, so
        // pointwise products reduce modulo Xᵈ + 1 for free.
        let mut rng = test_rng();
        let d = 8usize;
        let shift = Fr::get_root_of_unity(2 * d as u64).unwrap();
        assert_eq!(shift.pow([d as u64]), -Fr::one());
        let domain = Domain::new(d, Some(shift)).unwrap();

        let p: Vec<Fr> = (0..d).map(|_| Fr::rand(&mut rng)).collect();
        let q: Vec<Fr> = (0..d).map(|_| Fr::rand(&mut rng)).collect();

        // Schoolbook product with wrap-and-negate.
        let mut expected = vec![Fr::zero(); d];
        for i in 0..d {
            for j in 0..d {
                let prod = p[i] * q[j];
                if i + j < d {
                    expected[i + j] += prod;
                } else {
                    expected[i + j - d] -= prod;
                }
            }
        }

        let mut ph = p.clone();
        let mut qh = q.clone();
        domain.fft(&mut ph, Decimation::Dif, true);
        domain.fft(&mut qh, Decimation::Dif, true);
        let mut r: Vec<Fr> = ph.iter().zip(&qh).map(|(a, b)| *a * b).collect();
        domain.fft_inverse(&mut r, Decimation::Dit, true);

        assert_eq!(r, expected);
    }
}
