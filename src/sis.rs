//! Ring-SIS streaming hash over `Fr[X]/(Xᵈ + 1)`
//!
//! The key is a vector of `key_size` random polynomials `a[i]` of degree `d`,
//! derived from a seed. Input bytes are absorbed into a buffer, unpacked into
//! `log_two_bound`-bit coefficients (so every coefficient of the message
//! vector is bounded by `2^log_two_bound`), grouped into `key_size` message
//! polynomials `m[i]`, and hashed as
//!
//!   H(m) = Σᵢ a[i]·m[i] mod Xᵈ + 1.
//!
//! Binding reduces to the Ring-SIS problem: a collision is a short vector in
//! the kernel of `A`.
//!
//! All products run in evaluation form on the coset `shift·⟨g⟩` where
//! `shift = ω^(2^(28−log₂d−1))` for the fixed `2²⁸`-th root of unity ω, so
//! `shiftᵈ = −1`: the evaluation points are roots of `Xᵈ + 1` and one inverse
//! transform at the end both interpolates and reduces.

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, MontFp, PrimeField, Zero};
use blake2::{Blake2b, Digest};
use digest::consts::U32;
use thiserror::Error;

use crate::fft::{Decimation, Domain, TWO_ADICITY};

type Blake2b256 = Blake2b<U32>;

/// Bytes in the canonical big-endian encoding of an `Fr` element.
pub const FR_BYTES: usize = 32;

/// Fixed `2²⁸`-th root of unity of the BN254 scalar field.
const TWO_ADIC_ROOT_OF_UNITY: Fr =
    MontFp!("19103219067921713944291392827692070036145651957329286315305642004821462161904");

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("log_two_bound must lie in [1, 256]")]
    BoundOutOfRange,
    #[error("key_size must be at least 1")]
    EmptyKey,
    #[error("log_two_bound * degree * key_size must be a multiple of 8")]
    UnalignedChunk,
    #[error("degree 2^{0} exceeds the two-adic subgroup of the scalar field")]
    DegreeTooLarge(usize),
    #[error(transparent)]
    Domain(#[from] crate::fft::Error),
}

/// Ring-SIS hash instance. Not safe for concurrent use: `write` and `sum`
/// mutate the internal buffer. Instances built from the same seed share no
/// state and produce identical digests.
#[derive(Debug, Clone)]
pub struct RSis {
    /// Bytes absorbed and not yet consumed by `sum`.
    buffer: Vec<u8>,
    /// Key polynomials, coefficient form.
    pub a: Vec<Vec<Fr>>,
    /// Key polynomials evaluated on the coset, bit-reversed index order.
    pub a_hat: Vec<Vec<Fr>>,
    /// Per-coefficient bit width of the message vector.
    pub log_two_bound: usize,
    /// Bytes consumed by one `sum`.
    pub nb_bytes_to_sum: usize,
    /// Domain for products in evaluation form.
    pub domain: Domain,
    /// Degree `d` of `Xᵈ + 1`.
    pub degree: usize,
}

/// Key row entry: `Fr` reduction of BLAKE2b-256("SIS" ‖ seed ‖ i ‖ j), all
/// integers big-endian 64-bit.
fn gen_random(seed: i64, i: i64, j: i64) -> Fr {
    let mut hasher = Blake2b256::new();
    hasher.update(b"SIS");
    hasher.update(seed.to_be_bytes());
    hasher.update(i.to_be_bytes());
    hasher.update(j.to_be_bytes());
    Fr::from_be_bytes_mod_order(&hasher.finalize())
}

impl RSis {
    /// Create an instance hashing into `Fr[X]/(Xᵈ + 1)` with `d =
    /// 2^log_two_degree`, message coefficients below `2^log_two_bound`, and
    /// `key_size` key polynomials.
    pub fn new(
        seed: i64,
        log_two_degree: usize,
        log_two_bound: usize,
        key_size: usize,
    ) -> Result<Self, Error> {
        if log_two_bound == 0 || log_two_bound > 8 * FR_BYTES {
            return Err(Error::BoundOutOfRange);
        }
        if key_size == 0 {
            return Err(Error::EmptyKey);
        }
        if log_two_degree + 1 > TWO_ADICITY as usize {
            return Err(Error::DegreeTooLarge(log_two_degree));
        }
        let degree = 1usize << log_two_degree;
        if (log_two_bound * degree * key_size) % 8 != 0 {
            return Err(Error::UnalignedChunk);
        }

        // shiftᵈ = ω^(2²⁷) = −1, so the coset points are roots of Xᵈ + 1.
        let shift = TWO_ADIC_ROOT_OF_UNITY
            .pow([1u64 << (TWO_ADICITY as usize - log_two_degree - 1)]);
        let domain = Domain::new(degree, Some(shift))?;

        let mut a = Vec::with_capacity(key_size);
        let mut a_hat = Vec::with_capacity(key_size);
        for i in 0..key_size {
            let row: Vec<Fr> = (0..degree)
                .map(|j| gen_random(seed, i as i64, j as i64))
                .collect();
            let mut row_hat = row.clone();
            domain.fft(&mut row_hat, Decimation::Dif, true);
            a.push(row);
            a_hat.push(row_hat);
        }

        let nb_bytes_to_sum = log_two_bound * degree * key_size / 8;

        Ok(Self {
            buffer: Vec::new(),
            a,
            a_hat,
            log_two_bound,
            nb_bytes_to_sum,
            domain,
            degree,
        })
    }

    /// Append bytes to the internal buffer.
    pub fn write(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Drop all buffered bytes. Key material and parameters are untouched.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes `sum` appends: one `FR_BYTES` encoding per output
    /// coefficient.
    pub fn size(&self) -> usize {
        self.degree * FR_BYTES
    }

    /// The hash accepts writes of any size; there is no preferred block.
    pub fn block_size(&self) -> usize {
        0
    }

    /// Pointwise product of two polynomials in evaluation form on the coset.
    /// The reduction modulo `Xᵈ + 1` is implicit in the evaluation points;
    /// the inverse transform is deferred until every chunk is accumulated.
    pub fn mul_mod(&self, p: &[Fr], q: &[Fr]) -> Vec<Fr> {
        p.iter().zip(q).map(|(a, b)| *a * b).collect()
    }

    /// Hash the buffered input and append the digest to `prefix`.
    ///
    /// Exactly `nb_bytes_to_sum` bytes are consumed from the front of the
    /// buffer, zero-padding when fewer are available; any excess stays
    /// buffered for a later `sum`. A `sum` therefore never sees bytes a
    /// previous `sum` consumed.
    pub fn sum(&mut self, prefix: &[u8]) -> Vec<u8> {
        if self.buffer.len() < self.nb_bytes_to_sum {
            self.buffer.resize(self.nb_bytes_to_sum, 0);
        }
        let consumed: Vec<u8> = self.buffer.drain(..self.nb_bytes_to_sum).collect();

        // Re-pack the bit stream (MSB-first per byte) into coefficients of
        // log_two_bound bits each: the top `offset` bits land in the first
        // byte of a big-endian window, the rest fill whole bytes.
        let bound = self.log_two_bound;
        let offset = bound % 8;
        let whole_bytes = (bound - offset) / 8;
        let bit_at = |idx: usize| (consumed[idx / 8] >> (7 - idx % 8)) & 1;

        let size_m = self.degree * self.a.len();
        let mut m = vec![Fr::zero(); size_m];
        let mut window = vec![0u8; whole_bytes + 1];
        for (k, coeff) in m.iter_mut().enumerate() {
            for j in 0..offset {
                window[0] |= bit_at(k * bound + j) << (offset - 1 - j);
            }
            for j in 0..whole_bytes {
                for l in 0..8 {
                    window[j + 1] |= bit_at(k * bound + offset + 8 * j + l) << (7 - l);
                }
            }
            *coeff = Fr::from_be_bytes_mod_order(&window);
            window.iter_mut().for_each(|b| *b = 0);
        }

        // Accumulate Σ a[i]·m[i] in evaluation form, then interpolate once.
        let mut res = vec![Fr::zero(); self.degree];
        for (i, row_hat) in self.a_hat.iter().enumerate() {
            let chunk = &mut m[i * self.degree..(i + 1) * self.degree];
            self.domain.fft(chunk, Decimation::Dif, true);
            let product = self.mul_mod(row_hat, chunk);
            for (acc, p) in res.iter_mut().zip(&product) {
                *acc += p;
            }
        }
        self.domain.fft_inverse(&mut res, Decimation::Dit, true);

        let mut out = Vec::with_capacity(prefix.len() + self.size());
        out.extend_from_slice(prefix);
        for coeff in &res {
            out.extend_from_slice(&coeff.into_bigint().to_bytes_be());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::One;

    /// Decode a digest produced by `sum` back into field coefficients.
    fn decode(digest: &[u8]) -> Vec<Fr> {
        digest
            .chunks(FR_BYTES)
            .map(Fr::from_be_bytes_mod_order)
            .collect()
    }

    /// Schoolbook product in `Fr[X]/(Xᵈ + 1)`.
    fn negacyclic_mul(p: &[Fr], q: &[Fr]) -> Vec<Fr> {
        let d = p.len();
        let mut out = vec![Fr::zero(); d];
        for i in 0..d {
            for j in 0..d {
                let prod = p[i] * q[j];
                if i + j < d {
                    out[i + j] += prod;
                } else {
                    out[i + j - d] -= prod;
                }
            }
        }
        out
    }

    #[test]
    fn reference_hash() {
        // Known-answer test: seed 5, d = 2, 4-bit coefficients, 8 key rows,
        // absorbing a fixed 8-byte stream.
        let mut sis = RSis::new(5, 1, 4, 8).unwrap();
        sis.write(&[0xa1, 0x90, 0xff, 0x0a, 0x13, 0x59, 0x79, 0xcc]);
        let digest = sis.sum(&[]);
        let res = decode(&digest);

        const EXPECTED_0: Fr =
            MontFp!("13271020168286836418355708644485735593608516629558571827355518635690915176270");
        const EXPECTED_1: Fr =
            MontFp!("9885652947755511462638910175213772082420069489359143817296501612386750845004");
        assert_eq!(res, vec![EXPECTED_0, EXPECTED_1]);
    }

    #[test]
    fn reference_mul_mod() {
        let sis = RSis::new(5, 2, 3, 8).unwrap();

        let mut p: Vec<Fr> = [2389u64, 987192, 623, 91].map(Fr::from).to_vec();
        let mut q: Vec<Fr> = [76755u64, 232893720, 989273, 675273].map(Fr::from).to_vec();

        sis.domain.fft(&mut p, Decimation::Dif, true);
        sis.domain.fft(&mut q, Decimation::Dif, true);
        let mut r = sis.mul_mod(&p, &q);
        sis.domain.fft_inverse(&mut r, Decimation::Dit, true);

        // r[0] is −688250381320 modulo the field order.
        const EXPECTED_0: Fr =
            MontFp!("21888242871839275222246405745257275088548364400416034343698204185887558114297");
        let expected = vec![
            EXPECTED_0,
            Fr::from(631644300118u64),
            Fr::from(229913166975959u64),
            Fr::from(1123315390878u64),
        ];
        assert_eq!(r, expected);
    }

    #[test]
    fn matches_schoolbook_with_byte_coefficients() {
        // log_two_bound = 8: offset is 0 and every input byte is one
        // coefficient, so the expected hash is easy to build directly.
        let mut sis = RSis::new(11, 1, 8, 2).unwrap();
        assert_eq!(sis.nb_bytes_to_sum, 4);
        let input = [3u8, 250, 7, 121];
        sis.write(&input);
        let res = decode(&sis.sum(&[]));

        let m0 = vec![Fr::from(3u64), Fr::from(250u64)];
        let m1 = vec![Fr::from(7u64), Fr::from(121u64)];
        let mut expected = negacyclic_mul(&sis.a[0], &m0);
        for (acc, x) in expected.iter_mut().zip(negacyclic_mul(&sis.a[1], &m1)) {
            *acc += x;
        }
        assert_eq!(res, expected);
    }

    #[test]
    fn linearity() {
        // With 8-bit coefficients, pick u, v and a small scalar α so that
        // α·u + v stays below the bound; then H(α·u + v) = α·H(u) + H(v).
        let params = (17i64, 2usize, 8usize, 2usize);
        let u = [11u8, 3, 40, 5, 9, 1, 22, 7];
        let v = [4u8, 30, 2, 55, 12, 61, 3, 18];
        let alpha = 3u64;
        let combined: Vec<u8> = u
            .iter()
            .zip(&v)
            .map(|(a, b)| (alpha as u8) * a + b)
            .collect();

        let mut sis = RSis::new(params.0, params.1, params.2, params.3).unwrap();
        sis.write(&u);
        let hu = decode(&sis.sum(&[]));
        sis.reset();
        sis.write(&v);
        let hv = decode(&sis.sum(&[]));
        sis.reset();
        sis.write(&combined);
        let hc = decode(&sis.sum(&[]));

        let alpha = Fr::from(alpha);
        for i in 0..hc.len() {
            assert_eq!(hc[i], alpha * hu[i] + hv[i]);
        }
    }

    #[test]
    fn digest_independent_of_write_chunking() {
        let data = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x02, 0x03, 0x04];

        let mut one_shot = RSis::new(5, 1, 4, 8).unwrap();
        one_shot.write(&data);
        let d1 = one_shot.sum(&[]);

        let mut chunked = RSis::new(5, 1, 4, 8).unwrap();
        chunked.write(&data[..3]);
        chunked.write(&data[3..5]);
        chunked.write(&data[5..]);
        let d2 = chunked.sum(&[]);

        assert_eq!(d1, d2);
    }

    #[test]
    fn reset_then_reabsorb_is_stable() {
        let data = [7u8, 7, 7, 7, 1, 2, 3, 4];
        let mut sis = RSis::new(5, 1, 4, 8).unwrap();
        sis.write(&data);
        let d1 = sis.sum(&[]);
        sis.reset();
        sis.write(&data);
        let d2 = sis.sum(&[]);
        assert_eq!(d1, d2);
    }

    #[test]
    fn sum_drains_consumed_bytes() {
        let mut sis = RSis::new(5, 1, 4, 8).unwrap();
        sis.write(&[0xa1, 0x90, 0xff, 0x0a, 0x13, 0x59, 0x79, 0xcc]);
        let first = sis.sum(&[]);

        // The buffer was drained, so a second sum hashes the zero message.
        let second = sis.sum(&[]);
        let mut empty = RSis::new(5, 1, 4, 8).unwrap();
        assert_eq!(second, empty.sum(&[]));
        assert_ne!(first, second);
    }

    #[test]
    fn oversize_input_waits_for_the_next_sum() {
        let block = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
        let tail = [0x99u8, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x00];

        let mut sis = RSis::new(5, 1, 4, 8).unwrap();
        sis.write(&block);
        sis.write(&tail);
        let first = sis.sum(&[]);
        let second = sis.sum(&[]);

        let mut reference = RSis::new(5, 1, 4, 8).unwrap();
        reference.write(&block);
        assert_eq!(first, reference.sum(&[]));
        reference.reset();
        reference.write(&tail);
        assert_eq!(second, reference.sum(&[]));
    }

    #[test]
    fn short_input_is_zero_padded() {
        let mut padded = RSis::new(5, 1, 4, 8).unwrap();
        padded.write(&[0xa1, 0x90]);
        let d1 = padded.sum(&[]);

        let mut explicit = RSis::new(5, 1, 4, 8).unwrap();
        explicit.write(&[0xa1, 0x90, 0, 0, 0, 0, 0, 0]);
        let d2 = explicit.sum(&[]);
        assert_eq!(d1, d2);
    }

    #[test]
    fn size_contract() {
        let mut sis = RSis::new(5, 3, 4, 4).unwrap();
        let prefix = [1u8, 2, 3];
        let out = sis.sum(&prefix);
        assert_eq!(out.len() - prefix.len(), sis.size());
        assert_eq!(&out[..3], &prefix);
        assert_eq!(sis.block_size(), 0);
    }

    #[test]
    fn key_shape_invariants() {
        let sis = RSis::new(42, 3, 4, 5).unwrap();
        assert_eq!(sis.a.len(), 5);
        assert_eq!(sis.a_hat.len(), 5);
        for (row, row_hat) in sis.a.iter().zip(&sis.a_hat) {
            assert_eq!(row.len(), 8);
            assert_eq!(row_hat.len(), 8);
        }
        // The coset shift squares down to −1 at the ring degree.
        assert_eq!(sis.domain.shift.pow([sis.degree as u64]), -Fr::one());
    }

    #[test]
    fn same_seed_same_key() {
        let a = RSis::new(9, 2, 4, 3).unwrap();
        let b = RSis::new(9, 2, 4, 3).unwrap();
        assert_eq!(a.a, b.a);
        let c = RSis::new(10, 2, 4, 3).unwrap();
        assert_ne!(a.a, c.a);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(matches!(RSis::new(5, 1, 0, 8), Err(Error::BoundOutOfRange)));
        assert!(matches!(
            RSis::new(5, 1, 257, 8),
            Err(Error::BoundOutOfRange)
        ));
        assert!(matches!(RSis::new(5, 1, 4, 0), Err(Error::EmptyKey)));
        // 3 bits · 2 coefficients · 1 polynomial = 6 bits: not a whole byte.
        assert!(matches!(RSis::new(5, 1, 3, 1), Err(Error::UnalignedChunk)));
        assert!(matches!(
            RSis::new(5, 28, 4, 2),
            Err(Error::DegreeTooLarge(28))
        ));
    }
}
