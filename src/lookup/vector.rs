//! Single-column lookup: every entry of `f` appears in `t`
//!
//! Classic Plookup over a domain H = ⟨g⟩ of cardinality n, with the query
//! padded to n−1 entries and the table to n. The prover sorts the
//! concatenation of query and table into `s` and splits it into overlapping
//! halves h1, h2. With challenges β, γ, the grand product
//!
//!   z₀ = 1,
//!   zᵢ₊₁ = zᵢ · (1+β)(γ+fᵢ)(γ(1+β)+tᵢ+βtᵢ₊₁)
//!              / ((γ(1+β)+h1ᵢ+βh1ᵢ₊₁)(γ(1+β)+h2ᵢ+βh2ᵢ₊₁))
//!
//! telescopes back to 1 exactly when the multiset of f-entries joined with
//! the t-adjacency pairs equals the s-adjacency pairs, which holds iff every
//! f-entry occurs in t. The constraints
//!
//!   (x−gⁿ⁻¹)·[z(x)(1+β)(γ+f(x))(γ(1+β)+t(x)+βt(gx))
//!            − z(gx)(γ(1+β)+h1(x)+βh1(gx))(γ(1+β)+h2(x)+βh2(gx))],
//!   L₀(x)(z(x)−1),  Lₙ₋₁(x)(z(x)−1),  Lₙ₋₁(x)(h1(x)−h2(gx))
//!
//! are combined with powers of α, divided by Xⁿ−1 on a multiplicative coset,
//! and settled by batched KZG openings at a random ζ and at gζ.
//!
//! The prover never checks membership: a query entry outside the table makes
//! the coset division inexact and the resulting proof fails verification,
//! which is the behavior the callers rely on.

use ark_bn254::Fr;
use ark_ff::{batch_inversion, FftField, Field, One, PrimeField, Zero};
use itertools::Itertools;
use sha2::Sha256;

use super::{derive_randomness, Error};
use crate::fft::{bit_reverse, Decimation, Domain};
use crate::kzg::{self, BatchOpeningProof, Digest, Srs};
use crate::transcript::Transcript;

/// Expansion factor of the coset domain the quotient is computed on. The
/// combined constraint has degree at most 3n−2, so 4n points suffice.
const QUOTIENT_BLOWUP: usize = 4;

/// Proof that every entry of a query vector lies in a reference vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofLookupVector {
    /// Domain cardinality the proof was built on.
    pub(crate) size: u64,
    /// Commitment to the padded query polynomial.
    pub(crate) f: Digest,
    /// Commitment to the sorted, padded table polynomial.
    pub(crate) t: Digest,
    h1: Digest,
    h2: Digest,
    z: Digest,
    quotient: Digest,
    /// Openings of (f, t, h1, h2, z, quotient) at ζ.
    batch_at_zeta: BatchOpeningProof,
    /// Openings of (t, h1, h2, z) at gζ.
    batch_at_shifted_zeta: BatchOpeningProof,
}

fn canonical_cmp(a: &Fr, b: &Fr) -> std::cmp::Ordering {
    a.into_bigint().cmp(&b.into_bigint())
}

/// Evaluations over H (natural order) to natural-order coefficients.
fn interpolate(domain: &Domain, evals: &[Fr]) -> Vec<Fr> {
    let mut coeffs = evals.to_vec();
    domain.fft_inverse(&mut coeffs, Decimation::Dif, false);
    bit_reverse(&mut coeffs);
    coeffs
}

/// Coefficients to natural-order evaluations on the blown-up coset.
fn coset_evaluations(big: &Domain, coeffs: &[Fr]) -> Vec<Fr> {
    let mut evals = coeffs.to_vec();
    evals.resize(big.cardinality, Fr::zero());
    big.fft(&mut evals, Decimation::Dif, true);
    bit_reverse(&mut evals);
    evals
}

/// Prove that every entry of `f` appears in `t`. The working domain has
/// cardinality `n = next_pow2(max(len(f)+1, len(t)))`; `f` is padded to n−1
/// and `t` to n by repeating their last entries, so `proof.f` commits the
/// repeat-last padding of `f` to length n.
pub fn prove_lookup_vector(srs: &Srs, f: &[Fr], t: &[Fr]) -> Result<ProofLookupVector, Error> {
    let (last_f, last_t) = match (f.last(), t.last()) {
        (Some(lf), Some(lt)) => (*lf, *lt),
        _ => return Err(Error::IncompatibleSize),
    };
    let domain = Domain::new((f.len() + 1).max(t.len()), None)?;
    let n = domain.cardinality;

    // Padded query (n−1 entries) and its committed form (n evaluations).
    let mut query = f.to_vec();
    query.resize(n - 1, last_f);
    let mut lf = query.clone();
    lf.push(query[n - 2]);

    // Table sorted by canonical integer representative, padded to n.
    let mut lt = t.to_vec();
    lt.resize(n, last_t);
    lt.sort_by(canonical_cmp);

    // Sorted concatenation and its overlapping halves.
    let s: Vec<Fr> = query
        .iter()
        .chain(lt.iter())
        .copied()
        .sorted_by(canonical_cmp)
        .collect();
    let h1 = s[..n].to_vec();
    let h2 = s[n - 1..].to_vec();

    let cf = interpolate(&domain, &lf);
    let ct = interpolate(&domain, &lt);
    let ch1 = interpolate(&domain, &h1);
    let ch2 = interpolate(&domain, &h2);

    let f_digest = kzg::commit(&cf, srs)?;
    let t_digest = kzg::commit(&ct, srs)?;
    let h1_digest = kzg::commit(&ch1, srs)?;
    let h2_digest = kzg::commit(&ch2, srs)?;

    let mut transcript = Transcript::<Sha256>::new(&["beta", "gamma", "alpha", "zeta"]);
    let beta = derive_randomness(
        &mut transcript,
        "beta",
        &[f_digest, t_digest, h1_digest, h2_digest],
    )?;
    let gamma = derive_randomness(&mut transcript, "gamma", &[])?;

    // Grand product over H.
    let one_plus_beta = Fr::one() + beta;
    let gamma_beta = gamma * one_plus_beta;
    let mut denominators: Vec<Fr> = (0..n - 1)
        .map(|i| {
            (gamma_beta + h1[i] + beta * h1[i + 1]) * (gamma_beta + h2[i] + beta * h2[i + 1])
        })
        .collect();
    batch_inversion(&mut denominators);
    let mut z = vec![Fr::one(); n];
    for i in 0..n - 1 {
        let numerator =
            one_plus_beta * (gamma + query[i]) * (gamma_beta + lt[i] + beta * lt[i + 1]);
        z[i + 1] = z[i] * numerator * denominators[i];
    }
    let cz = interpolate(&domain, &z);
    let z_digest = kzg::commit(&cz, srs)?;

    let alpha = derive_randomness(&mut transcript, "alpha", &[z_digest])?;

    // Quotient of the α-combined constraints by Xⁿ−1, computed on a coset
    // where the vanishing polynomial has no roots.
    let big = Domain::new(QUOTIENT_BLOWUP * n, Some(Fr::GENERATOR))?;
    let m = big.cardinality;
    let ratio = m / n;

    let ef = coset_evaluations(&big, &cf);
    let et = coset_evaluations(&big, &ct);
    let eh1 = coset_evaluations(&big, &ch1);
    let eh2 = coset_evaluations(&big, &ch2);
    let ez = coset_evaluations(&big, &cz);

    let g_last = domain.generator_inv; // gⁿ⁻¹
    let mut x_values = Vec::with_capacity(m);
    let mut zh_values = Vec::with_capacity(m);
    let mut inv_x_minus_one = Vec::with_capacity(m);
    let mut inv_x_minus_g_last = Vec::with_capacity(m);
    let mut x = big.shift;
    let mut x_pow_n = big.shift.pow([n as u64]);
    let step_pow_n = big.generator.pow([n as u64]);
    for _ in 0..m {
        x_values.push(x);
        zh_values.push(x_pow_n - Fr::one());
        inv_x_minus_one.push(x - Fr::one());
        inv_x_minus_g_last.push(x - g_last);
        x *= big.generator;
        x_pow_n *= step_pow_n;
    }
    let mut zh_inv = zh_values.clone();
    batch_inversion(&mut zh_inv);
    batch_inversion(&mut inv_x_minus_one);
    batch_inversion(&mut inv_x_minus_g_last);

    let alpha2 = alpha.square();
    let alpha3 = alpha2 * alpha;
    let mut q_evals = Vec::with_capacity(m);
    for j in 0..m {
        let shifted = (j + ratio) % m;
        let l_first = zh_values[j] * domain.cardinality_inv * inv_x_minus_one[j];
        let l_last = g_last * zh_values[j] * domain.cardinality_inv * inv_x_minus_g_last[j];

        let row = ez[j] * one_plus_beta * (gamma + ef[j])
            * (gamma_beta + et[j] + beta * et[shifted])
            - ez[shifted]
                * (gamma_beta + eh1[j] + beta * eh1[shifted])
                * (gamma_beta + eh2[j] + beta * eh2[shifted]);
        let numerator = (x_values[j] - g_last) * row
            + alpha * l_first * (ez[j] - Fr::one())
            + alpha2 * l_last * (ez[j] - Fr::one())
            + alpha3 * l_last * (eh1[j] - eh2[shifted]);
        q_evals.push(numerator * zh_inv[j]);
    }

    let mut cq = q_evals;
    big.fft_inverse(&mut cq, Decimation::Dif, true);
    bit_reverse(&mut cq);
    cq.truncate(2 * n - 1);
    let q_digest = kzg::commit(&cq, srs)?;

    let zeta = derive_randomness(&mut transcript, "zeta", &[q_digest])?;

    let batch_at_zeta = kzg::batch_open_single_point(
        &[&cf, &ct, &ch1, &ch2, &cz, &cq],
        &[f_digest, t_digest, h1_digest, h2_digest, z_digest, q_digest],
        zeta,
        srs,
    )?;
    let batch_at_shifted_zeta = kzg::batch_open_single_point(
        &[&ct, &ch1, &ch2, &cz],
        &[t_digest, h1_digest, h2_digest, z_digest],
        zeta * domain.generator,
        srs,
    )?;

    Ok(ProofLookupVector {
        size: n as u64,
        f: f_digest,
        t: t_digest,
        h1: h1_digest,
        h2: h2_digest,
        z: z_digest,
        quotient: q_digest,
        batch_at_zeta,
        batch_at_shifted_zeta,
    })
}

/// Verify a [`ProofLookupVector`].
pub fn verify_lookup_vector(srs: &Srs, proof: &ProofLookupVector) -> Result<(), Error> {
    let domain = Domain::new(proof.size as usize, None)?;
    let n = domain.cardinality;
    if n as u64 != proof.size {
        return Err(Error::InvalidProof);
    }

    let mut transcript = Transcript::<Sha256>::new(&["beta", "gamma", "alpha", "zeta"]);
    let beta = derive_randomness(
        &mut transcript,
        "beta",
        &[proof.f, proof.t, proof.h1, proof.h2],
    )?;
    let gamma = derive_randomness(&mut transcript, "gamma", &[])?;
    let alpha = derive_randomness(&mut transcript, "alpha", &[proof.z])?;
    let zeta = derive_randomness(&mut transcript, "zeta", &[proof.quotient])?;

    let &[f_z, t_z, h1_z, h2_z, z_z, q_z] = proof.batch_at_zeta.claimed_values.as_slice() else {
        return Err(Error::InvalidProof);
    };
    let &[t_gz, h1_gz, h2_gz, z_gz] = proof.batch_at_shifted_zeta.claimed_values.as_slice()
    else {
        return Err(Error::InvalidProof);
    };

    // Evaluate the α-combined constraints at ζ and compare with q(ζ)·(ζⁿ−1).
    let zh_z = zeta.pow([n as u64]) - Fr::one();
    let g_last = domain.generator_inv;
    let inv_first = (zeta - Fr::one()).inverse().ok_or(Error::InvalidProof)?;
    let inv_last = (zeta - g_last).inverse().ok_or(Error::InvalidProof)?;
    let l_first = zh_z * domain.cardinality_inv * inv_first;
    let l_last = g_last * zh_z * domain.cardinality_inv * inv_last;

    let one_plus_beta = Fr::one() + beta;
    let gamma_beta = gamma * one_plus_beta;
    let alpha2 = alpha.square();
    let alpha3 = alpha2 * alpha;

    let row = z_z * one_plus_beta * (gamma + f_z) * (gamma_beta + t_z + beta * t_gz)
        - z_gz * (gamma_beta + h1_z + beta * h1_gz) * (gamma_beta + h2_z + beta * h2_gz);
    let combined = (zeta - g_last) * row
        + alpha * l_first * (z_z - Fr::one())
        + alpha2 * l_last * (z_z - Fr::one())
        + alpha3 * l_last * (h1_z - h2_gz);
    if combined != q_z * zh_z {
        return Err(Error::InvalidProof);
    }

    kzg::batch_verify_single_point(
        &[proof.f, proof.t, proof.h1, proof.h2, proof.z, proof.quotient],
        &proof.batch_at_zeta,
        zeta,
        srs,
    )?;
    kzg::batch_verify_single_point(
        &[proof.t, proof.h1, proof.h2, proof.z],
        &proof.batch_at_shifted_zeta,
        zeta * domain.generator,
        srs,
    )?;
    Ok(())
}
