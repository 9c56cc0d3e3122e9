//! KZG polynomial commitments over BN254
//!
//! A commitment is a single G1 point `[p(τ)]₁`; the group structure makes it
//! additively homomorphic: `commit(p + q) = commit(p) + commit(q)` and
//! `commit(k·p) = k·commit(p)`, which the lookup argument exploits to fold
//! committed columns without extra rounds.
//!
//! Opening at a point `ζ` reveals `p(ζ)` together with a witness commitment
//! to `(p(X) − p(ζ))/(X − ζ)`; the verifier checks
//! `e(C − y·[1]₁, [1]₂) = e(H, [τ]₂ − ζ·[1]₂)`. Several polynomials opened at
//! the same point are folded with a transcript-derived γ into one witness.

use ark_bn254::{Bn254, Fr, G1Affine, G1Projective, G2Affine};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{BigInteger, One, PrimeField, Zero};
use ark_serialize::CanonicalSerialize;
use sha2::Sha256;
use thiserror::Error;

use crate::transcript::Transcript;

/// Commitment to a polynomial: a G1 point.
pub type Digest = G1Affine;

#[derive(Debug, Error)]
pub enum Error {
    #[error("polynomial of degree {degree} exceeds the SRS size {srs}")]
    PolynomialTooLarge { degree: usize, srs: usize },
    #[error("the opening proof does not verify")]
    InvalidOpeningProof,
    #[error("number of digests and claimed values differ")]
    LengthMismatch,
    #[error("point serialization failed")]
    Serialization,
    #[error(transparent)]
    Transcript(#[from] crate::transcript::Error),
}

/// Structured reference string: powers of τ in G1 and `[1]₂, [τ]₂`.
#[derive(Debug, Clone)]
pub struct Srs {
    pub g1: Vec<G1Affine>,
    pub g2: [G2Affine; 2],
}

impl Srs {
    /// Build an SRS of `size` G1 powers from an explicit τ. Knowing τ breaks
    /// binding, so this constructor is for tests and local tooling only.
    pub fn new(size: usize, tau: Fr) -> Self {
        let g1_gen = G1Affine::generator();
        let mut pow = Fr::one();
        let mut powers = Vec::with_capacity(size);
        for _ in 0..size {
            powers.push(g1_gen * pow);
            pow *= tau;
        }
        let g1 = G1Projective::normalize_batch(&powers);
        let g2_gen = G2Affine::generator();
        let tau_g2 = (g2_gen * tau).into_affine();
        Self {
            g1,
            g2: [g2_gen, tau_g2],
        }
    }
}

/// Opening of one polynomial at one point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningProof {
    /// Commitment to the witness quotient `(p(X) − p(ζ))/(X − ζ)`.
    pub h: Digest,
    pub claimed_value: Fr,
}

/// Opening of several polynomials at one shared point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOpeningProof {
    /// Commitment to the witness quotient of the γ-folded polynomial.
    pub h: Digest,
    /// Values `pᵢ(ζ)`, in the order the polynomials were supplied.
    pub claimed_values: Vec<Fr>,
}

/// Commit to a polynomial given by its coefficients, low degree first.
pub fn commit(coeffs: &[Fr], srs: &Srs) -> Result<Digest, Error> {
    if coeffs.len() > srs.g1.len() {
        return Err(Error::PolynomialTooLarge {
            degree: coeffs.len().saturating_sub(1),
            srs: srs.g1.len(),
        });
    }
    let acc = G1Projective::msm_unchecked(&srs.g1[..coeffs.len()], coeffs);
    Ok(acc.into_affine())
}

/// Horner evaluation.
pub(crate) fn eval(coeffs: &[Fr], point: Fr) -> Fr {
    let mut acc = Fr::zero();
    for c in coeffs.iter().rev() {
        acc = acc * point + c;
    }
    acc
}

/// Synthetic division by `X − z`, dropping the remainder: the quotient of
/// `p(X) − p(z)`.
fn divide_by_linear(p: &[Fr], z: Fr) -> Vec<Fr> {
    let n = p.len();
    if n <= 1 {
        return Vec::new();
    }
    let mut q = vec![Fr::zero(); n - 1];
    q[n - 2] = p[n - 1];
    for i in (1..n - 1).rev() {
        q[i - 1] = p[i] + z * q[i];
    }
    q
}

/// Canonical uncompressed encoding of a digest, used for transcript binds.
pub(crate) fn digest_bytes(d: &Digest) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    d.serialize_uncompressed(&mut buf)
        .map_err(|_| Error::Serialization)?;
    Ok(buf)
}

/// Open `p` at `point`.
pub fn open(coeffs: &[Fr], point: Fr, srs: &Srs) -> Result<OpeningProof, Error> {
    let claimed_value = eval(coeffs, point);
    let h = commit(&divide_by_linear(coeffs, point), srs)?;
    Ok(OpeningProof { h, claimed_value })
}

/// Verify an opening of `digest` at `point`.
pub fn verify(digest: &Digest, proof: &OpeningProof, point: Fr, srs: &Srs) -> Result<(), Error> {
    let lhs_g1 = (digest.into_group() - srs.g1[0].into_group() * proof.claimed_value).into_affine();
    let rhs_g2 = (srs.g2[1].into_group() - srs.g2[0].into_group() * point).into_affine();
    if Bn254::pairing(lhs_g1, srs.g2[0]) != Bn254::pairing(proof.h, rhs_g2) {
        return Err(Error::InvalidOpeningProof);
    }
    Ok(())
}

/// Fold challenge for a batch opening: γ binds the point, every digest and
/// every claimed value, so neither side can be swapped after the fact.
fn fold_challenge(digests: &[Digest], point: Fr, claimed_values: &[Fr]) -> Result<Fr, Error> {
    let mut transcript = Transcript::<Sha256>::new(&["gamma"]);
    transcript.bind("gamma", &point.into_bigint().to_bytes_be())?;
    for digest in digests {
        transcript.bind("gamma", &digest_bytes(digest)?)?;
    }
    for value in claimed_values {
        transcript.bind("gamma", &value.into_bigint().to_bytes_be())?;
    }
    let bytes = transcript.compute_challenge("gamma")?;
    Ok(Fr::from_be_bytes_mod_order(&bytes))
}

/// Open every polynomial at the same `point` with a single witness.
pub fn batch_open_single_point(
    polynomials: &[&[Fr]],
    digests: &[Digest],
    point: Fr,
    srs: &Srs,
) -> Result<BatchOpeningProof, Error> {
    if polynomials.len() != digests.len() {
        return Err(Error::LengthMismatch);
    }
    let claimed_values: Vec<Fr> = polynomials.iter().map(|p| eval(p, point)).collect();
    let gamma = fold_challenge(digests, point, &claimed_values)?;

    let max_len = polynomials.iter().map(|p| p.len()).max().unwrap_or(0);
    let mut folded = vec![Fr::zero(); max_len];
    let mut pow = Fr::one();
    for p in polynomials {
        for (acc, c) in folded.iter_mut().zip(p.iter()) {
            *acc += pow * c;
        }
        pow *= gamma;
    }

    let h = commit(&divide_by_linear(&folded, point), srs)?;
    Ok(BatchOpeningProof { h, claimed_values })
}

/// Verify a batch opening at `point` against the digests, in the same order
/// the polynomials were supplied to the prover.
pub fn batch_verify_single_point(
    digests: &[Digest],
    proof: &BatchOpeningProof,
    point: Fr,
    srs: &Srs,
) -> Result<(), Error> {
    if digests.len() != proof.claimed_values.len() {
        return Err(Error::LengthMismatch);
    }
    let gamma = fold_challenge(digests, point, &proof.claimed_values)?;

    let mut folded_digest = G1Projective::zero();
    let mut folded_value = Fr::zero();
    let mut pow = Fr::one();
    for (digest, value) in digests.iter().zip(&proof.claimed_values) {
        folded_digest += *digest * pow;
        folded_value += pow * value;
        pow *= gamma;
    }

    let lhs_g1 = (folded_digest - srs.g1[0].into_group() * folded_value).into_affine();
    let rhs_g2 = (srs.g2[1].into_group() - srs.g2[0].into_group() * point).into_affine();
    if Bn254::pairing(lhs_g1, srs.g2[0]) != Bn254::pairing(proof.h, rhs_g2) {
        return Err(Error::InvalidOpeningProof);
    }
    Ok(())
}
