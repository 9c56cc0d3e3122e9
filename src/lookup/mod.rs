//! Plookup arguments over KZG commitments
//!
//! Two layers:
//!
//! - [`vector`]: the single-column argument that every entry of a query
//!   vector `f` appears in a reference vector `t`.
//! - [`table`]: the multi-column reduction: every column-tuple of a query
//!   table appears as a row-tuple of a reference table. Rows are committed
//!   individually, a Fiat–Shamir challenge λ folds them into single vectors,
//!   and the commitment homomorphism lets the verifier fold the digests the
//!   same way, so one vector lookup settles the whole table.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use sha2::Sha256;
use thiserror::Error;

use crate::kzg::{self, Digest};
use crate::transcript::Transcript;

pub mod table;
pub mod vector;

pub use table::{prove_lookup_tables, verify_lookup_tables, ProofLookupTables};
pub use vector::{prove_lookup_vector, verify_lookup_vector, ProofLookupVector};

/// One column-indexed sequence of field elements.
pub type Table = Vec<Fr>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("the tables in f and t are not of the same size")]
    IncompatibleSize,
    #[error("the folded commitment is malformed")]
    FoldedCommitment,
    #[error("the lookup identity does not hold at the evaluation point")]
    InvalidProof,
    #[error(transparent)]
    Transcript(#[from] crate::transcript::Error),
    #[error(transparent)]
    Kzg(#[from] kzg::Error),
    #[error(transparent)]
    Domain(#[from] crate::fft::Error),
}

/// Bind the given commitments (uncompressed encoding, in order) to `label`
/// and reduce the challenge bytes to a field element.
pub(crate) fn derive_randomness(
    transcript: &mut Transcript<Sha256>,
    label: &str,
    points: &[Digest],
) -> Result<Fr, Error> {
    for point in points {
        transcript.bind(label, &kzg::digest_bytes(point)?)?;
    }
    let bytes = transcript.compute_challenge(label)?;
    Ok(Fr::from_be_bytes_mod_order(&bytes))
}
