//! Multi-column lookup: reduce a table membership claim to one vector lookup
//!
//! To prove that every column of `f` (read across its rows) is one of the
//! columns of `t`, each row is padded to a power-of-two width, interpolated
//! and committed. A challenge λ, derived from the row commitments, folds the
//! rows into single vectors `Σ λⁱ·f[i]` and `Σ λⁱ·t[i]`; a column match in
//! the folded vectors implies a column match in the original tables except
//! with probability (nbRows−1)/|Fr| over λ. The verifier rebuilds λ, folds
//! the digests with the same Horner walk and checks the result against the
//! inner proof's query commitment, then verifies the inner vector lookup.

use ark_bn254::Fr;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::Zero;
use sha2::Sha256;

use super::{derive_randomness, vector, Error, ProofLookupVector, Table};
use crate::fft::{bit_reverse, Decimation, Domain};
use crate::kzg::{self, Digest, Srs};
use crate::transcript::Transcript;

/// Proof that every column-tuple of a query table is a row of a reference
/// table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofLookupTables {
    /// Commitments to the query rows, in row order.
    pub(crate) fs: Vec<Digest>,
    /// Vector-lookup proof for the λ-folded columns.
    pub(crate) folded_proof: ProofLookupVector,
}

/// Common length of the rows of `table`, or an error when the rows disagree
/// or the table is degenerate.
fn uniform_row_length(table: &[Table]) -> Result<usize, Error> {
    let first = table.first().ok_or(Error::IncompatibleSize)?;
    if first.is_empty() || table.iter().any(|row| row.len() != first.len()) {
        return Err(Error::IncompatibleSize);
    }
    Ok(first.len())
}

/// Prove that for every column index `j`, the tuple `(f[0][j], …,
/// f[nbRows−1][j])` equals `(t[0][k], …, t[nbRows−1][k])` for some `k`.
pub fn prove_lookup_tables(
    srs: &Srs,
    f: &[Table],
    t: &[Table],
) -> Result<ProofLookupTables, Error> {
    let mut transcript = Transcript::<Sha256>::new(&["lambda"]);

    if f.len() != t.len() {
        return Err(Error::IncompatibleSize);
    }
    let s_f = uniform_row_length(f)?;
    let s_t = uniform_row_length(t)?;
    let nb_rows = f.len();

    // The +1 keeps one slack column so the inner protocol, invoked on
    // nb_cols−1 query entries, settles on a domain of exactly nb_cols.
    let domain = Domain::new((s_f + 1).max(s_t), None)?;
    let nb_cols = domain.cardinality;

    let mut fs = Vec::with_capacity(nb_rows);
    let mut lfs = Vec::with_capacity(nb_rows);
    let mut lts = Vec::with_capacity(nb_rows);
    for i in 0..nb_rows {
        let mut lf = f[i].clone();
        lf.resize(nb_cols, f[i][s_f - 1]);

        let mut cf = lf.clone();
        domain.fft_inverse(&mut cf, Decimation::Dif, false);
        bit_reverse(&mut cf);
        fs.push(kzg::commit(&cf, srs)?);
        lfs.push(lf);

        let mut lt = t[i].clone();
        lt.resize(nb_cols, t[i][s_t - 1]);
        lts.push(lt);
    }

    let lambda = derive_randomness(&mut transcript, "lambda", &fs)?;

    // Horner fold from the highest-indexed row: Σ λⁱ·row[i].
    let mut folded_f = vec![Fr::zero(); nb_cols];
    let mut folded_t = vec![Fr::zero(); nb_cols];
    for j in 0..nb_cols {
        for i in (0..nb_rows).rev() {
            folded_f[j] = folded_f[j] * lambda + lfs[i][j];
            folded_t[j] = folded_t[j] * lambda + lts[i][j];
        }
    }

    let folded_proof = vector::prove_lookup_vector(srs, &folded_f[..nb_cols - 1], &folded_t)?;

    Ok(ProofLookupTables { fs, folded_proof })
}

/// Verify a [`ProofLookupTables`].
pub fn verify_lookup_tables(srs: &Srs, proof: &ProofLookupTables) -> Result<(), Error> {
    let mut transcript = Transcript::<Sha256>::new(&["lambda"]);

    let nb_rows = proof.fs.len();
    if nb_rows == 0 {
        return Err(Error::IncompatibleSize);
    }
    let lambda = derive_randomness(&mut transcript, "lambda", &proof.fs)?;

    // Fold the digests with the same Horner walk, in the group.
    let mut folded = proof.fs[nb_rows - 1].into_group();
    for i in (0..nb_rows - 1).rev() {
        folded = folded * lambda + proof.fs[i];
    }
    if folded.into_affine() != proof.folded_proof.f {
        return Err(Error::FoldedCommitment);
    }

    vector::verify_lookup_vector(srs, &proof.folded_proof)
}
