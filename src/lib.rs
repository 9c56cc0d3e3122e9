//! # descent
//!
//! Cryptographic core of a zero-knowledge-proof toolkit over BN254, built
//! around two independent primitives:
//!
//! - **Multi-column Plookup** ([`lookup`]): prove that every column-tuple of
//!   a query table appears as a row of a reference table. Rows are committed
//!   with KZG ([`kzg`]), folded into a single column by a Fiat–Shamir
//!   challenge ([`transcript`]), and settled by a single-column Plookup
//!   argument; the verifier folds the commitments homomorphically and never
//!   sees an opening per row.
//! - **Ring-SIS hash** ([`sis`]): a streaming hash absorbing arbitrary bytes
//!   and emitting `Σᵢ a[i]·m[i] mod Xᵈ+1` over the scalar field, where the
//!   message coefficients are bounded bit-chunks of the input. Products run
//!   in evaluation form on a coset whose points are roots of `Xᵈ+1`
//!   ([`fft`]), so the reduction comes for free.
//!
//! Both primitives are pure, synchronous functions of their inputs: no
//! internal concurrency, no I/O, and deterministic proofs byte-for-byte.

pub mod fft;
pub mod kzg;
pub mod lookup;
pub mod sis;
pub mod transcript;
