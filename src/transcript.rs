//! Fiat–Shamir transcript with labeled, ordered challenges
//!
//! A transcript is created with the full list of challenge labels up front.
//! Data is bound to a label with [`Transcript::bind`]; the challenge value is
//! `H(label ‖ previous-challenge ‖ bindings)` and challenges must be derived
//! in registration order. Chaining the previous challenge value makes every
//! derived value depend on the whole history, so prover and verifier agree
//! iff they bound byte-identical data in the same order.
//!
//! The hash is a capability: any [`digest::Digest`] works. Call sites in this
//! crate use SHA-256.

use digest::Digest;
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("challenge {0} is not registered in the transcript")]
    ChallengeNotFound(String),
    #[error("challenge {0} has already been computed")]
    ChallengeAlreadyComputed(String),
    #[error("the previous challenge has not been computed yet")]
    PreviousChallengeNotComputed,
}

struct Slot {
    label: String,
    bindings: Vec<u8>,
    value: Option<Vec<u8>>,
}

/// Deterministic challenge derivation over a hash capability `H`.
pub struct Transcript<H: Digest> {
    slots: Vec<Slot>,
    _hash: PhantomData<H>,
}

impl<H: Digest> Transcript<H> {
    /// Register the ordered challenge labels of the protocol.
    pub fn new(labels: &[&str]) -> Self {
        let slots = labels
            .iter()
            .map(|l| Slot {
                label: (*l).to_string(),
                bindings: Vec::new(),
                value: None,
            })
            .collect();
        Self {
            slots,
            _hash: PhantomData,
        }
    }

    fn position(&self, label: &str) -> Result<usize, Error> {
        self.slots
            .iter()
            .position(|s| s.label == label)
            .ok_or_else(|| Error::ChallengeNotFound(label.to_string()))
    }

    /// Append data to the challenge `label`. Fails once the challenge has
    /// been computed.
    pub fn bind(&mut self, label: &str, data: &[u8]) -> Result<(), Error> {
        let idx = self.position(label)?;
        let slot = &mut self.slots[idx];
        if slot.value.is_some() {
            return Err(Error::ChallengeAlreadyComputed(label.to_string()));
        }
        slot.bindings.extend_from_slice(data);
        Ok(())
    }

    /// Derive the challenge bytes for `label`. A challenge already computed
    /// is returned unchanged; earlier challenges must have been computed.
    pub fn compute_challenge(&mut self, label: &str) -> Result<Vec<u8>, Error> {
        let idx = self.position(label)?;
        if let Some(value) = &self.slots[idx].value {
            return Ok(value.clone());
        }
        let value = {
            let slot = &self.slots[idx];
            let mut hasher = H::new();
            hasher.update(slot.label.as_bytes());
            if idx > 0 {
                match &self.slots[idx - 1].value {
                    Some(prev) => hasher.update(prev),
                    None => return Err(Error::PreviousChallengeNotComputed),
                }
            }
            hasher.update(&slot.bindings);
            hasher.finalize().to_vec()
        };
        self.slots[idx].value = Some(value.clone());
        Ok(value)
    }
}
