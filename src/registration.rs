//! `RegistrationEngine`: a single-round, one-user/N-signer commit-and-prove
//! protocol.

use std::sync::Arc;

use dashmap::DashSet;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ProtocolAbort;
use crate::group::{self, Fq, Point};
use crate::params::Params;
use crate::pok::{self, PokDlProof};

/// A signer's `registration` set: the accepted commitments from every
/// successful registration this signer has processed. Grows only on the
/// success path of [`RegistrationStore::accept`] and is never pruned during
/// a protocol run.
///
/// Backed by a [`DashSet`] so the same store can be shared, via `Arc`,
/// across concurrently running sign sessions for the same signer; membership
/// checks only need to be linearizable with respect to successful
/// registrations, which a concurrent set gives for free.
#[derive(Debug, Default)]
pub struct RegistrationStore {
    commitments: DashSet<[u8; 32]>,
}

impl RegistrationStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            commitments: DashSet::new(),
        })
    }

    /// Verifies `π_C` over `C` against the attribute basis and, on success,
    /// inserts `C`. Returns `Err(RegistrationRejected)` and leaves the store
    /// untouched otherwise.
    pub fn accept(&self, params: &Params, c: Point, proof: &PokDlProof) -> Result<(), ProtocolAbort> {
        if !pok::verify(c, params.attribute_basis(), proof)? {
            tracing::warn!("registration rejected: PoK-DL did not verify");
            return Err(ProtocolAbort::RegistrationRejected);
        }
        self.commitments.insert(group::point_to_bytes(&c));
        tracing::debug!("registration accepted");
        Ok(())
    }

    /// `C ∈ registration`.
    pub fn contains(&self, c: &Point) -> bool {
        self.commitments.contains(&group::point_to_bytes(c))
    }
}

/// The user-side output of a successful registration: the commitment `C`
/// and the fresh blinding scalar `L_0` (kept secret by the user until
/// `Show` time).
#[derive(Clone, Copy, Debug)]
pub struct RegistrationOutput {
    pub c: Point,
    pub l0: Fq,
}

/// The `[L_0, L_1, …, L_A]` opening of `C`, zeroized together once `register`
/// returns `L_0` to the caller and no longer needs the rest of the vector.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Opening(Vec<Fq>);

/// User side: picks `L_0 ← Fq`, commits `C = Σ h_i·L_i`, proves `π_C`, and
/// broadcasts `(C, π_C)` to every signer in `registrars`.
///
/// The contract is all-or-nothing: if any signer rejects, the whole session
/// is a failure and the caller should discard `L_0`.
pub fn register<R: RngCore + CryptoRng>(
    params: &Params,
    attrs: &[Fq],
    registrars: &[Arc<RegistrationStore>],
    rng: &mut R,
) -> Result<RegistrationOutput, ProtocolAbort> {
    debug_assert_eq!(attrs.len(), params.num_attrs);

    let l0 = group::random_scalar(rng);
    let mut l_i = Vec::with_capacity(params.num_attrs + 1);
    l_i.push(l0);
    l_i.extend_from_slice(attrs);
    let l_i = Opening(l_i);

    let c = group::multi_commit(&l_i.0, params.attribute_basis());
    let proof = pok::prove(rng, c, &l_i.0, params.attribute_basis())?;

    for signer in registrars {
        signer.accept(params, c, &proof)?;
    }

    Ok(RegistrationOutput { c, l0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn register_is_accepted_by_every_signer() {
        let mut rng = OsRng;
        let params = Params::generate(&mut rng, 3, 2);
        let stores: Vec<_> = (0..3).map(|_| RegistrationStore::new()).collect();
        let attrs: Vec<Fq> = (0..2).map(|_| group::random_scalar(&mut rng)).collect();

        let out = register(&params, &attrs, &stores, &mut rng).unwrap();
        for s in &stores {
            assert!(s.contains(&out.c));
        }
    }

    #[test]
    fn forged_commitment_is_rejected() {
        let mut rng = OsRng;
        let params = Params::generate(&mut rng, 1, 2);
        let store = RegistrationStore::new();
        let attrs: Vec<Fq> = (0..2).map(|_| group::random_scalar(&mut rng)).collect();

        let mut l_i = vec![group::random_scalar(&mut rng)];
        l_i.extend_from_slice(&attrs);
        let c = group::multi_commit(&l_i, params.attribute_basis());

        // Prove knowledge of the wrong opening.
        let wrong: Vec<Fq> = l_i.iter().map(|x| *x + Fq::from(1u64)).collect();
        let bad_proof = pok::prove(&mut rng, c, &wrong, params.attribute_basis()).unwrap();

        assert_eq!(
            store.accept(&params, c, &bad_proof).unwrap_err(),
            ProtocolAbort::RegistrationRejected
        );
        assert!(!store.contains(&c));
    }
}
