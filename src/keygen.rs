//! Signer key generation.

use rand_core::{CryptoRng, RngCore};

use crate::group::{self, Fq, Point};
use crate::params::Params;

/// A single signer's keypair. `sk` never leaves the owning signer; only
/// `pk` is broadcast.
#[derive(Clone, Copy, Debug)]
pub struct SignerKeyPair {
    pub sk: Fq,
    pub pk: Point,
}

/// Generates `params.num_signers` independent signer keypairs,
/// `sk_i ← Fq`, `pk_i = g·sk_i`.
pub fn keygen<R: RngCore + CryptoRng>(params: &Params, rng: &mut R) -> Vec<SignerKeyPair> {
    (0..params.num_signers)
        .map(|_| {
            let sk = group::random_scalar(rng);
            let pk = params.g * sk;
            SignerKeyPair { sk, pk }
        })
        .collect()
}

/// Splits a `Vec<SignerKeyPair>` into its parallel `(sks, pks)` sequences,
/// matching the abstract API's `keygen(Params) -> (sks, pks)`.
pub fn split(keys: &[SignerKeyPair]) -> (Vec<Fq>, Vec<Point>) {
    keys.iter().map(|k| (k.sk, k.pk)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn keys_are_consistent() {
        let mut rng = OsRng;
        let params = Params::generate(&mut rng, 5, 2);
        let keys = keygen(&params, &mut rng);
        assert_eq!(keys.len(), 5);
        for k in &keys {
            assert_eq!(k.pk, params.g * k.sk);
        }
    }
}
