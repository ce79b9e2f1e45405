//! PoK-DL: Schnorr proof of knowledge of a discrete-log representation.
//!
//! Statement: the prover knows `x = (x_1, …, x_n)` such that
//! `h = Σ b_i·x_i` for a public basis `b` and point `h`.

use rand_core::{CryptoRng, RngCore};

use crate::error::ProtocolAbort;
use crate::group::{self, Fq, Point};
use crate::transcript::h_p;

/// A non-interactive Schnorr proof `(R, s)` over a multi-base representation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PokDlProof {
    #[serde(with = "crate::group::point_hex")]
    pub r: Point,
    #[serde(with = "crate::group::scalar_vec_hex")]
    pub s: Vec<Fq>,
}

/// `Prove(h, x, b)`: samples `k ← Fq^n`, computes `R = Σ b_i·k_i`,
/// `c = H_p(h, R)`, and `s_i = k_i − c·x_i`.
pub fn prove<R: RngCore + CryptoRng>(
    rng: &mut R,
    h: Point,
    x: &[Fq],
    basis: &[Point],
) -> Result<PokDlProof, ProtocolAbort> {
    if x.len() != basis.len() {
        return Err(ProtocolAbort::ProofShapeMismatch);
    }

    let k: Vec<Fq> = (0..x.len()).map(|_| group::random_scalar(rng)).collect();
    let r_point = group::multi_commit(&k, basis);
    let c = h_p(&[&h, &r_point]);
    let s: Vec<Fq> = k.iter().zip(x).map(|(k_i, x_i)| k_i - c * x_i).collect();

    Ok(PokDlProof { r: r_point, s })
}

/// `Verify(h, basis, (R, s))`: accepts iff `c·h + Σ b_i·s_i = R` where
/// `c = H_p(h, R)`.
pub fn verify(h: Point, basis: &[Point], proof: &PokDlProof) -> Result<bool, ProtocolAbort> {
    if proof.s.len() != basis.len() {
        return Err(ProtocolAbort::ProofShapeMismatch);
    }

    let c = h_p(&[&h, &proof.r]);
    let rhs = h * c + group::multi_commit(&proof.s, basis);
    Ok(rhs == proof.r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{self as g};
    use rand::rngs::OsRng;

    #[test]
    fn round_trip() {
        let mut rng = OsRng;
        let basis: Vec<Point> = (0..4).map(|_| g::independent_generator(&mut rng)).collect();
        let x: Vec<Fq> = (0..4).map(|_| g::random_scalar(&mut rng)).collect();
        let h = g::multi_commit(&x, &basis);

        let proof = prove(&mut rng, h, &x, &basis).unwrap();
        assert!(verify(h, &basis, &proof).unwrap());
    }

    #[test]
    fn shape_mismatch_on_prove() {
        let mut rng = OsRng;
        let basis: Vec<Point> = (0..3).map(|_| g::independent_generator(&mut rng)).collect();
        let x: Vec<Fq> = (0..2).map(|_| g::random_scalar(&mut rng)).collect();
        let h = g::identity();

        assert_eq!(
            prove(&mut rng, h, &x, &basis).unwrap_err(),
            ProtocolAbort::ProofShapeMismatch
        );
    }

    #[test]
    fn tamper_rejected() {
        let mut rng = OsRng;
        let basis: Vec<Point> = (0..3).map(|_| g::independent_generator(&mut rng)).collect();
        let x: Vec<Fq> = (0..3).map(|_| g::random_scalar(&mut rng)).collect();
        let h = g::multi_commit(&x, &basis);

        let mut proof = prove(&mut rng, h, &x, &basis).unwrap();
        proof.s[0] = proof.s[0] + Fq::from(1u64);
        assert!(!verify(h, &basis, &proof).unwrap());
    }
}
