//! `ShowProver` / `ShowVerifier`: a non-interactive zero-knowledge proof
//! binding a joint signature `σ` to a chosen opening `L` of the registered
//! commitment, without revealing `σ` or the commitment's discrete log.

use rand_core::{CryptoRng, RngCore};

use crate::group::{self, Fq, Point};
use crate::params::Params;
use crate::sign::{ShowSecret, Signature};
use crate::transcript::h_miacl;

/// `(π_op, π_sdl)`, flattened into one struct since both halves share the
/// same Fiat-Shamir challenge `c`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ShowProof {
    /// `R` from `π_op`.
    #[serde(with = "crate::group::point_hex")]
    pub r: Point,
    /// `[s_0, …, s_A, s_Γ]` from `π_op`, length `A + 2`.
    #[serde(with = "crate::group::scalar_vec_hex")]
    pub s: Vec<Fq>,
    /// `Γ` from `π_sdl`.
    #[serde(with = "crate::group::point_hex")]
    pub gamma_point: Point,
    /// `Ψ_0, …, Ψ_A` from `π_sdl`.
    pub psi: Vec<PointHex>,
    /// `g_sdl` from `π_sdl`.
    #[serde(with = "crate::group::point_hex")]
    pub g_sdl: Point,
    /// `t_sdl` from `π_sdl`.
    #[serde(with = "crate::group::point_hex")]
    pub t_sdl: Point,
    /// `h_sdl_0, …, h_sdl_A` from `π_sdl`.
    pub h_sdl: Vec<PointHex>,
    /// `s_sdl` from `π_sdl`.
    #[serde(with = "crate::group::scalar_hex")]
    pub s_sdl: Fq,
}

/// A single hex-encoded point, used where `serde(with = ...)` cannot apply
/// directly to a bare `Vec<Point>` field.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PointHex(#[serde(with = "crate::group::point_hex")] pub Point);

impl From<Point> for PointHex {
    fn from(p: Point) -> Self {
        Self(p)
    }
}

fn points(v: &[PointHex]) -> Vec<Point> {
    v.iter().map(|p| p.0).collect()
}

fn as_points(v: &[Point]) -> Vec<PointHex> {
    v.iter().copied().map(PointHex::from).collect()
}

/// User side: re-blinds the registered opening `l` under a fresh `Γ = g·γ`
/// and proves both the opening and the signature-derived discrete log `ζ1`
/// without revealing either. `l` is the `A`-length attribute opening the
/// user chooses to disclose (may differ from the attributes originally
/// registered, as long as it is a valid opening of the same commitment);
/// `show_secret` must be the `(L_0, rnd, γ)` produced by the matching
/// `sign` call.
pub fn show<R: RngCore + CryptoRng>(
    params: &Params,
    pks: &[Point],
    m: Fq,
    sigma: &Signature,
    l: &[Fq],
    show_secret: &ShowSecret,
    rng: &mut R,
) -> ShowProof {
    debug_assert_eq!(l.len(), params.num_attrs);

    let mut l_full = Vec::with_capacity(params.num_attrs + 1);
    l_full.push(show_secret.l0);
    l_full.extend_from_slice(l);

    let gamma_point = params.g * show_secret.γ;
    let psi: Vec<Point> = params.h_i.iter().map(|h_i| *h_i * show_secret.γ).collect();

    let r_sdl = group::random_scalar(rng);
    let h_sdl: Vec<Point> = params.h_i.iter().map(|h_i| *h_i * r_sdl).collect();
    let g_sdl = params.g * r_sdl;
    let t_sdl = params.t * r_sdl;

    let r_i: Vec<Fq> = (0..=params.num_attrs).map(|_| group::random_scalar(rng)).collect();
    let r_g = group::random_scalar(rng);

    let r_point = gamma_point * r_g
        + group::sum_points(psi.iter().zip(&r_i).map(|(psi_i, r_i)| *psi_i * *r_i));

    let c = h_miacl(&[
        pks,
        &m,
        sigma,
        &l_full,
        &show_secret.l0,
        &gamma_point,
        &psi,
        &h_sdl,
        &g_sdl,
        &t_sdl,
        &r_point,
    ]);

    let s_sdl = r_sdl - c * show_secret.γ;
    let mut s: Vec<Fq> = r_i.iter().zip(&l_full).map(|(r_i, l_i)| *r_i - c * *l_i).collect();
    s.push(r_g - show_secret.rnd * c);

    ShowProof {
        r: r_point,
        s,
        gamma_point,
        psi: as_points(&psi),
        g_sdl,
        t_sdl,
        h_sdl: as_points(&h_sdl),
        s_sdl,
    }
}

/// Verifier side: re-runs `Verify` on `σ` itself, then checks the opening
/// proof over `l` and the signature-linking proof over `ζ1`. Never raises;
/// any malformed or invalid proof is a plain `false`.
pub fn show_verify(
    params: &Params,
    pks: &[Point],
    m: Fq,
    sigma: &Signature,
    l: &[Fq],
    l0: Fq,
    proof: &ShowProof,
) -> bool {
    if !crate::verify::verify(params, pks, m, sigma) {
        return false;
    }
    if proof.s.len() != params.num_attrs + 2 || proof.psi.len() != params.num_attrs + 1 || proof.h_sdl.len() != params.num_attrs + 1 {
        return false;
    }

    let mut l_full = Vec::with_capacity(params.num_attrs + 1);
    l_full.push(l0);
    l_full.extend_from_slice(l);

    let psi = points(&proof.psi);
    let h_sdl = points(&proof.h_sdl);

    let c = h_miacl(&[
        pks,
        &m,
        sigma,
        &l_full,
        &l0,
        &proof.gamma_point,
        &psi,
        &h_sdl,
        &proof.g_sdl,
        &proof.t_sdl,
        &proof.r,
    ]);

    if params.g * proof.s_sdl + proof.gamma_point * c != proof.g_sdl {
        return false;
    }
    if params.t * proof.s_sdl + sigma.ζ * c != proof.t_sdl {
        return false;
    }
    for i in 0..psi.len() {
        if psi[i] * c + params.h_i[i] * proof.s_sdl != h_sdl[i] {
            return false;
        }
    }

    let s_gamma = proof.s[proof.s.len() - 1];
    let s_i = &proof.s[..proof.s.len() - 1];
    let rhs = sigma.ζ1 * c
        + proof.gamma_point * s_gamma
        + group::sum_points(psi.iter().zip(s_i).map(|(psi_i, s_i)| *psi_i * *s_i));

    rhs == proof.r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::{self, split};
    use crate::registration;
    use crate::sign::Signer;
    use rand::rngs::OsRng;

    fn sign_session(num_signers: usize, num_attrs: usize) -> (Params, Vec<Point>, Signature, ShowSecret, Vec<Fq>, Fq, Fq) {
        let mut rng = OsRng;
        let params = Params::generate(&mut rng, num_signers, num_attrs);
        let keys = keygen::keygen(&params, &mut rng);
        let (sks, pks) = split(&keys);

        let stores: Vec<_> = (0..num_signers).map(|_| registration::RegistrationStore::new()).collect();
        let attrs: Vec<Fq> = (0..num_attrs).map(|_| group::random_scalar(&mut rng)).collect();
        let reg = registration::register(&params, &attrs, &stores, &mut rng).unwrap();

        let mut opening = vec![reg.l0];
        opening.extend_from_slice(&attrs);

        let mut signers: Vec<Signer> = (0..num_signers)
            .map(|i| Signer::new(i, sks[i], pks[i], params.clone(), stores[i].clone()))
            .collect();

        let m = group::random_scalar(&mut rng);
        let (sigma, show_secret) = crate::sign::sign(&params, &pks, &mut signers, m, reg.c, &opening, &mut rng).unwrap();

        (params, pks, sigma, show_secret, attrs, reg.l0, m)
    }

    #[test]
    fn honest_show_verifies() {
        let mut rng = OsRng;
        let (params, pks, sigma, show_secret, attrs, l0, m) = sign_session(1, 1);
        let proof = show(&params, &pks, m, &sigma, &attrs, &show_secret, &mut rng);
        assert!(show_verify(&params, &pks, m, &sigma, &attrs, l0, &proof));
    }

    #[test]
    fn tampered_opening_is_rejected() {
        let mut rng = OsRng;
        let (params, pks, sigma, show_secret, mut attrs, l0, m) = sign_session(3, 3);
        let proof = show(&params, &pks, m, &sigma, &attrs, &show_secret, &mut rng);
        attrs[0] += Fq::from(1u64);
        assert!(!show_verify(&params, &pks, m, &sigma, &attrs, l0, &proof));
    }
}
