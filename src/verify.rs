//! Stateless signature verification. Pure function of `(params, pks, m, σ)`;
//! never mutates any party's state and never raises — an invalid signature
//! verifies to `false`, nothing more.

use crate::group::Fq;
use crate::params::Params;
use crate::pok;
use crate::sign::Signature;
use crate::transcript::h_miacl;

/// `Verify(params, pks, m, σ)`.
pub fn verify(params: &Params, pks: &[crate::group::Point], m: Fq, sigma: &Signature) -> bool {
    if sigma.y_bar == Fq::ZERO {
        return false;
    }

    let ζ2 = sigma.ζ - sigma.ζ1;
    let b_point = params.h * sigma.y_bar + ζ2 * sigma.b_bar;
    let θ = params.t * sigma.μ + sigma.ζ * sigma.y_bar;

    let y_bar_cubed = sigma.y_bar * sigma.y_bar * sigma.y_bar;

    let c_bar: Vec<Fq> = pks
        .iter()
        .map(|pk| h_miacl(&[pks, pk, &sigma.ζ, &sigma.ζ1, &sigma.r_bar, &b_point, &θ, &m]))
        .collect();

    let lhs = crate::group::sum_points(
        pks.iter()
            .zip(&c_bar)
            .map(|(pk, c)| *pk * (*c + y_bar_cubed)),
    ) + sigma.r_bar;
    let rhs = params.g * sigma.z_bar + b_point;

    let pok_ok = pok::verify(sigma.ζ1, &params.sign_proof_basis(), &sigma.π).unwrap_or(false);

    lhs == rhs && pok_ok
}
