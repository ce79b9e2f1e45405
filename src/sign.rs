//! `SignEngine`: the four-round blind joint signature between one user and
//! `N` signers.
//!
//! Each signer is modeled as an explicit state machine — `AwaitNonce →
//! AwaitCommit → AwaitChallenge → AwaitOpenings → Done` — with a pure
//! `step(msg) → (out_msg, next_state)` transition per round. The user's
//! side is a single straight-line function that drives all `N` signers
//! through their rounds in lockstep; no party may advance to round `k+1`
//! before every counterparty it depends on has produced its round-`k`
//! message.

use std::sync::Arc;

use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ProtocolAbort;
use crate::group::{self, Fq, Point};
use crate::params::Params;
use crate::pok::{self, PokDlProof};
use crate::registration::RegistrationStore;
use crate::transcript::{h_miacl, Encode};

/// A round-3/4 wire slot: either the signer's own value (never sent back to
/// it) or another signer's opened value. Stands in for blanking index `i`
/// with an empty byte string, which is harder to get right at the type
/// level.
#[derive(Clone, Copy, Debug)]
pub enum Slot<T> {
    /// "This is your own slot; you already know this value."
    Redacted,
    /// Another party's opened value.
    Open(T),
}

/// Fills in `own` at `idx` and unwraps every other slot, panicking if a
/// non-own slot was left `Redacted` — that would be a caller bug, not a
/// protocol-level abort.
fn fill_own<T: Copy>(slots: &[Slot<T>], idx: usize, own: T) -> Vec<T> {
    slots
        .iter()
        .enumerate()
        .map(|(j, s)| match (j == idx, s) {
            (true, _) => own,
            (false, Slot::Open(v)) => *v,
            (false, Slot::Redacted) => panic!("slot {j} redacted but is not the signer's own"),
        })
        .collect()
}

/// Redacts index `idx` of `values`, producing the message a signer at
/// `idx` is allowed to see.
fn redact_own<T: Copy>(values: &[T], idx: usize) -> Vec<Slot<T>> {
    values
        .iter()
        .enumerate()
        .map(|(j, v)| if j == idx { Slot::Redacted } else { Slot::Open(*v) })
        .collect()
}

/// The joint signature `σ = (μ, ζ, ζ₁, b̄, π, R̄, ȳ, z̄)` assembled by the
/// user at the end of the four-round protocol.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Signature {
    #[serde(with = "crate::group::scalar_hex")]
    pub μ: Fq,
    #[serde(with = "crate::group::point_hex")]
    pub ζ: Point,
    #[serde(with = "crate::group::point_hex")]
    pub ζ1: Point,
    #[serde(with = "crate::group::scalar_hex")]
    pub b_bar: Fq,
    pub π: PokDlProof,
    #[serde(with = "crate::group::point_hex")]
    pub r_bar: Point,
    #[serde(with = "crate::group::scalar_hex")]
    pub y_bar: Fq,
    #[serde(with = "crate::group::scalar_hex")]
    pub z_bar: Fq,
}

impl Encode for Signature {
    fn encode(&self, out: &mut Vec<u8>) {
        self.μ.encode(out);
        self.ζ.encode(out);
        self.ζ1.encode(out);
        self.b_bar.encode(out);
        self.π.r.encode(out);
        self.π.s.encode(out);
        self.r_bar.encode(out);
        self.y_bar.encode(out);
        self.z_bar.encode(out);
    }
}

/// `(L_0, rnd, γ)`: held by the user after signing, required as an input to
/// the show-time proof.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ShowSecret {
    pub l0: Fq,
    pub rnd: Fq,
    pub γ: Fq,
}

/// Ephemeral per-round secrets a signer must zeroize once the session ends.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct RoundSecrets {
    a: Fq,
    b: Fq,
    y: Fq,
}

/// The user's ephemeral blinding scalars for one sign session, bundled so
/// they zeroize together once the signature is assembled. `rnd_i` joins the
/// bundle once round 2 has consumed it, since it is equally sensitive.
#[derive(Zeroize, ZeroizeOnDrop)]
struct UserBlinding {
    α: Fq,
    r: Fq,
    γ: Fq,
    τ: Fq,
    η: Fq,
    β: Vec<Fq>,
    rnd_i: Vec<Fq>,
}

enum SignerState {
    AwaitNonce,
    AwaitCommit,
    AwaitChallenge {
        secrets: RoundSecrets,
        t2: Point,
        b_point: Point,
        com: Fq,
    },
    AwaitOpenings {
        secrets: RoundSecrets,
        t2: Point,
        c_j: Fq,
        com_all: Vec<Fq>,
        b_all: Vec<Point>,
    },
    Done,
}

/// One signer's side of the four-round protocol, as an explicit state
/// machine. Holds `sk` for its lifetime; `sk` is zeroized on drop.
pub struct Signer {
    pub index: usize,
    pub pk: Point,
    sk: Fq,
    params: Params,
    registration: Arc<RegistrationStore>,
    state: SignerState,
}

impl Drop for Signer {
    fn drop(&mut self) {
        self.sk.zeroize();
    }
}

impl Signer {
    pub fn new(index: usize, sk: Fq, pk: Point, params: Params, registration: Arc<RegistrationStore>) -> Self {
        Self {
            index,
            pk,
            sk,
            params,
            registration,
            state: SignerState::AwaitNonce,
        }
    }

    /// Round 1: samples `rnd_i ← Fq` and sends it to the user.
    pub fn round1_nonce<R: RngCore + CryptoRng>(&mut self, rng: &mut R) -> Fq {
        assert!(matches!(self.state, SignerState::AwaitNonce), "round1 called out of order");
        let rnd_i = group::random_scalar(rng);
        self.state = SignerState::AwaitCommit;
        rnd_i
    }

    /// Round 2: recomputes `rnd = H_rnd(rnd_*)` independently, checks
    /// `C ∈ registration`, and commits `(A_i, B_i, com_i)`.
    pub fn round2_commit<R: RngCore + CryptoRng>(
        &mut self,
        c: Point,
        rnd_vec: &[Fq],
        rng: &mut R,
    ) -> Result<(Point, Point, Fq), ProtocolAbort> {
        assert!(matches!(self.state, SignerState::AwaitCommit), "round2 called out of order");

        if !self.registration.contains(&c) {
            tracing::warn!(signer = self.index, "sign aborted: unknown commitment");
            return Err(ProtocolAbort::UnknownCommitment);
        }

        let rnd = h_miacl(&[rnd_vec]);
        let t1 = self.params.g * rnd + c;
        let t2 = self.params.t - t1;

        let a = group::random_scalar(rng);
        let b = group::random_scalar(rng);
        let y = group::random_scalar(rng);

        let a_point = self.params.g * a;
        let b_point = t2 * b + self.params.h * y;
        let com = h_miacl(&[&(self.index as u64), &b, &y]);

        self.state = SignerState::AwaitChallenge {
            secrets: RoundSecrets { a, b, y },
            t2,
            b_point,
            com,
        };

        Ok((a_point, b_point, com))
    }

    /// Round 3: receives this signer's folded challenge `c_j_i` plus every
    /// other signer's blanked `(com, B)`, and replies with its own opening
    /// `(b_i, y_i)`.
    pub fn round3_open(
        &mut self,
        c_j: Fq,
        com_others: &[Slot<Fq>],
        b_others: &[Slot<Point>],
    ) -> (Fq, Fq) {
        let (secrets, t2, b_point, com) = match std::mem::replace(&mut self.state, SignerState::Done) {
            SignerState::AwaitChallenge { secrets, t2, b_point, com } => (secrets, t2, b_point, com),
            _ => panic!("round3 called out of order"),
        };

        let com_all = fill_own(com_others, self.index, com);
        let b_all = fill_own(b_others, self.index, b_point);
        let (b, y) = (secrets.b, secrets.y);

        self.state = SignerState::AwaitOpenings {
            secrets,
            t2,
            c_j,
            com_all,
            b_all,
        };

        (b, y)
    }

    /// Round 4: receives every other signer's blanked `(b, y)` opening,
    /// checks commitment/point consistency for all `j`, and replies with
    /// its joint-signature contribution `z_i`.
    pub fn round4_respond(
        &mut self,
        b_others: &[Slot<Fq>],
        y_others: &[Slot<Fq>],
    ) -> Result<Fq, ProtocolAbort> {
        let (secrets, t2, c_j, com_all, b_all) = match std::mem::replace(&mut self.state, SignerState::Done) {
            SignerState::AwaitOpenings { secrets, t2, c_j, com_all, b_all } => (secrets, t2, c_j, com_all, b_all),
            _ => panic!("round4 called out of order"),
        };

        let b_full = fill_own(b_others, self.index, secrets.b);
        let y_full = fill_own(y_others, self.index, secrets.y);

        for j in 0..com_all.len() {
            if com_all[j] != h_miacl(&[&(j as u64), &b_full[j], &y_full[j]]) {
                tracing::warn!(signer = self.index, j, "sign aborted: commitment opening mismatch");
                return Err(ProtocolAbort::CommitmentOpeningMismatch { j });
            }
        }
        for j in 0..b_all.len() {
            if b_all[j] != self.params.h * y_full[j] + t2 * b_full[j] {
                tracing::warn!(signer = self.index, j, "sign aborted: point consistency failure");
                return Err(ProtocolAbort::PointConsistencyFail { j });
            }
        }

        let y_sum = group::sum_scalars(y_full);
        let z = secrets.a + (c_j + y_sum * y_sum * y_sum) * self.sk;

        Ok(z)
    }
}

/// Orchestrates all four rounds across every signer in `signers`, in
/// signer-index order, and returns the assembled signature plus the
/// show-time secret (sans `L_0`, which the caller must adjoin from its
/// registration output).
#[allow(clippy::too_many_arguments)]
pub fn sign<R: RngCore + CryptoRng>(
    params: &Params,
    pks: &[Point],
    signers: &mut [Signer],
    m: Fq,
    c: Point,
    opening: &[Fq],
    rng: &mut R,
) -> Result<(Signature, ShowSecret), ProtocolAbort> {
    debug_assert_eq!(pks.len(), signers.len());
    debug_assert_eq!(opening.len(), params.num_attrs + 1);
    let n = signers.len();

    // Round 1: nonce exchange.
    let rnd_vec: Vec<Fq> = signers.iter_mut().map(|s| s.round1_nonce(rng)).collect();
    let rnd = h_miacl(&[&rnd_vec]);

    let t1 = params.g * rnd + c;
    let t2 = params.t - t1;

    // Round 2: per-signer commitments.
    let mut a_i = Vec::with_capacity(n);
    let mut b_i = Vec::with_capacity(n);
    let mut com_i = Vec::with_capacity(n);
    for s in signers.iter_mut() {
        let (a, b, com) = s.round2_commit(c, &rnd_vec, rng)?;
        a_i.push(a);
        b_i.push(b);
        com_i.push(com);
    }

    // User-side blinding scalars, bundled with the now-spent nonce vector so
    // all of them zeroize together once `secrets` drops.
    let secrets = UserBlinding {
        α: group::random_nonzero_scalar(rng),
        r: group::random_scalar(rng),
        γ: group::random_nonzero_scalar(rng),
        τ: group::random_scalar(rng),
        η: group::random_scalar(rng),
        β: (0..n).map(|_| group::random_scalar(rng)).collect(),
        rnd_i: rnd_vec,
    };

    let γ_cubed = secrets.γ * secrets.γ * secrets.γ;
    let α_cubed = secrets.α * secrets.α * secrets.α;

    let ζ = params.t * secrets.γ;
    let ζ1 = t1 * secrets.γ;
    let ζ2 = ζ - ζ1;
    let θ = params.t * secrets.τ;

    let a_sum = group::sum_points(a_i.iter().copied());
    let b_sum = group::sum_points(b_i.iter().copied());

    let b_bar_blinded = b_sum * (secrets.γ * secrets.α) + ζ2 * secrets.η;
    let r_bar = params.g * secrets.r
        + group::sum_points((0..n).map(|i| pks[i] * (α_cubed * γ_cubed * secrets.β[i])))
        + a_sum * (α_cubed * γ_cubed)
        + b_bar_blinded;

    let α_cubed_inv = α_cubed.invert();
    let γ_cubed_inv = γ_cubed.invert();

    let c_j_i: Vec<Fq> = (0..n)
        .map(|i| {
            h_miacl(&[pks, &pks[i], &ζ, &ζ1, &r_bar, &b_bar_blinded, &θ, &m])
                * α_cubed_inv
                * γ_cubed_inv
                + secrets.β[i]
        })
        .collect();

    // Round 3: challenges out, openings back.
    let mut b_open = vec![Fq::ZERO; n];
    let mut y_open = vec![Fq::ZERO; n];
    for (i, s) in signers.iter_mut().enumerate() {
        let com_others = redact_own(&com_i, i);
        let b_others = redact_own(&b_i, i);
        let (b, y) = s.round3_open(c_j_i[i], &com_others, &b_others);
        b_open[i] = b;
        y_open[i] = y;
    }

    // Round 4: openings out, final contributions back.
    let mut z_i = Vec::with_capacity(n);
    for (i, s) in signers.iter_mut().enumerate() {
        let b_others = redact_own(&b_open, i);
        let y_others = redact_own(&y_open, i);
        z_i.push(s.round4_respond(&b_others, &y_others)?);
    }

    let b_sum_scalar = group::sum_scalars(b_open.iter().copied());
    let y_sum_scalar = group::sum_scalars(y_open.iter().copied());
    let z_sum = group::sum_scalars(z_i.iter().copied());

    let b_check = b_sum == t2 * b_sum_scalar + params.h * y_sum_scalar;
    let a_check = params.g * z_sum
        == a_sum
            + group::sum_points((0..n).map(|i| {
                pks[i] * (c_j_i[i] + y_sum_scalar * y_sum_scalar * y_sum_scalar)
            }));
    if !a_check || !b_check {
        tracing::warn!("sign aborted: user-side consistency check failed");
        return Err(ProtocolAbort::UserConsistencyFail);
    }

    let z_bar = secrets.r + γ_cubed * α_cubed * z_sum;
    let y_bar = secrets.α * y_sum_scalar * secrets.γ;
    let b_bar = secrets.α * b_sum_scalar + secrets.η;
    let μ = secrets.τ - secrets.γ * y_bar;

    let op: Vec<Fq> = opening.iter().chain(std::iter::once(&rnd)).map(|x| secrets.γ * x).collect();
    let π = pok::prove(rng, ζ1, &op, &params.sign_proof_basis())?;
    let γ = secrets.γ;

    let sigma = Signature {
        μ,
        ζ,
        ζ1,
        b_bar,
        π,
        r_bar,
        y_bar,
        z_bar,
    };

    if !crate::verify::verify(params, pks, m, &sigma) {
        tracing::warn!("sign aborted: self-verification failed");
        return Err(ProtocolAbort::SelfVerifyFail);
    }

    tracing::debug!("sign session completed");

    Ok((
        sigma,
        ShowSecret {
            l0: opening[0],
            rnd,
            γ,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::{self, split};
    use crate::registration;
    use rand::rngs::OsRng;

    fn run_session(num_signers: usize, num_attrs: usize) -> (Params, Vec<Point>, Signature, ShowSecret, Vec<Fq>, Fq, Fq) {
        let mut rng = OsRng;
        let params = Params::generate(&mut rng, num_signers, num_attrs);
        let keys = keygen::keygen(&params, &mut rng);
        let (sks, pks) = split(&keys);

        let stores: Vec<_> = (0..num_signers).map(|_| RegistrationStore::new()).collect();
        let attrs: Vec<Fq> = (0..num_attrs).map(|_| group::random_scalar(&mut rng)).collect();
        let reg = registration::register(&params, &attrs, &stores, &mut rng).unwrap();

        let mut opening = vec![reg.l0];
        opening.extend_from_slice(&attrs);

        let mut signers: Vec<Signer> = (0..num_signers)
            .map(|i| Signer::new(i, sks[i], pks[i], params.clone(), stores[i].clone()))
            .collect();

        let m = group::random_scalar(&mut rng);
        let (sigma, show_secret) = sign(&params, &pks, &mut signers, m, reg.c, &opening, &mut rng).unwrap();

        (params, pks, sigma, show_secret, opening, reg.l0, m)
    }

    #[test]
    fn single_signer_single_attribute() {
        let (params, pks, sigma, _show_secret, _opening, _l0, m) = run_session(1, 1);
        assert!(crate::verify::verify(&params, &pks, m, &sigma));
    }

    #[test]
    fn three_signers_three_attributes() {
        let (params, pks, sigma, _show_secret, _opening, _l0, m) = run_session(3, 3);
        assert!(crate::verify::verify(&params, &pks, m, &sigma));
    }

    #[test]
    fn corrupted_y_bar_is_rejected() {
        let (params, pks, mut sigma, _show_secret, _opening, _l0, m) = run_session(2, 2);
        sigma.y_bar = Fq::ZERO;
        assert!(!crate::verify::verify(&params, &pks, m, &sigma));
    }

    #[test]
    fn unknown_commitment_aborts() {
        let mut rng = OsRng;
        let params = Params::generate(&mut rng, 2, 3);
        let keys = keygen::keygen(&params, &mut rng);
        let (sks, pks) = split(&keys);

        // Only signer 0 ever sees a registration; signer 1's store stays empty.
        let stores: Vec<_> = (0..2).map(|_| RegistrationStore::new()).collect();
        let attrs: Vec<Fq> = (0..3).map(|_| group::random_scalar(&mut rng)).collect();
        let reg = registration::register(&params, &attrs, &stores[..1], &mut rng).unwrap();

        let mut opening = vec![reg.l0];
        opening.extend_from_slice(&attrs);

        let mut signers: Vec<Signer> = (0..2)
            .map(|i| Signer::new(i, sks[i], pks[i], params.clone(), stores[i].clone()))
            .collect();

        let m = group::random_scalar(&mut rng);
        let err = sign(&params, &pks, &mut signers, m, reg.c, &opening, &mut rng).unwrap_err();
        assert_eq!(err, ProtocolAbort::UnknownCommitment);
    }
}
