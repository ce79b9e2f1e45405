//! Public parameter generation.
//!
//! A `Params` instance is created once per protocol deployment and is
//! immutable thereafter; every engine in this crate borrows it rather than
//! re-deriving generators.

use rand_core::{CryptoRng, RngCore};

use crate::group::{self, Point};

/// Process-lifetime public parameters: generators `g, h, t, h_0..h_A` and
/// the protocol's `(N, A)` shape.
#[derive(Clone, Debug)]
pub struct Params {
    /// Standard generator.
    pub g: Point,
    /// Independent generator used as the signing blinding base.
    pub h: Point,
    /// Independent generator used to derive `t_1`/`t_2` in `SignEngine`.
    pub t: Point,
    /// `A + 1` independent generators: `h_i[0]` is the blinding-slot
    /// generator, `h_i[1..=A]` are the attribute-slot generators.
    pub h_i: Vec<Point>,
    /// Number of attribute slots `A`.
    pub num_attrs: usize,
    /// Number of signers `N`.
    pub num_signers: usize,
}

impl Params {
    /// Generates a fresh parameter set for `num_signers` signers and
    /// `num_attrs` attributes. All discrete logs of `h`, `t`, and `h_i` are
    /// sampled uniformly and then discarded.
    pub fn generate<R: RngCore + CryptoRng>(
        rng: &mut R,
        num_signers: usize,
        num_attrs: usize,
    ) -> Self {
        let g = group::generator();
        let h = group::independent_generator(rng);
        let t = group::independent_generator(rng);
        let h_i: Vec<Point> = (0..=num_attrs)
            .map(|_| group::independent_generator(rng))
            .collect();

        tracing::debug!(num_signers, num_attrs, "generated MIACL public parameters");

        Self {
            g,
            h,
            t,
            h_i,
            num_attrs,
            num_signers,
        }
    }

    /// The registration/final-proof PoK-DL basis `[h_0, …, h_A]`.
    pub fn attribute_basis(&self) -> &[Point] {
        &self.h_i
    }

    /// The sign-time PoK-DL basis `[h_0, …, h_A, g]`, of length `A + 2`.
    pub fn sign_proof_basis(&self) -> Vec<Point> {
        let mut basis = self.h_i.clone();
        basis.push(self.g);
        basis
    }
}

/// A dummy helper so other modules can build opening vectors without
/// re-deriving the `A + 1` shape every time.
pub fn opening_len(params: &Params) -> usize {
    params.num_attrs + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn generates_expected_shape() {
        let mut rng = OsRng;
        let params = Params::generate(&mut rng, 3, 4);
        assert_eq!(params.h_i.len(), 5);
        assert_eq!(params.sign_proof_basis().len(), 6);
    }
}
