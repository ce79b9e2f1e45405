//! JSON fixture I/O for downstream verifier implementations.
//!
//! `input.json` is a minimal object carrying just enough of a signature
//! session (`R̄`, `m`, `pks`, `ȳ`, `z̄`) to re-run the non-PoK-DL half of
//! `Verify` without linking against this crate. Writing the fixture is in
//! scope; nothing here reads it back.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::group::{Fq, Point};
use crate::sign::Signature;

/// The `input.json` object handed to downstream verifiers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(with = "crate::group::point_hex")]
    pub r_bar: Point,
    #[serde(with = "crate::group::scalar_hex")]
    pub m: Fq,
    #[serde(with = "crate::group::point_vec_hex")]
    pub pks: Vec<Point>,
    #[serde(with = "crate::group::scalar_hex")]
    pub y_bar: Fq,
    #[serde(with = "crate::group::scalar_hex")]
    pub z_bar: Fq,
}

impl Fixture {
    pub fn from_session(pks: &[Point], m: Fq, sigma: &Signature) -> Self {
        Self {
            r_bar: sigma.r_bar,
            m,
            pks: pks.to_vec(),
            y_bar: sigma.y_bar,
            z_bar: sigma.z_bar,
        }
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).expect("Fixture serialization is infallible");
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group;
    use rand::rngs::OsRng;

    #[test]
    fn round_trips_through_json() {
        let mut rng = OsRng;
        let pks = vec![group::independent_generator(&mut rng), group::independent_generator(&mut rng)];
        let fixture = Fixture {
            r_bar: group::independent_generator(&mut rng),
            m: group::random_scalar(&mut rng),
            pks,
            y_bar: group::random_nonzero_scalar(&mut rng),
            z_bar: group::random_scalar(&mut rng),
        };

        let json = serde_json::to_string(&fixture).unwrap();
        let back: Fixture = serde_json::from_str(&json).unwrap();
        assert_eq!(fixture.r_bar, back.r_bar);
        assert_eq!(fixture.m, back.m);
        assert_eq!(fixture.pks, back.pks);
        assert_eq!(fixture.y_bar, back.y_bar);
        assert_eq!(fixture.z_bar, back.z_bar);
    }
}
