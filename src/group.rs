//! The `GroupArith` facade: a prime-order elliptic curve group `G` and its
//! scalar field `Fq`, bound once to `curve25519_dalek`'s Ristretto group.
//!
//! The rest of the crate only ever imports [`Fq`] and [`Point`] from here, so
//! swapping the concrete curve later means touching this module alone.

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar as DalekScalar,
    traits::{Identity, MultiscalarMul},
};
use rand_core::{CryptoRng, RngCore};

/// Scalar field element.
pub type Fq = DalekScalar;

/// Group element.
pub type Point = RistrettoPoint;

/// Samples a uniformly random scalar.
pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Fq {
    Fq::random(rng)
}

/// Samples a uniformly random *nonzero* scalar, resampling on zero.
///
/// Needed anywhere a blinding factor is later inverted, e.g. `α` and `γ`
/// in the joint signing protocol.
pub fn random_nonzero_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Fq {
    loop {
        let s = Fq::random(rng);
        if s != Fq::ZERO {
            return s;
        }
    }
}

/// The standard generator `g`.
pub fn generator() -> Point {
    RISTRETTO_BASEPOINT_POINT
}

/// The group identity element.
pub fn identity() -> Point {
    Point::identity()
}

/// Generates an independent generator `g·r` for a freshly sampled, discarded `r`.
pub fn independent_generator<R: RngCore + CryptoRng>(rng: &mut R) -> Point {
    generator() * random_scalar(rng)
}

/// Sums a slice of points, equivalent to `self.ec_point.sum(...)` in the
/// Python source.
pub fn sum_points(points: impl IntoIterator<Item = Point>) -> Point {
    points.into_iter().fold(identity(), |acc, p| acc + p)
}

/// Sums a slice of scalars, equivalent to `self.fq.sum(...)` in the Python
/// source.
pub fn sum_scalars(scalars: impl IntoIterator<Item = Fq>) -> Fq {
    scalars.into_iter().fold(Fq::ZERO, |acc, s| acc + s)
}

/// Computes `Σ basis[i] * scalars[i]`, i.e. a multi-base commitment.
pub fn multi_commit(scalars: &[Fq], basis: &[Point]) -> Point {
    debug_assert_eq!(scalars.len(), basis.len());
    RistrettoPoint::multiscalar_mul(scalars.iter(), basis.iter())
}

/// Canonical 32-byte encoding of a point.
pub fn point_to_bytes(p: &Point) -> [u8; 32] {
    p.compress().to_bytes()
}

/// Decodes a canonical 32-byte point encoding. Returns `None` on an invalid
/// (non-canonical or non-curve) encoding.
pub fn point_from_bytes(bytes: &[u8; 32]) -> Option<Point> {
    CompressedRistretto(*bytes).decompress()
}

/// Canonical 32-byte encoding of a scalar.
pub fn scalar_to_bytes(s: &Fq) -> [u8; 32] {
    s.to_bytes()
}

/// `serde` support for [`Point`], encoded as a hex string of its canonical
/// compressed form — the human-readable analogue of the teacher's
/// `serialize_ristretto_point`/`deserialize_ristretto_point` pair in
/// `common.rs`, adapted from raw-bytes to hex since this crate's wire types
/// are JSON (fixtures), not bincode.
pub mod point_hex {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(point: &Point, ser: S) -> Result<S::Ok, S::Error> {
        hex::encode(point_to_bytes(point)).serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Point, D::Error> {
        let s = String::deserialize(de)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
        point_from_bytes(&arr)
            .ok_or_else(|| serde::de::Error::custom("invalid Ristretto point encoding"))
    }
}

/// `serde` support for [`Fq`], encoded as a hex string of its canonical
/// little-endian form.
pub mod scalar_hex {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(scalar: &Fq, ser: S) -> Result<S::Ok, S::Error> {
        hex::encode(scalar_to_bytes(scalar)).serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Fq, D::Error> {
        let s = String::deserialize(de)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
        Option::<Fq>::from(Fq::from_canonical_bytes(arr))
            .ok_or_else(|| serde::de::Error::custom("invalid scalar encoding"))
    }
}

/// `serde` support for `Vec<Point>`, used by [`crate::fixture::Fixture`]'s
/// `pks` field.
pub mod point_vec_hex {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], ser: S) -> Result<S::Ok, S::Error> {
        let hexed: Vec<String> = points.iter().map(|p| hex::encode(point_to_bytes(p))).collect();
        hexed.serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Point>, D::Error> {
        let hexed: Vec<String> = Vec::deserialize(de)?;
        hexed
            .into_iter()
            .map(|s| {
                let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
                point_from_bytes(&arr).ok_or_else(|| serde::de::Error::custom("invalid Ristretto point encoding"))
            })
            .collect()
    }
}

/// `serde` support for `Vec<Fq>`, used by [`crate::pok::PokDlProof`]'s
/// response vector.
pub mod scalar_vec_hex {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(scalars: &[Fq], ser: S) -> Result<S::Ok, S::Error> {
        let hexed: Vec<String> = scalars.iter().map(|s| hex::encode(scalar_to_bytes(s))).collect();
        hexed.serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Fq>, D::Error> {
        let hexed: Vec<String> = Vec::deserialize(de)?;
        hexed
            .into_iter()
            .map(|s| {
                let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
                Option::<Fq>::from(Fq::from_canonical_bytes(arr))
                    .ok_or_else(|| serde::de::Error::custom("invalid scalar encoding"))
            })
            .collect()
    }
}
