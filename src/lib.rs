//! Multi-issuer anonymous credentials with limited linkability (MIACL).
//!
//! A user registers a committed attribute vector with `N` independent
//! signers, obtains from them a joint blind signature on a message without
//! any signer learning the attributes or the message, and later produces a
//! non-interactive proof binding that signature to a chosen disclosure of
//! the attributes.
//!
//! Control flow: [`params::Params::generate`] → [`keygen::keygen`] →
//! [`registration::register`] → [`sign::sign`] → ([`verify::verify`] |
//! [`show::show`] → [`show::show_verify`]).

pub mod error;
pub mod fixture;
pub mod group;
pub mod keygen;
pub mod params;
pub mod pok;
pub mod registration;
pub mod show;
pub mod sign;
pub mod transcript;
pub mod verify;

pub use error::ProtocolAbort;
pub use group::{Fq, Point};
