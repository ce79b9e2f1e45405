//! `ProtocolAbort`: the single error kind of the protocol.
//!
//! Every sub-reason is fatal to the current session and none are
//! recoverable locally — a party that observes one must discard all
//! session state (except, for signers, their already-accepted
//! `registration` entries) and treat the session as failed.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolAbort {
    /// PoK-DL: the proof's response vector length disagrees with the basis length.
    #[error("PoK-DL proof shape mismatch: response vector length disagrees with basis")]
    ProofShapeMismatch,

    /// Signer: PoK-DL over the registration commitment failed to verify.
    #[error("registration rejected: PoK-DL over the commitment did not verify")]
    RegistrationRejected,

    /// Signer: the user-supplied commitment `C` is not present in `registration`.
    #[error("unknown commitment: C was never accepted by this signer's registration")]
    UnknownCommitment,

    /// Signer: a received commitment opening does not hash back to the
    /// claimed commitment value for some signer index `j`.
    #[error("commitment opening mismatch for signer {j}")]
    CommitmentOpeningMismatch { j: usize },

    /// Signer: a received `B_j` point is inconsistent with the claimed
    /// opening `(b_j, y_j)` for some signer index `j`.
    #[error("point consistency failure for signer {j}")]
    PointConsistencyFail { j: usize },

    /// User: the aggregated `A_sum`/`B_sum` consistency check failed.
    #[error("user-side consistency check on aggregated commitments failed")]
    UserConsistencyFail,

    /// User: the freshly assembled signature failed its own `Verify` call.
    #[error("self-verification of the assembled signature failed")]
    SelfVerifyFail,
}

pub type Result<T> = std::result::Result<T, ProtocolAbort>;
