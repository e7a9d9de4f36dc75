use thiserror::Error;

use crate::sim::SimError;

use super::NodeId;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
#[derive(Debug, Error)]
pub enum AigError {
    /// A different gate with the given id already exists.
    #[error("a different gate with id={0} already exists")]
    DuplicateId(NodeId),

    /// The id 0 is reserved for the constant-zero gate only.
    #[error("id=0 is for the constant-zero gate only")]
    IdZeroButNotConst,

    /// The gate with given id does not exist.
    #[error("gate with id={0} does not exist")]
    GateDoesNotExist(NodeId),

    /// Invalid operation on a fanin slot the gate's kind does not have.
    /// Outputs only have slot 0, and gates slots 0 and 1.
    #[error("gate {0} has no fanin slot {1}")]
    InvalidFaninSlot(NodeId, usize),

    /// The AIG has reached an invalid state. This should never happen.
    /// For example, a fanout entry on gate `t` should always have a matching
    /// fanin slot on the gate it names. If this error is raised, my code is garbage.
    #[error("the AIG has reached an invalid state - this should not happen - error: {0}")]
    InvalidState(String),

    /// The SAT engine failed. Fatal: the proof model is assumed always
    /// satisfiable-or-refutable, there is no soft-fail path.
    #[error("sat solver error: {0}")]
    Solver(String),

    /// Just forwarding a [`ParserError`].
    #[error("{0}")]
    ParserError(#[from] ParserError),

    /// Just forwarding an io error (reports and serializers write to
    /// arbitrary `Write` sinks).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Just forwarding a [`SimError`].
    ///
    /// [`SimError`]: crate::sim::SimError
    #[error("{0}")]
    SimError(#[from] SimError),
}

/// Error returned when parsing an AIGER file failed.
///
/// It is defined here because the `parser` module is private.
#[derive(Debug, Error)]
pub enum ParserError {
    /// All features are not supported (only the basics in fact).
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Invalid token, something else was expected.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// An IO error occured (file doesn't exist, or doesn't have the right extension, ...).
    #[error("io error: {0}")]
    IoError(String),
}
