use thiserror::Error;

/// Failure modes of the HTJ2K high-throughput block decoder.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    #[error("malformed SCUP field in cleanup segment")]
    MalformedScup,
    #[error("missingMSBs > 29 with more than one coding pass")]
    TooManyMissingMsbs,
    #[error("decoded U_q exceeds missingMSBs + 1")]
    UnreachableBitplane,
    #[error("numPasses > 1 but refinement segment is empty")]
    TruncatedRefinement,
    #[error("numPasses > 3 is not supported")]
    UnsupportedPassCount,
}
