use std::time::Duration;
use thiserror::Error;

/// The errors raised while reading instances, querying the oracle and decoding its answers.
///
/// Running out of candidate sizes is not an error: see [`SearchOutcome::Bounded`](crate::search::SearchOutcome::Bounded).
#[derive(Error, Debug)]
pub enum ModelFinderError {
    /// The external solver could not be invoked, crashed, or produced no output.
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// The external solver did not answer before the caller deadline.
    #[error("oracle did not answer within {0:?}")]
    OracleTimeout(Duration),

    /// The solver output does not follow the expected format.
    #[error("malformed witness: {0}")]
    MalformedWitness(String),

    /// The problem instance does not follow the expected format.
    #[error("malformed instance: {0}")]
    MalformedInstance(String),
}

/// A result type using [`ModelFinderError`] as its error type.
pub type Result<T> = std::result::Result<T, ModelFinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            "malformed instance: no predicate defines subformula 3",
            ModelFinderError::MalformedInstance("no predicate defines subformula 3".to_string())
                .to_string()
        );
        assert_eq!(
            "oracle did not answer within 2s",
            ModelFinderError::OracleTimeout(Duration::from_secs(2)).to_string()
        );
    }
}
