//! The decision procedure used to test the existence of models of a given size.

mod external_oracle;
pub use external_oracle::ExternalOracle;

#[allow(clippy::module_inception)]
mod oracle;
pub use oracle::decode_answer;
pub use oracle::Oracle;
pub use oracle::OracleAnswer;
pub use oracle::Verdict;
