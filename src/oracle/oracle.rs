use crate::error::{ModelFinderError, Result};

const SATISFIABLE_MARKER: &str = "<Satisfiable/>";
const UNSATISFIABLE_MARKER: &str = "<Unsatisfiable/>";

/// The verdict of the solver for a given number of worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A model exists with this number of worlds
    Satisfiable,
    /// No model exists with this number of worlds
    Unsatisfiable,
}

impl Verdict {
    /// Returns `true` iff the verdict is [`Verdict::Satisfiable`].
    pub fn is_sat(&self) -> bool {
        matches!(self, Verdict::Satisfiable)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Satisfiable => write!(f, "SAT"),
            Verdict::Unsatisfiable => write!(f, "UNSAT"),
        }
    }
}

/// The answer of the solver: its verdict and the raw text it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleAnswer {
    verdict: Verdict,
    witness: Vec<String>,
}

impl OracleAnswer {
    /// Builds a new answer.
    pub fn new(verdict: Verdict, witness: Vec<String>) -> Self {
        Self { verdict, witness }
    }

    /// Returns the verdict.
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Returns the non-blank lines of the solver output, trimmed.
    pub fn witness(&self) -> &[String] {
        &self.witness
    }
}

/// A decision procedure answering the satisfiability of problem instances.
///
/// The instance text given to the oracle already declares the number of worlds to consider.
pub trait Oracle {
    /// Queries the oracle.
    ///
    /// A single attempt is made; errors are reported as [`ModelFinderError`]s.
    fn query(&mut self, instance: &str) -> Result<OracleAnswer>;
}

/// Decodes the raw output of the solver.
///
/// Blank lines are ignored; the verdict is read from the non-blank line at index `verdict_line`,
/// which must contain either `<Satisfiable/>` or `<Unsatisfiable/>`.
///
/// ```
/// # use kripkemin::oracle::{decode_answer, Verdict};
/// let answer = decode_answer("\n<Unsatisfiable/>\n", 0).unwrap();
/// assert_eq!(Verdict::Unsatisfiable, answer.verdict());
/// ```
pub fn decode_answer(output: &str, verdict_line: usize) -> Result<OracleAnswer> {
    let lines = output
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect::<Vec<String>>();
    if lines.is_empty() {
        return Err(ModelFinderError::OracleUnavailable(
            "the solver produced no output".to_string(),
        ));
    }
    let line = lines.get(verdict_line).ok_or_else(|| {
        ModelFinderError::MalformedWitness(format!(
            "expected a verdict at line {}, but the output has only {} non-blank line(s)",
            verdict_line + 1,
            lines.len()
        ))
    })?;
    let verdict = if line.contains(UNSATISFIABLE_MARKER) {
        Verdict::Unsatisfiable
    } else if line.contains(SATISFIABLE_MARKER) {
        Verdict::Satisfiable
    } else {
        return Err(ModelFinderError::MalformedWitness(format!(
            r#"no verdict at line {}: "{}""#,
            verdict_line + 1,
            line
        )));
    };
    Ok(OracleAnswer::new(verdict, lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_sat() {
        let answer = decode_answer("<Satisfiable/>\n\n<DataSet Name='Accessible'>\n", 0).unwrap();
        assert!(answer.verdict().is_sat());
        assert_eq!(
            vec!["<Satisfiable/>", "<DataSet Name='Accessible'>"],
            answer.witness().to_vec()
        );
    }

    #[test]
    fn test_decode_at_offset() {
        let output = "<?xml version='1.0'?>\n\n  <Result><Unsatisfiable/></Result>\n";
        assert_eq!(
            Verdict::Unsatisfiable,
            decode_answer(output, 1).unwrap().verdict()
        );
        assert!(matches!(
            decode_answer(output, 0),
            Err(ModelFinderError::MalformedWitness(_))
        ));
    }

    #[test]
    fn test_decode_empty_output() {
        assert!(matches!(
            decode_answer("\n \n", 0),
            Err(ModelFinderError::OracleUnavailable(_))
        ));
    }

    #[test]
    fn test_decode_short_output() {
        match decode_answer("<Satisfiable/>", 2) {
            Err(ModelFinderError::MalformedWitness(m)) => assert!(m.contains("only 1")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!("SAT", Verdict::Satisfiable.to_string());
        assert_eq!("UNSAT", Verdict::Unsatisfiable.to_string());
    }
}
