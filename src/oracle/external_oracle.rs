use super::{decode_answer, Oracle, OracleAnswer};
use crate::error::{ModelFinderError, Result};
use log::debug;
use std::{
    io::{Read, Write},
    path::PathBuf,
    process::{Child, Command, Stdio},
    thread,
    time::Duration,
};
use wait_timeout::ChildExt;

/// An oracle which execution is made by a system command.
///
/// For each query, the instance is written to a temporary file and the solver is invoked as `program [options] theory instance`.
/// The verdict and the witness are read from the standard output.
/// A query fails with [`ModelFinderError::OracleUnavailable`] if the solver does not exit successfully,
/// and with [`ModelFinderError::OracleTimeout`] if it runs longer than the timeout.
///
/// On Unix systems the solver runs in its own process group, so that a timeout also kills the processes it spawned.
///
/// # Example
///
/// ```no_run
/// # use kripkemin::oracle::{ExternalOracle, Oracle};
/// # use std::time::Duration;
/// let mut oracle = ExternalOracle::new(
///     "/opt/enfragmo/Enfragmo",
///     "/opt/enfragmo/K.T".into(),
///     Duration::from_secs(60),
/// );
/// let answer = oracle.query("TYPE Subformula [1.. 1]\nTYPE World [1.. 1]\nPREDICATE Atom\n(1)\n").unwrap();
/// println!("{}", answer.verdict());
/// ```
pub struct ExternalOracle {
    program: String,
    options: Vec<String>,
    theory: PathBuf,
    timeout: Duration,
    verdict_line: usize,
}

impl ExternalOracle {
    /// Builds a new external oracle reading its verdict on the first line of its output.
    ///
    /// Each query is given at most `timeout` to complete.
    pub fn new(program: &str, theory: PathBuf, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            options: vec![],
            theory,
            timeout,
            verdict_line: 0,
        }
    }

    /// Sets the CLI options given before the theory file.
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// Returns the time allowed to each query.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sets the index of the (non-blank) output line carrying the verdict.
    pub fn with_verdict_line(mut self, verdict_line: usize) -> Self {
        self.verdict_line = verdict_line;
        self
    }

    fn run(&self, instance: &str) -> Result<String> {
        let unavailable = |e: std::io::Error| {
            ModelFinderError::OracleUnavailable(format!("{}: {}", self.program, e))
        };
        let mut instance_file = tempfile::Builder::new()
            .suffix(".I")
            .tempfile()
            .map_err(unavailable)?;
        instance_file
            .write_all(instance.as_bytes())
            .and_then(|_| instance_file.flush())
            .map_err(unavailable)?;
        let mut command = Command::new(&self.program);
        command
            .args(&self.options)
            .arg(&self.theory)
            .arg(instance_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);
        debug!("invoking {:?}", command);
        let mut child = command.spawn().map_err(unavailable)?;
        let mut stdout = child.stdout.take().ok_or_else(|| {
            ModelFinderError::OracleUnavailable("cannot read the solver output".to_string())
        })?;
        let reader = thread::spawn(move || {
            let mut buffer = String::new();
            stdout.read_to_string(&mut buffer).map(|_| buffer)
        });
        let status = match child.wait_timeout(self.timeout).map_err(unavailable)? {
            Some(status) => status,
            None => {
                kill_process_group(&mut child);
                // the reader thread ends when the last writer of the pipe is gone
                return Err(ModelFinderError::OracleTimeout(self.timeout));
            }
        };
        if !status.success() {
            return Err(ModelFinderError::OracleUnavailable(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        reader
            .join()
            .map_err(|_| {
                ModelFinderError::OracleUnavailable("cannot read the solver output".to_string())
            })?
            .map_err(unavailable)
    }
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    let killed = Command::new("sh")
        .arg("-c")
        .arg(format!("kill -9 -{}", child.id()))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !killed {
        debug!("cannot kill process group {}, killing the solver only", child.id());
        let _ = child.kill();
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl Oracle for ExternalOracle {
    fn query(&mut self, instance: &str) -> Result<OracleAnswer> {
        let output = self.run(instance)?;
        decode_answer(&output, self.verdict_line)
    }
}
