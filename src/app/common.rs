use super::{
    app_helper::AppHelper, command::Command, AuthorsCommand, CheckCommand, EncodeCommand,
    SolveCommand,
};
use anyhow::{anyhow, Context, Result};
use clap::Arg;
use kripkemin::{
    formula::FormulaTree,
    io::FormulaTreeBuilder,
    search::{Probe, SearchListener, SearchState},
};
use log::{debug, error, info, warn};
use std::{fs, path::PathBuf, time::Duration};

pub(crate) fn create_app_helper() -> AppHelper<'static> {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let authors = option_env!("CARGO_PKG_AUTHORS").unwrap_or("unknown authors");
    let mut app = AppHelper::new(
        app_name,
        app_version,
        authors,
        "Kripkemin, a minimal Kripke model finder.",
    );
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(AuthorsCommand::new(app_name, app_version, authors)),
        Box::new(CheckCommand::new()),
        Box::new(EncodeCommand::new()),
        Box::new(SolveCommand::new()),
    ];
    for c in commands {
        app.add_command(c);
    }
    app
}

pub(crate) const ARG_INPUT: &str = "INPUT";

pub(crate) fn input_args() -> Arg<'static, 'static> {
    Arg::with_name(ARG_INPUT)
        .short("f")
        .empty_values(false)
        .multiple(true)
        .number_of_values(1)
        .help("a problem instance file (may be repeated)")
        .required(true)
}

/// Canonicalize a path given by the user.
pub(crate) fn canonicalize_file_path(file_path: &str) -> Result<PathBuf> {
    fs::canonicalize(PathBuf::from(file_path))
        .with_context(|| format!(r#"while opening file "{}""#, file_path))
}

pub(crate) fn read_file_path(file_path: &str) -> Result<String> {
    let canonicalized = canonicalize_file_path(file_path)?;
    info!("reading input file {:?}", canonicalized);
    fs::read_to_string(&canonicalized)
        .with_context(|| format!(r#"while reading file "{}""#, file_path))
}

pub(crate) fn read_formula_tree(file_path: &str, content: &str) -> Result<FormulaTree> {
    let mut builder = FormulaTreeBuilder::default();
    builder.add_warning_handler(Box::new(|line, msg| warn!("at line {}: {}", line, msg)));
    let tree = builder
        .build_from_str(content)
        .with_context(|| format!(r#"while reading the formula in "{}""#, file_path))?;
    info!(
        "the formula has {} subformula(s) and {} distinct atom(s)",
        tree.n_nodes(),
        tree.atom_equivalence().leaders().len()
    );
    Ok(tree)
}

/// Applies a fallible action to each file, reporting failures without stopping.
///
/// An error is returned at the end if the action failed on at least one file.
pub(crate) fn for_each_file<F>(files: &[&str], mut action: F) -> Result<()>
where
    F: FnMut(&str) -> Result<()>,
{
    let mut n_failures = 0;
    for file in files {
        if let Err(e) = action(*file) {
            n_failures += 1;
            error!("failed to process {}: {}", file, e);
            e.chain()
                .skip(1)
                .for_each(|err| error!("caused by: {}", err));
        }
    }
    if n_failures == 0 {
        Ok(())
    } else {
        Err(anyhow!(
            "{} out of {} file(s) could not be processed",
            n_failures,
            files.len()
        ))
    }
}

#[derive(Default)]
pub(crate) struct SearchLogger;

impl SearchListener for SearchLogger {
    fn probe_start(&self, size: usize) {
        debug!("calling the oracle with {} world(s)", size);
    }

    fn probe_end(&self, probe: &Probe, elapsed: Duration) {
        info!(
            "oracle answered {} for {} world(s) in {:?}",
            probe.verdict, probe.size, elapsed
        );
    }

    fn phase_changed(&self, state: &SearchState) {
        debug!(
            "search phase is {:?} after {} oracle call(s)",
            state.phase(),
            state.n_calls()
        );
    }
}
