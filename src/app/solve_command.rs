use super::{cli_manager, command::Command, common};
use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use kripkemin::{
    io::{persist_model, InstanceTemplate, ModelWriter, RelationSpec, TextModelWriter},
    model::KripkeModelBuilder,
    oracle::{ExternalOracle, Oracle},
    search::{finite_model_bound, SearchConfig, SearchController, SearchOutcome},
};
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

const CMD_NAME: &str = "solve";

const ARG_ORACLE: &str = "ORACLE";
const ARG_ORACLE_OPTIONS: &str = "ORACLE_OPTIONS";
const ARG_THEORY: &str = "THEORY";
const ARG_TIMEOUT: &str = "TIMEOUT";
const ARG_STARTING_SIZE: &str = "STARTING_SIZE";
const ARG_MAX_SIZE: &str = "MAX_SIZE";
const ARG_NO_BISECTION: &str = "NO_BISECTION";
const ARG_VERDICT_LINE: &str = "VERDICT_LINE";
const ARG_ACCESSIBILITY: &str = "ACCESSIBILITY";
const ARG_VALUATION: &str = "VALUATION";
const ARG_OUTPUT_DIR: &str = "OUTPUT_DIR";

pub(crate) struct SolveCommand;

impl SolveCommand {
    pub(crate) fn new() -> Self {
        SolveCommand
    }
}

impl<'a> Command<'a> for SolveCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Searches the minimal Kripke models of the formulas encoded by problem instances")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .args(&oracle_args())
            .args(&search_args())
            .args(&output_args())
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let files = arg_matches
            .values_of(common::ARG_INPUT)
            .map(|v| v.collect::<Vec<&str>>())
            .unwrap_or_default();
        let mut oracle = create_oracle(arg_matches)?;
        let settings = SolveSettings::from_arg_matches(arg_matches)?;
        common::for_each_file(&files, |file| solve_file(file, &mut oracle, &settings))
    }
}

fn oracle_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_ORACLE)
            .long("oracle")
            .empty_values(false)
            .multiple(false)
            .help("the solver used to test the existence of models of a given size")
            .required(true),
        Arg::with_name(ARG_ORACLE_OPTIONS)
            .long("oracle-opt")
            .empty_values(false)
            .multiple(true)
            .number_of_values(1)
            .allow_hyphen_values(true)
            .help("an option to give to the solver, before the theory file")
            .required(false),
        Arg::with_name(ARG_THEORY)
            .long("theory")
            .empty_values(false)
            .multiple(false)
            .help("the theory file given to the solver")
            .required(true),
        Arg::with_name(ARG_TIMEOUT)
            .long("timeout")
            .empty_values(false)
            .multiple(false)
            .default_value("600")
            .help("the time allowed to each solver call, in seconds")
            .required(false),
        Arg::with_name(ARG_VERDICT_LINE)
            .long("verdict-line")
            .empty_values(false)
            .multiple(false)
            .default_value("0")
            .help("the index of the non-blank line of the solver output holding the verdict")
            .required(false),
    ]
}

fn search_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_STARTING_SIZE)
            .long("starting-size")
            .empty_values(false)
            .multiple(false)
            .default_value("1")
            .help("the first number of worlds to try")
            .required(false),
        Arg::with_name(ARG_MAX_SIZE)
            .long("max-size")
            .empty_values(false)
            .multiple(false)
            .help("the number of worlds beyond which the search gives up (defaults to the finite model bound)")
            .required(false),
        Arg::with_name(ARG_NO_BISECTION)
            .long("no-bisection")
            .takes_value(false)
            .help("stop at the first model found while doubling the number of worlds")
            .required(false),
        Arg::with_name(ARG_ACCESSIBILITY)
            .long("accessibility-relation")
            .empty_values(false)
            .multiple(false)
            .default_value("Accessible")
            .help("the name of the accessibility relation in the solver output")
            .required(false),
        Arg::with_name(ARG_VALUATION)
            .long("valuation-relation")
            .empty_values(false)
            .multiple(false)
            .default_value("Valuation")
            .help("the name of the valuation relation in the solver output")
            .required(false),
    ]
}

fn output_args() -> Vec<Arg<'static, 'static>> {
    vec![Arg::with_name(ARG_OUTPUT_DIR)
        .long("output-dir")
        .empty_values(false)
        .multiple(false)
        .help("a directory in which the witnesses and the models are written")
        .required(false)]
}

fn parse_arg<T>(arg_matches: &ArgMatches<'_>, arg: &str) -> Result<Option<T>>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    arg_matches
        .value_of(arg)
        .map(|v| {
            v.parse::<T>()
                .with_context(|| format!(r#"invalid value "{}" for {}"#, v, arg.to_lowercase()))
        })
        .transpose()
}

fn create_oracle(arg_matches: &ArgMatches<'_>) -> Result<ExternalOracle> {
    let program = arg_matches
        .value_of(ARG_ORACLE)
        .ok_or_else(|| anyhow!("missing oracle"))?;
    let theory = common::canonicalize_file_path(
        arg_matches
            .value_of(ARG_THEORY)
            .ok_or_else(|| anyhow!("missing theory file"))?,
    )?;
    let options = arg_matches
        .values_of(ARG_ORACLE_OPTIONS)
        .map(|v| v.map(|o| o.to_string()).collect::<Vec<String>>())
        .unwrap_or_default();
    info!("using {} with theory {:?} as oracle", program, theory);
    let secs = parse_arg::<f64>(arg_matches, ARG_TIMEOUT)?
        .ok_or_else(|| anyhow!("missing timeout"))?;
    if !secs.is_finite() || secs <= 0. {
        return Err(anyhow!("the timeout must be a positive number of seconds"));
    }
    let oracle = ExternalOracle::new(program, theory, Duration::from_secs_f64(secs))
        .with_options(options)
        .with_verdict_line(parse_arg(arg_matches, ARG_VERDICT_LINE)?.unwrap_or(0));
    Ok(oracle)
}

struct SolveSettings {
    starting_size: usize,
    max_size: Option<usize>,
    bisect: bool,
    model_builder: KripkeModelBuilder,
    output_dir: Option<PathBuf>,
}

impl SolveSettings {
    fn from_arg_matches(arg_matches: &ArgMatches<'_>) -> Result<Self> {
        let output_dir = arg_matches.value_of(ARG_OUTPUT_DIR).map(PathBuf::from);
        if let Some(dir) = &output_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!(r#"while creating directory "{}""#, dir.display()))?;
        }
        let relation_name = |arg: &str, default: &'static str| {
            arg_matches.value_of(arg).unwrap_or(default).to_string()
        };
        Ok(Self {
            starting_size: parse_arg(arg_matches, ARG_STARTING_SIZE)?.unwrap_or(1),
            max_size: parse_arg(arg_matches, ARG_MAX_SIZE)?,
            bisect: !arg_matches.is_present(ARG_NO_BISECTION),
            model_builder: KripkeModelBuilder::new(
                RelationSpec::accessibility(&relation_name(ARG_ACCESSIBILITY, "Accessible")),
                RelationSpec::valuation(&relation_name(ARG_VALUATION, "Valuation")),
            ),
            output_dir,
        })
    }

    fn search_config(&self, n_subformulas: usize) -> SearchConfig {
        SearchConfig {
            starting_size: self.starting_size,
            max_size: self
                .max_size
                .unwrap_or_else(|| finite_model_bound(n_subformulas)),
            bisect: self.bisect,
        }
    }
}

fn solve_file(file: &str, oracle: &mut dyn Oracle, settings: &SolveSettings) -> Result<()> {
    let content = common::read_file_path(file)?;
    let tree = common::read_formula_tree(file, &content)?;
    let template = InstanceTemplate::new(&content)
        .with_context(|| format!(r#"while reading the instance in "{}""#, file))?;
    println!("formula: {}", tree);
    let config = settings.search_config(template.n_subformulas());
    info!(
        "searching a model with {} to {} world(s)",
        config.starting_size, config.max_size
    );
    let mut controller = SearchController::new(&template, config);
    controller.add_listener(Box::<common::SearchLogger>::default());
    let outcome = controller
        .run(oracle)
        .with_context(|| format!(r#"while searching a model for "{}""#, file))?;
    info!("the oracle was called {} time(s)", outcome.probes().len());
    match outcome {
        SearchOutcome::Found { size, witness, .. } => {
            let model = settings
                .model_builder
                .build_from_witness(witness.witness(), tree.atom_equivalence(), size)
                .with_context(|| format!("while reading the model with {} world(s)", size))?;
            let diagram = model.to_diagram(&file_stem(file), &tree.atom_names());
            println!("minimal model: {} world(s)", size);
            TextModelWriter.write_model(&mut std::io::stdout(), &diagram)?;
            if let Some(dir) = &settings.output_dir {
                let witness_path = dir.join(format!("{}-minimal.txt", diagram.name()));
                fs::write(&witness_path, witness.witness().join("\n") + "\n").with_context(
                    || format!(r#"while writing "{}""#, witness_path.display()),
                )?;
                let paths = persist_model(dir, &diagram)?;
                info!("wrote {:?}, {:?}", witness_path, paths);
            }
        }
        SearchOutcome::Bounded { max_size, .. } => {
            println!("no model with at most {} world(s)", max_size);
        }
    }
    Ok(())
}

fn file_stem(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "model".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::NamedTempFile;

    fn oracle_from_args(extra_args: &[&str]) -> Result<ExternalOracle> {
        let theory = NamedTempFile::new("theory.T").unwrap();
        std::fs::write(theory.path(), "").unwrap();
        let theory_path = theory.path().to_string_lossy().to_string();
        let mut args = vec!["solve", "--oracle", "solver", "--theory", theory_path.as_str()];
        args.extend_from_slice(extra_args);
        let app = SolveCommand::new().clap_subcommand();
        let arg_matches = app.get_matches_from_safe(args).unwrap();
        create_oracle(&arg_matches)
    }

    #[test]
    fn test_default_timeout() {
        let oracle = oracle_from_args(&[]).unwrap();
        assert_eq!(Duration::from_secs(600), oracle.timeout());
    }

    #[test]
    fn test_custom_timeout() {
        let oracle = oracle_from_args(&["--timeout", "1.5"]).unwrap();
        assert_eq!(Duration::from_millis(1500), oracle.timeout());
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(oracle_from_args(&["--timeout", "0"]).is_err());
        assert!(oracle_from_args(&["--timeout", "never"]).is_err());
    }
}
