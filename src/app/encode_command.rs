use super::{cli_manager, command::Command, common};
use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use kripkemin::formula::{encode_instance, parse_formula};
use log::info;
use std::{fs, path::Path};

const CMD_NAME: &str = "encode";

const ARG_FORMULAS: &str = "FORMULAS";
const ARG_OUTPUT_DIR: &str = "OUTPUT_DIR";
const ARG_WORLDS: &str = "WORLDS";

pub(crate) struct EncodeCommand;

impl EncodeCommand {
    pub(crate) fn new() -> Self {
        EncodeCommand
    }
}

impl<'a> Command<'a> for EncodeCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Encodes modal formulas (one per line) into problem instances")
            .setting(AppSettings::DisableVersion)
            .arg(
                Arg::with_name(ARG_FORMULAS)
                    .short("f")
                    .empty_values(false)
                    .multiple(false)
                    .help("the file containing the formulas")
                    .required(true),
            )
            .arg(
                Arg::with_name(ARG_OUTPUT_DIR)
                    .short("o")
                    .long("output-dir")
                    .empty_values(false)
                    .multiple(false)
                    .help("the directory in which the instances are written (instead of the standard output)")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_WORLDS)
                    .long("worlds")
                    .empty_values(false)
                    .multiple(false)
                    .default_value("1")
                    .help("the number of worlds declared by the instances")
                    .required(false),
            )
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let file = arg_matches
            .value_of(ARG_FORMULAS)
            .ok_or_else(|| anyhow!("missing formula file"))?;
        let n_worlds = arg_matches
            .value_of(ARG_WORLDS)
            .unwrap_or("1")
            .parse::<usize>()
            .context("while reading the number of worlds")?;
        let output_dir = arg_matches.value_of(ARG_OUTPUT_DIR).map(Path::new);
        if let Some(dir) = output_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!(r#"while creating directory "{}""#, dir.display()))?;
        }
        let stem = Path::new(file)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "formula".to_string());
        let content = common::read_file_path(file)?;
        let mut n_formulas = 0;
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            n_formulas += 1;
            let (label, text) = split_label(line);
            let label = label.map(|l| l.to_string()).unwrap_or_else(|| n_formulas.to_string());
            let formula = parse_formula(text).with_context(|| format!("at line {}", i + 1))?;
            let instance = encode_instance(&formula, n_worlds);
            match output_dir {
                Some(dir) => {
                    let path = dir.join(format!("{}-{}.I", stem, label));
                    fs::write(&path, instance)
                        .with_context(|| format!(r#"while writing "{}""#, path.display()))?;
                    info!("wrote {:?} for formula {}", path, formula);
                }
                None => println!("{}", instance),
            }
        }
        info!("encoded {} formula(s)", n_formulas);
        Ok(())
    }
}

fn split_label(line: &str) -> (Option<&str>, &str) {
    match line.split_once(':') {
        Some((label, text))
            if !label.trim().is_empty() && label.trim().chars().all(|c| c.is_ascii_digit()) =>
        {
            (Some(label.trim()), text)
        }
        _ => (None, line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_label() {
        assert_eq!((Some("12"), " box p1"), split_label("12: box p1"));
        assert_eq!((None, "box p1"), split_label("box p1"));
        assert_eq!((None, "p1: p2"), split_label("p1: p2"));
    }
}
