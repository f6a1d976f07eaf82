use super::{cli_manager, command::Command, common};
use anyhow::Result;
use clap::{App, AppSettings, ArgMatches, SubCommand};

const CMD_NAME: &str = "check";

pub(crate) struct CheckCommand;

impl CheckCommand {
    pub(crate) fn new() -> Self {
        CheckCommand
    }
}

impl<'a> Command<'a> for CheckCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Checks problem instances for errors and prints the formulas they encode")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let files = arg_matches
            .values_of(common::ARG_INPUT)
            .map(|v| v.collect::<Vec<&str>>())
            .unwrap_or_default();
        common::for_each_file(&files, |file| {
            let content = common::read_file_path(file)?;
            let tree = common::read_formula_tree(file, &content)?;
            println!("{}", tree);
            Ok(())
        })
    }
}
