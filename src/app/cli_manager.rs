use super::{
    app_helper::{init_logger, init_logger_with_level},
    command::Command,
    writable_string::WritableString,
};
use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg};
use log::info;
use std::{ffi::OsString, str::FromStr};
use sysinfo::System;

pub(crate) struct CliManager<'a> {
    app_name: &'a str,
    version: &'a str,
    author: &'a str,
    about: &'a str,
    commands: Vec<Box<dyn Command<'a> + 'a>>,
}

const LOGGING_LEVEL_ARG: &str = "LOGGING_LEVEL";

pub(crate) fn logging_level_cli_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name(LOGGING_LEVEL_ARG)
        .long("logging-level")
        .multiple(false)
        .default_value("info")
        .possible_values(&["trace", "debug", "info", "warn", "error", "off"])
        .help("set the minimal logging level")
}

impl<'a> CliManager<'a> {
    pub(crate) fn new(app_name: &'a str, version: &'a str, author: &'a str, about: &'a str) -> Self {
        CliManager {
            app_name,
            version,
            author,
            about,
            commands: vec![],
        }
    }

    pub(crate) fn add_command(&mut self, command: Box<dyn Command<'a> + 'a>) {
        self.commands.push(command);
    }

    pub(crate) fn parse_cli<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.into()).collect();
        let mut app = App::new(self.app_name)
            .global_setting(AppSettings::DisableVersion)
            .global_setting(AppSettings::VersionlessSubcommands)
            .setting(AppSettings::NeedsSubcommandHelp)
            .setting(AppSettings::SubcommandRequired)
            .version(self.version)
            .author(self.author)
            .about(self.about);
        for c in self.commands.iter() {
            app = app.subcommand(c.clap_subcommand());
        }
        match app.clone().get_matches_from_safe(args.iter()) {
            Ok(matches) => {
                let (name, sub_matches) = matches.subcommand();
                let command = self.commands.iter().find(|c| c.name() == name);
                match (command, sub_matches) {
                    (Some(c), Some(m)) => {
                        let log_level = m
                            .value_of(LOGGING_LEVEL_ARG)
                            .and_then(|l| log::LevelFilter::from_str(l).ok())
                            .unwrap_or(log::LevelFilter::Info);
                        init_logger_with_level(log_level);
                        info!("{} {}", self.app_name, self.version);
                        sys_info();
                        c.execute(m)
                    }
                    _ => Err(anyhow!("no such command: {}", name)),
                }
            }
            Err(clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            }) => {
                init_logger();
                self.print_help(&mut app, &args);
                Ok(())
            }
            Err(e) => {
                init_logger();
                info!("{} {}", self.app_name, self.version);
                Err(anyhow!("{}", e))
            }
        }
    }

    fn print_help(&self, app: &mut App, args: &[OsString]) {
        const HELP_STRINGS: [&str; 3] = ["help", "-h", "--help"];
        let print_message = |message: WritableString| {
            message.to_string().split('\n').for_each(|s| info!("{}", s));
            info!("");
        };
        let print_subcommand_help = |name: &str| match self.commands.iter().find(|c| c.name() == name) {
            Some(c) => {
                let mut message = WritableString::default();
                if c.clap_subcommand().write_long_help(&mut message).is_ok() {
                    print_message(message);
                }
                true
            }
            None => false,
        };
        let arg = |i: usize| args.get(i).and_then(|a| a.to_str());
        match (arg(1), arg(2)) {
            (Some(a1), _) if !HELP_STRINGS.contains(&a1) && print_subcommand_help(a1) => return,
            (Some(a1), Some(a2)) if HELP_STRINGS.contains(&a1) && print_subcommand_help(a2) => {
                return
            }
            _ => {}
        }
        let mut message = WritableString::default();
        if app.write_long_help(&mut message).is_ok() {
            print_message(message);
        }
    }
}

fn sys_info() {
    info!("----------------------------------------");
    let mut sys = System::new();
    sys.refresh_cpu();
    sys.refresh_memory();
    let unknown = || "[unknown]".to_string();
    info!("running on {}", System::host_name().unwrap_or_else(unknown));
    info!(
        "OS is {} {} with kernel {}",
        System::name().unwrap_or_else(unknown),
        System::os_version().unwrap_or_else(unknown),
        System::kernel_version().unwrap_or_else(unknown)
    );
    let mut cpu_kinds: Vec<&str> = sys.cpus().iter().map(|p| p.brand()).collect();
    cpu_kinds.sort_unstable();
    cpu_kinds.dedup();
    info!(
        "physical core count: {} {:?}",
        sys.physical_core_count()
            .map(|n| n.to_string())
            .unwrap_or_else(unknown),
        cpu_kinds
    );
    info!("total memory: {} KB", sys.total_memory() / 1024);
    info!("----------------------------------------");
}
