//! Command dispatch for the `castor` binary

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{ConfigRegistry, Configuration};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{ConfigPath, ConfigValue};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Get {
            file,
            path,
            as_bool,
            default,
        }) => cmd_get(file, path, *as_bool, default.as_deref()),
        Some(Commands::GetAll {
            file,
            path,
            as_bool,
        }) => cmd_get_all(file, path, *as_bool),
        Some(Commands::Sections { file, path }) => cmd_sections(file, path),
        Some(Commands::Names { file, path }) => cmd_names(file, path),
        Some(Commands::Set { file, value, path }) => cmd_set(file, value, path),
        Some(Commands::Fmt { file, write }) => cmd_fmt(file, *write),
        Some(Commands::Tree { file, path }) => cmd_tree(file, path),
        Some(Commands::Lookup { name }) => cmd_lookup(name),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `castor --help`".to_string(),
        )),
    }
}

#[instrument(level = "debug")]
fn cmd_get(file: &Path, path: &[String], as_bool: bool, default: Option<&str>) -> CliResult<()> {
    let config = Configuration::open(file)?;
    let path = ConfigPath::new(path);
    let value = match (as_bool, default) {
        (true, Some(d)) => {
            config.try_get(bool_default(d)?, &path)?.to_string()
        }
        (true, None) => config.get::<bool>(&path)?.to_string(),
        (false, Some(d)) => config.try_get(d.to_string(), &path)?,
        (false, None) => config.get::<String>(&path)?,
    };
    output::info(&value);
    Ok(())
}

/// Reads `--default` with the same rule as stored booleans.
fn bool_default(raw: &str) -> CliResult<bool> {
    bool::from_config_str(raw)
        .map_err(|reason| CliError::InvalidArgs(format!("default '{}': {}", raw, reason)))
}

#[instrument(level = "debug")]
fn cmd_get_all(file: &Path, path: &[String], as_bool: bool) -> CliResult<()> {
    let config = Configuration::open(file)?;
    let path = ConfigPath::new(path);
    let values: Vec<String> = if as_bool {
        config
            .get_all::<bool>(&path)?
            .into_iter()
            .map(|v| v.to_string())
            .collect()
    } else {
        config.get_all::<String>(&path)?
    };
    for value in values {
        output::info(&value);
    }
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_sections(file: &Path, path: &[String]) -> CliResult<()> {
    let config = Configuration::open(file)?;
    for name in config.sections(ConfigPath::new(path))? {
        output::info(&name);
    }
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_names(file: &Path, path: &[String]) -> CliResult<()> {
    let config = Configuration::open(file)?;
    for name in config.names(ConfigPath::new(path))? {
        output::info(&name);
    }
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_set(file: &Path, value: &str, path: &[String]) -> CliResult<()> {
    let mut config = Configuration::open(file)?;
    let path = ConfigPath::new(path);
    let updated = config.set(value.to_string(), &path);
    if updated == 0 {
        output::warning(&format!("no value at '{}', file unchanged", path));
        return Ok(());
    }
    config.store()?;
    output::success(&format!("updated {} value(s) at '{}'", updated, path));
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_fmt(file: &Path, write: bool) -> CliResult<()> {
    let config = Configuration::open(file)?;
    if write {
        config.store()?;
        output::action("Formatted", &file.display());
    } else {
        print!("{}", config.serialize());
    }
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_tree(file: &Path, path: &[String]) -> CliResult<()> {
    let config = Configuration::open(file)?;
    if path.is_empty() {
        output::info(&config.to_tree());
    } else {
        output::info(&config.instance(ConfigPath::new(path))?.to_tree());
    }
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_lookup(name: &str) -> CliResult<()> {
    let settings = Settings::load()?;
    let mut registry = ConfigRegistry::new(settings);
    let candidates = registry.candidates(name);
    debug!("candidates for '{}': {:?}", name, candidates);

    match registry.get(name)? {
        Some(config) => {
            let location = config
                .filename()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            output::action("Found", &location);
            output::info(&config.to_tree());
            Ok(())
        }
        None => {
            output::header("Searched:");
            for candidate in candidates {
                output::failure(&candidate.display());
            }
            Err(CliError::Usage(format!("no configuration named '{}'", name)))
        }
    }
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            print!("{}", settings.to_toml()?);
            output::detail(&format!("config_dir = {}", settings.config_dir().display()));
        }
        ConfigCommands::Template => print!("{}", Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no home directory, global settings unavailable"),
        },
    }
    Ok(())
}
