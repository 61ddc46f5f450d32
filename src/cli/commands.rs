//! Command dispatch

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::ApplyReport;
use crate::application::ApplicationResult;
use crate::cli::args::{Cli, Commands, ConfigCommands, ServiceArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{ConnectionParam, CONTROL_VARS};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::MemoryEnvironment;
use crate::infrastructure::InfraError;

const MASK: &str = "********";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Show { target, reveal }) => cmd_show(&container, target, *reveal),
        Some(Commands::Env { target }) => cmd_env(&container, target),
        Some(Commands::List { file }) => cmd_list(&container, file.as_deref()),
        Some(Commands::Config { command }) => cmd_config(&container, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see 'pgservice --help'".to_string(),
        )),
    }
}

/// Command-line value first, then the configured default.
fn defaults<'a>(
    container: &'a ServiceContainer,
    target: &'a ServiceArgs,
) -> (Option<&'a str>, Option<&'a Path>) {
    let service = target
        .service
        .as_deref()
        .or(container.settings.service.as_deref());
    let file = target
        .file
        .as_deref()
        .or(container.settings.service_file.as_deref());
    (service, file)
}

#[instrument(skip(container))]
fn cmd_show(container: &ServiceContainer, target: &ServiceArgs, reveal: bool) -> CliResult<()> {
    let (service, file) = defaults(container, target);
    let svc = container.service_file_service();

    let identity = svc.resolve(service, file)?;
    let params = svc.lookup(&identity)?;

    output::header(&identity);
    if params.is_empty() {
        output::warning("no recognized connection parameters in this service");
    }
    for (key, value) in &params {
        let shown = if !reveal && key == ConnectionParam::Password.key() {
            MASK
        } else {
            value.as_str()
        };
        output::detail(&format!("{key}={shown}"));
    }
    Ok(())
}

/// Dry-run apply against a snapshot of the process environment and print
/// the resulting changes as shell statements.
///
/// The control variables are unset in the output even when the lookup
/// fails, so an `eval` leaves the shell in the same state `apply` would.
#[instrument(skip(container))]
fn cmd_env(container: &ServiceContainer, target: &ServiceArgs) -> CliResult<()> {
    let (service, file) = defaults(container, target);
    let snapshot = Arc::new(MemoryEnvironment::from_process());
    let svc = container.service_file_service_with_env(snapshot);

    let outcome = svc.apply(service, file);
    if let Ok(report) = &outcome {
        for param in &report.kept {
            output::warning(&format!("{} already set, keeping it", param.env_var()));
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(render_outcome(&outcome).as_bytes())
        .map_err(|e| InfraError::io("write exports", e))?;
    outcome?;
    Ok(())
}

fn render_outcome(outcome: &ApplicationResult<ApplyReport>) -> String {
    let mut script = String::new();
    if let Ok(report) = outcome {
        for (param, value) in &report.applied {
            script.push_str(&format!("export {}={}\n", param.env_var(), shell_quote(value)));
        }
    }
    script.push_str(&format!("unset {}\n", CONTROL_VARS.join(" ")));
    script
}

/// Single-quote a value for POSIX shells.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[instrument(skip(container))]
fn cmd_list(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let file = file.or(container.settings.service_file.as_deref());
    let svc = container.service_file_service();

    for name in svc.list_services(file)? {
        output::info(&name);
    }
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory available on this platform"),
        },
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
