use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};

pub mod arn;
pub mod config;
pub mod outputs;
pub mod params;
pub mod policy;
pub mod stacks;
pub mod template;
pub mod wiring;
pub mod writer;

use params::Unit;

#[derive(Parser, Debug)]
#[command(
    name = "cross-account-roles",
    version,
    about = "Synthesize the IAM stacks that let a CI user in a tools account deploy into a target account"
)]
struct Cli {
    /// Log debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum UnitArg {
    TargetAccount,
    ToolsAccount,
}

impl From<UnitArg> for Unit {
    fn from(unit: UnitArg) -> Self {
        return match unit {
            UnitArg::TargetAccount => Unit::TargetAccount,
            UnitArg::ToolsAccount => Unit::ToolsAccount,
        };
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a unit's parameter file and write its CloudFormation template
    Synth {
        #[arg(value_enum)]
        unit: UnitArg,

        /// Parameter file, defaults to `<unit>/src/cdk-stack-param.json`
        #[arg(long = "params")]
        params: Option<PathBuf>,

        #[arg(long = "out-dir", default_value = "cdk.out")]
        out_dir: PathBuf,

        /// Print the template instead of writing it
        #[arg(long = "stdout")]
        stdout: bool,
    },

    /// Copy outputs of deployed stacks into parameter files
    Link {
        #[arg(long = "config", default_value = "./config.yaml")]
        config: PathBuf,
    },

    /// Check that both units' parameters reference each other
    CheckWiring {
        #[arg(long = "target-params")]
        target_params: Option<PathBuf>,

        #[arg(long = "tools-params")]
        tools_params: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_target(false).format_timestamp_secs().init();
}

fn parameter_path(unit: Unit, provided: Option<PathBuf>) -> PathBuf {
    return provided.unwrap_or_else(|| PathBuf::from(unit.default_parameter_file()));
}

fn synth(unit: Unit, params_path: &Path, out_dir: &Path, to_stdout: bool) -> Result<()> {
    info!("Resolving {} from {}", unit.parameter_key(), params_path.display());
    let resolved = params::resolve(unit, params_path)
        .with_context(|| format!("Invalid parameters in {}", params_path.display()))?;

    let stack = match unit {
        Unit::TargetAccount => stacks::target_account::synthesize(&resolved.value),
        Unit::ToolsAccount => stacks::tools_account::synthesize(&resolved.value),
    };
    debug!(
        "{} declares {} resources",
        stack.stack_name,
        stack.template.resources.len()
    );

    if to_stdout {
        println!("{}", stack.template.to_json()?);
        return Ok(());
    }

    writer::write_template(out_dir, &stack)?;
    return Ok(());
}

async fn link(config_path: &PathBuf) -> Result<()> {
    let config = config::parse(config_path)
        .with_context(|| format!("Unable to load {}", config_path.display()))?;

    let fetches = config.iter().map(|link_entry| async move {
        let stack = outputs::Stack::from_link(link_entry).await?;
        let output_key = link_entry.output_key.as_deref().unwrap_or_default();
        let value = stack.get_output_value(output_key).await?;
        Ok::<_, outputs::Error>((link_entry, value))
    });
    let resolved = futures::future::try_join_all(fetches).await?;

    // Written one at a time, several entries may target the same file.
    for (link_entry, value) in resolved {
        writer::update_parameter(
            &link_entry.parameters.location,
            link_entry.parameter_key.as_deref().unwrap_or_default(),
            &value,
        )?;
    }

    return Ok(());
}

fn check_wiring(target_params: &Path, tools_params: &Path) -> Result<()> {
    let trusted_user = params::resolve(Unit::TargetAccount, target_params)
        .with_context(|| format!("Invalid parameters in {}", target_params.display()))?;
    let assumed_role = params::resolve(Unit::ToolsAccount, tools_params)
        .with_context(|| format!("Invalid parameters in {}", tools_params.display()))?;

    let accounts = wiring::Accounts::from_env();

    let mismatches = wiring::check(&trusted_user, &assumed_role, &accounts);
    if !mismatches.is_empty() {
        for mismatch in &mismatches {
            log::error!("{}", mismatch);
        }
        bail!("{} wiring mismatch(es) between the two units", mismatches.len());
    }

    info!(
        "{} trusts {}, which may assume {}",
        stacks::CROSS_ACCOUNT_ROLE_NAME,
        trusted_user.value,
        assumed_role.value
    );
    return Ok(());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    return match cli.command {
        Command::Synth {
            unit,
            params,
            out_dir,
            stdout,
        } => {
            let unit = Unit::from(unit);
            synth(unit, &parameter_path(unit, params), &out_dir, stdout)
        }
        Command::Link { config } => link(&config).await,
        Command::CheckWiring {
            target_params,
            tools_params,
        } => check_wiring(
            &parameter_path(Unit::TargetAccount, target_params),
            &parameter_path(Unit::ToolsAccount, tools_params),
        ),
    };
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, UnitArg};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_synth_defaults() {
        let cli = Cli::parse_from(["cross-account-roles", "synth", "tools-account"]);
        match cli.command {
            Command::Synth {
                unit,
                params,
                out_dir,
                stdout,
            } => {
                assert!(matches!(unit, UnitArg::ToolsAccount));
                assert_eq!(params, None);
                assert_eq!(out_dir, std::path::PathBuf::from("cdk.out"));
                assert_eq!(stdout, false);
            }
            _ => panic!("Expected `Synth` command"),
        }
    }

    #[test]
    fn rejects_unknown_unit() {
        let result = Cli::try_parse_from(["cross-account-roles", "synth", "other-account"]);
        assert_eq!(true, result.is_err());
    }
}
