//! Tekhub CLI - install and manage Tekton Hub resources

use clap::{Args, Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tekhub_core::{FallbackOrdering, Operation, ResourceKind};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod error;
mod exit_codes;

use commands::versions::OutputFormat;
use context::Context;
use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "tekhub")]
#[command(version)]
#[command(about = "Install and manage Tekton Hub resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Hub API server URL
    #[arg(long, global = true, env = "TEKHUB_API_SERVER")]
    api_server: Option<String>,

    /// Target namespace (default: current kubeconfig namespace)
    #[arg(short, long, global = true, env = "TEKHUB_NAMESPACE")]
    namespace: Option<String>,

    /// Ordering of non-numeric versions (lexical or input-order)
    #[arg(long, global = true, env = "TEKHUB_VERSION_ORDERING", value_parser = parse_ordering)]
    version_ordering: Option<FallbackOrdering>,

    /// Config file (default: <config dir>/tekhub/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

/// A Tekton resource on the command line
#[derive(Args)]
struct ResourceArgs {
    /// Resource kind (task or pipeline)
    #[arg(value_parser = parse_kind)]
    kind: ResourceKind,

    /// Resource name
    name: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a resource that is not yet in the namespace
    Install {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Catalog to install from
        #[arg(long)]
        from: Option<String>,

        /// Version to install (default: latest)
        #[arg(long)]
        version: Option<String>,
    },

    /// Upgrade an installed resource to a newer version
    Upgrade {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Version to upgrade to (default: latest)
        #[arg(long)]
        version: Option<String>,
    },

    /// Downgrade an installed resource to an older version
    Downgrade {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Version to downgrade to (default: latest)
        #[arg(long)]
        version: Option<String>,
    },

    /// Reinstall a resource, overwriting whatever is installed
    Reinstall {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Catalog to install from (default: the installed one)
        #[arg(long)]
        from: Option<String>,

        /// Version to install (default: the installed one)
        #[arg(long)]
        version: Option<String>,
    },

    /// Print the manifest of a resource
    Get {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Catalog to read from
        #[arg(long)]
        from: Option<String>,

        /// Version to print (default: latest)
        #[arg(long)]
        version: Option<String>,
    },

    /// List the versions of a resource, latest first
    Versions {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Catalog to read from
        #[arg(long)]
        from: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
}

fn parse_kind(s: &str) -> std::result::Result<ResourceKind, String> {
    s.parse().map_err(|e: tekhub_core::CoreError| e.to_string())
}

fn parse_ordering(s: &str) -> std::result::Result<FallbackOrdering, String> {
    s.parse().map_err(|e: tekhub_core::CoreError| e.to_string())
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", style("Error:").red().bold(), err);
            err.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let GlobalArgs {
        api_server,
        namespace,
        version_ordering,
        config,
        ..
    } = cli.global;
    let ctx = Context::load(config.as_deref(), api_server.as_deref(), namespace)?
        .with_version_ordering(version_ordering);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(e.to_string()))?;

    runtime.block_on(async {
        match cli.command {
            Commands::Install {
                resource,
                from,
                version,
            } => {
                commands::lifecycle::run(
                    &ctx,
                    Operation::Install,
                    resource.kind,
                    &resource.name,
                    from.as_deref(),
                    version.as_deref(),
                )
                .await
            }

            Commands::Upgrade { resource, version } => {
                commands::lifecycle::run(
                    &ctx,
                    Operation::Upgrade,
                    resource.kind,
                    &resource.name,
                    None,
                    version.as_deref(),
                )
                .await
            }

            Commands::Downgrade { resource, version } => {
                commands::lifecycle::run(
                    &ctx,
                    Operation::Downgrade,
                    resource.kind,
                    &resource.name,
                    None,
                    version.as_deref(),
                )
                .await
            }

            Commands::Reinstall {
                resource,
                from,
                version,
            } => {
                commands::lifecycle::run(
                    &ctx,
                    Operation::Reinstall,
                    resource.kind,
                    &resource.name,
                    from.as_deref(),
                    version.as_deref(),
                )
                .await
            }

            Commands::Get {
                resource,
                from,
                version,
            } => {
                commands::get::run(
                    &ctx,
                    resource.kind,
                    &resource.name,
                    from.as_deref(),
                    version.as_deref(),
                )
                .await
            }

            Commands::Versions {
                resource,
                from,
                output,
            } => {
                commands::versions::run(&ctx, resource.kind, &resource.name, from.as_deref(), output)
                    .await
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install() {
        let cli = Cli::try_parse_from([
            "tekhub", "install", "task", "foo", "--from", "tekton", "--version", "0.3", "-n", "hub",
        ])
        .unwrap();
        assert_eq!(cli.global.namespace.as_deref(), Some("hub"));
        match cli.command {
            Commands::Install {
                resource,
                from,
                version,
            } => {
                assert_eq!(resource.kind, ResourceKind::Task);
                assert_eq!(resource.name, "foo");
                assert_eq!(from.as_deref(), Some("tekton"));
                assert_eq!(version.as_deref(), Some("0.3"));
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_upgrade_has_no_from() {
        assert!(Cli::try_parse_from(["tekhub", "upgrade", "task", "foo", "--from", "tekton"]).is_err());
    }

    #[test]
    fn test_version_ordering_flag() {
        let cli = Cli::try_parse_from([
            "tekhub", "versions", "task", "foo", "--version-ordering", "input-order",
        ])
        .unwrap();
        assert_eq!(cli.global.version_ordering, Some(FallbackOrdering::InputOrder));

        let err = Cli::try_parse_from([
            "tekhub", "versions", "task", "foo", "--version-ordering", "semver",
        ])
        .err()
        .unwrap();
        assert!(err.to_string().contains("Unknown version ordering: semver"));
    }

    #[test]
    fn test_unknown_kind() {
        assert!(Cli::try_parse_from(["tekhub", "install", "stepaction", "foo"]).is_err());
    }
}
