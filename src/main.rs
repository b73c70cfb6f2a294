//! ghdeploy - Entry Point
//!
//! Create, watch and list deployments through the GitHub Deployments API.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ghdeploy::commands;
use ghdeploy::config::Context;
use ghdeploy::deploy::creator;
use ghdeploy::errors::GhdeployError;
use ghdeploy::models::deployment::DeploymentState;
use ghdeploy::output;

#[derive(Parser)]
#[command(name = "ghdeploy")]
#[command(about = "Create, watch and list GitHub deployments")]
#[command(version)]
struct Cli {
    /// Repository to operate on, e.g. acme/widget (default: detected from
    /// git remotes)
    #[arg(short, long, global = true, env = "GITHUB_REPOSITORY")]
    repo: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new deployment and watch it to completion
    Deploy {
        /// Revision to deploy (default: the checked-out HEAD)
        #[arg(short = 'R', long = "ref", env = "GITHUB_SHA")]
        git_ref: Option<String>,

        /// Target environment (prompted for when omitted)
        #[arg(short, long)]
        environment: Option<String>,

        /// Logical deployment task
        #[arg(short = 'T', long, default_value = creator::DEFAULT_TASK)]
        task: String,

        /// Mark the environment as transient
        #[arg(short, long)]
        transient: bool,

        /// Mark the environment as production
        #[arg(short, long, conflicts_with = "no_production")]
        production: bool,

        /// Mark the environment as non-production
        #[arg(long)]
        no_production: bool,

        /// Deployment description (default: the ref's commit subject)
        #[arg(short, long)]
        description: Option<String>,

        /// Skip the remote required-context checks
        #[arg(short = 'C', long)]
        no_check_constraints: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Seconds between status polls
        #[arg(long, default_value_t = 5)]
        poll_interval: u64,

        /// Overall seconds to wait for a terminal state
        #[arg(long, default_value_t = 900)]
        timeout: u64,
    },

    /// Show the status history of one deployment
    Inspect {
        /// Deployment ID
        deployment_id: u64,
    },

    /// List recent deployments
    List {
        /// How many deployments to list
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Filter by environment
        #[arg(short, long)]
        environment: Option<String>,

        /// Also fetch each deployment's latest status (slow)
        #[arg(short, long)]
        verbose: bool,

        /// Maximum simultaneous status fetches
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },

    /// Set the state of a deployment in an environment
    SetState {
        /// Deployment ID
        #[arg(short, long)]
        deployment_id: u64,

        /// Environment name
        #[arg(short, long)]
        environment: String,

        /// New state (queued, pending, in_progress, success, failure,
        /// error, inactive)
        state: DeploymentState,

        /// Status description
        #[arg(short = 'D', long, default_value = "Deployed via ghdeploy")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, GhdeployError> {
    let context = Context::resolve(cli.repo).await?;

    match cli.command {
        Commands::Deploy {
            git_ref,
            environment,
            task,
            transient,
            production,
            no_production,
            description,
            no_check_constraints,
            yes,
            poll_interval,
            timeout,
        } => {
            let production = if production {
                Some(true)
            } else if no_production {
                Some(false)
            } else {
                None
            };

            commands::deploy::run(
                context,
                commands::deploy::DeployArgs {
                    git_ref,
                    environment,
                    task,
                    transient,
                    production,
                    description,
                    check_constraints: !no_check_constraints,
                    yes,
                    poll_interval: Duration::from_secs(poll_interval),
                    timeout: Duration::from_secs(timeout),
                },
            )
            .await
        }

        Commands::Inspect { deployment_id } => {
            commands::inspect::run(context, deployment_id).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::List {
            limit,
            environment,
            verbose,
            concurrency,
        } => {
            commands::list::run(context, limit, environment, verbose, concurrency).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::SetState {
            deployment_id,
            environment,
            state,
            description,
        } => {
            commands::set_state::run(context, deployment_id, environment, state, description)
                .await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
