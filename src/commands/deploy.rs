//! Implementation of the `deploy` command

use std::process::ExitCode;
use std::time::Duration;

use crate::config::{self, Context};
use crate::deploy::creator::{self, CreateSpec};
use crate::deploy::poller::{self, PollOutcome, PollerSettings};
use crate::errors::GhdeployError;
use crate::git;
use crate::http::client::ApiClient;
use crate::http::deployments::DeploymentsApi;
use crate::models::deployment::DeploymentState;
use crate::output;

/// Operator input for the `deploy` command, before defaults are resolved
#[derive(Debug, Clone)]
pub struct DeployArgs {
    pub git_ref: Option<String>,
    pub environment: Option<String>,
    pub task: String,
    pub transient: bool,
    pub production: Option<bool>,
    pub description: Option<String>,
    pub check_constraints: bool,
    pub yes: bool,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

pub async fn run(context: Context, args: DeployArgs) -> Result<ExitCode, GhdeployError> {
    let git_ref = match args.git_ref {
        Some(git_ref) => git_ref,
        None => git::head_rev().await.ok_or_else(|| GhdeployError::Validation {
            field: "ref",
            message: "not given and HEAD could not be resolved".into(),
        })?,
    };

    let environment = match args.environment {
        Some(environment) => environment,
        None if args.yes => {
            return Err(GhdeployError::Validation {
                field: "environment",
                message: "required with --yes".into(),
            });
        }
        None => output::prompt("Environment", None)?,
    };

    let production = match args.production {
        Some(production) => production,
        None => config::is_production_environment(&environment),
    };

    let description = match args.description {
        Some(description) => description,
        None => git::commit_subject(&git_ref)
            .await
            .unwrap_or_else(|| "Deployed via ghdeploy".to_string()),
    };

    let spec = CreateSpec {
        git_ref,
        environment,
        task: args.task,
        transient: args.transient,
        production,
        description,
        required_contexts: CreateSpec::contexts_for(args.check_constraints),
    };

    let api = ApiClient::new(&context)?;

    announce(&context, &spec).await;
    show_pending_commits(&api, &spec).await?;

    if !args.yes {
        println!();
        if !output::confirm("Start deployment?")? {
            output::print_info("Aborted");
            return Ok(ExitCode::SUCCESS);
        }
    }

    output::print_info("Creating deployment");
    let deployment = creator::create(&api, &spec).await?;
    println!("deployment_id={}", deployment.id);
    output::print_success(&format!("Deployment {} created", deployment.id));

    let settings = PollerSettings {
        interval: args.poll_interval,
        max_wait: args.timeout,
    };

    let mut last: Option<DeploymentState> = None;
    let report = poller::poll(&api, deployment.id, &settings, |state| {
        if last != Some(state) {
            println!("  {}", output::color_state(state));
            last = Some(state);
        }
    })
    .await?;

    Ok(match report.outcome {
        PollOutcome::Success => {
            output::print_success(&format!("Deployment {} succeeded", deployment.id));
            ExitCode::SUCCESS
        }
        PollOutcome::Inactive => {
            output::print_info(&format!("Deployment {} became inactive", deployment.id));
            ExitCode::SUCCESS
        }
        PollOutcome::Failure | PollOutcome::Error => {
            output::print_error(&format!(
                "Deployment {} ended in {}",
                deployment.id,
                match report.outcome {
                    PollOutcome::Failure => "failure",
                    _ => "error",
                }
            ));
            ExitCode::FAILURE
        }
        PollOutcome::TimedOut => {
            output::print_warning(&format!(
                "Deployment {} did not reach a terminal state within {}s; \
                 check later with: ghdeploy inspect {}",
                deployment.id,
                settings.max_wait.as_secs(),
                deployment.id
            ));
            ExitCode::FAILURE
        }
    })
}

async fn announce(context: &Context, spec: &CreateSpec) {
    let tags = git::commit_tags(&spec.git_ref).await;
    let tags = if tags.is_empty() {
        String::new()
    } else {
        format!(" ({})", tags.join(", "))
    };

    output::print_info(&format!(
        "{}@{}{} will be deployed to {}",
        context.repository,
        output::short_sha(&spec.git_ref),
        tags,
        spec.environment
    ));
    println!("  transient          {}", output::bool_str(Some(spec.transient)));
    println!("  production         {}", output::bool_str(Some(spec.production)));
    println!("  description        {}", spec.description);
}

/// Show the commits that would go out, based on the environment's most
/// recent deployment
async fn show_pending_commits<A>(api: &A, spec: &CreateSpec) -> Result<(), GhdeployError>
where
    A: DeploymentsApi + ?Sized,
{
    let recent = api
        .list_deployments(Some(&spec.environment), 1)
        .await?
        .into_iter()
        .next();

    println!();
    match recent {
        Some(recent) if recent.git_ref == spec.git_ref => {
            output::print_info("This commit is currently deployed");
        }
        Some(recent) => match git::log_range(&recent.git_ref, &spec.git_ref).await {
            Some(log) => {
                for line in log {
                    println!("{}", line);
                }
            }
            None => output::print_info("Commit list not available locally"),
        },
        None => {
            output::print_info("First deployment to this environment, not showing the commit list");
        }
    }
    Ok(())
}
