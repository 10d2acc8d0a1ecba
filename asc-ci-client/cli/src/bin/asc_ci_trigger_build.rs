/*
cargo run -p asc-ci-client-cli --bin asc_ci_trigger_build
cargo run -p asc-ci-client-cli --bin asc_ci_trigger_build -- --trigger
cargo run -p asc-ci-client-cli --bin asc_ci_trigger_build -- --trigger --branch 'main'
*/

use anyhow::Context as _;
use asc_ci_client::{
    ci::{CiProduct, CiWorkflow},
    report::{completion_label, or_na, progress_label, short_timestamp},
    Client,
};
use asc_ci_client_cli::{connect, init_tracing, print_error, TargetArgs};
use clap::Parser;

/// Show recent build runs of a workflow and optionally start a new one
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    /// Start a build run
    #[arg(long)]
    trigger: bool,

    /// Branch to build; the workflow's start condition decides when omitted
    #[arg(long, requires = "trigger")]
    branch: Option<String>,

    #[arg(long, default_value_t = 5)]
    limit: u32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let client = connect()?;

    let (product, workflow) =
        client.select_workflow(&args.target.product(), &args.target.workflow())?;
    let attrs = workflow.attrs();
    println!("Workflow: {} ({})", or_na(attrs.name.as_deref()), workflow.id);
    println!("Branch: {}\n", or_na(attrs.branch_name()));

    match client.list_build_runs(&workflow.id, args.limit) {
        Ok(runs) if runs.is_empty() => println!("No build runs yet.\n"),
        Ok(runs) => {
            println!("Recent build runs:");
            for run in &runs {
                let attrs = run.attrs();
                println!(
                    "  #{} {} / {} (created {})",
                    attrs.number.map(|n| n.to_string()).unwrap_or_default(),
                    progress_label(attrs.execution_progress),
                    completion_label(attrs.completion_status),
                    short_timestamp(attrs.created_date.as_deref())
                );
            }
            println!();
        }
        Err(err) => print_error("getting build runs", &err),
    }

    if !args.trigger {
        println!("Pass --trigger to start a new build run.");
        return Ok(());
    }

    let git_reference_id = match args.branch.as_deref() {
        Some(branch) => Some(resolve_branch(&client, &product, &workflow, branch)?),
        None => None,
    };

    println!("Starting build run...");
    match client.start_build_run(&workflow.id, git_reference_id.as_deref()) {
        Ok(run) => {
            let attrs = run.attrs();
            println!("Build run started.");
            println!(
                "   Number: {}",
                attrs.number.map(|n| n.to_string()).unwrap_or_else(|| "N/A".to_string())
            );
            println!("   Build run ID: {}", run.id);
        }
        Err(err) => print_error("starting build run", &err),
    }

    Ok(())
}

// Git reference id of `branch` in the repository the workflow builds from.
fn resolve_branch(
    client: &Client,
    product: &CiProduct,
    workflow: &CiWorkflow,
    branch: &str,
) -> anyhow::Result<String> {
    let repository_id = client
        .list_workflows(&product.id, true)?
        .into_iter()
        .find(|candidate| candidate.id == workflow.id)
        .and_then(|candidate| candidate.related_id("repository").map(str::to_string))
        .context("workflow has no connected repository")?;

    let reference = client
        .find_git_reference(&repository_id, branch)
        .with_context(|| format!("resolving branch {branch:?}"))?;
    Ok(reference.id)
}
