/*
cargo run -p asc-ci-client-cli --bin asc_ci_watch_build
cargo run -p asc-ci-client-cli --bin asc_ci_watch_build -- --watch --interval 10 --until-complete
*/

use std::{ops::ControlFlow, time::Duration};

use asc_ci_client::{
    ci::CiWorkflow,
    report::{completion_label, latest_run_complete, or_na, progress_label, short_timestamp},
    Client, Error, PollOutcome, Poller,
};
use asc_ci_client_cli::{cancel_on_ctrl_c, connect, init_tracing, TargetArgs};
use clap::Parser;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Show the status of the latest build runs, once or repeatedly
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    /// Refresh until interrupted with Ctrl-C
    #[arg(long)]
    watch: bool,

    /// Seconds between refreshes
    #[arg(long, default_value_t = 10)]
    interval: u64,

    /// Stop watching once the latest run has completed
    #[arg(long, requires = "watch")]
    until_complete: bool,

    #[arg(long, default_value_t = 5)]
    limit: u32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let client = connect()?;

    let (_, workflow) = client.select_workflow(&args.target.product(), &args.target.workflow())?;

    if !args.watch {
        show(&client, &workflow, args.limit)?;
        return Ok(());
    }

    let poller = Poller::new(Duration::from_secs(args.interval), cancel_on_ctrl_c());
    let outcome = poller.run(|_| -> Result<ControlFlow<()>, Error> {
        print!("{CLEAR_SCREEN}");
        let complete = show(&client, &workflow, args.limit)?;
        println!("\nRefreshing every {}s, Ctrl-C to stop.", args.interval);
        if args.until_complete && complete {
            Ok(ControlFlow::Break(()))
        } else {
            Ok(ControlFlow::Continue(()))
        }
    })?;

    match outcome {
        PollOutcome::Finished { .. } => println!("\nLatest build run completed."),
        PollOutcome::Cancelled { .. } => println!("\nStopped."),
        PollOutcome::Exhausted { .. } => {}
    }

    Ok(())
}

// Prints the latest runs; true once the newest one has completed.
fn show(client: &Client, workflow: &CiWorkflow, limit: u32) -> Result<bool, Error> {
    let runs = client.list_build_runs(&workflow.id, limit)?;

    println!("Workflow: {}\n", or_na(workflow.attrs().name.as_deref()));
    if runs.is_empty() {
        println!("No build runs yet.");
        return Ok(false);
    }

    for run in &runs {
        let attrs = run.attrs();
        println!(
            "Build #{}",
            attrs.number.map(|n| n.to_string()).unwrap_or_default()
        );
        println!("   Progress: {}", progress_label(attrs.execution_progress));
        println!("   Status: {}", completion_label(attrs.completion_status));
        println!("   Started: {}", short_timestamp(attrs.started_date.as_deref()));
        println!("   Finished: {}", short_timestamp(attrs.finished_date.as_deref()));
        if let Some(minutes) = attrs.duration_minutes() {
            println!("   Duration: {minutes:.1} min");
        }
        println!();
    }

    Ok(latest_run_complete(&runs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["asc_ci_watch_build"]);
        assert!(!args.watch);
        assert_eq!(args.interval, 10);
        assert_eq!(args.limit, 5);
    }

    #[test]
    fn test_until_complete_requires_watch() {
        assert!(Args::try_parse_from(["asc_ci_watch_build", "--until-complete"]).is_err());
    }
}
