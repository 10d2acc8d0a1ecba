/*
cargo run -p asc-ci-client-cli --bin asc_ci_usage -- --limit 10

Rough Xcode Cloud compute usage over the latest runs of a workflow.
*/

use asc_ci_client::report::{
    completion_label, or_na, short_timestamp, UsageSummary, MONTHLY_QUOTA_MINUTES,
};
use asc_ci_client_cli::{connect, init_tracing, print_error, TargetArgs};
use clap::Parser;

/// Estimate Xcode Cloud minutes spent by recent build runs
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    #[arg(long, default_value_t = 10)]
    limit: u32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let client = connect()?;

    let (_, workflow) = client.select_workflow(&args.target.product(), &args.target.workflow())?;
    println!(
        "Workflow: {}\n",
        or_na(workflow.attrs().name.as_deref())
    );

    let runs = match client.list_build_runs(&workflow.id, args.limit) {
        Ok(runs) => runs,
        Err(err) => {
            print_error("getting build runs", &err);
            return Ok(());
        }
    };

    println!("Recent build runs: {}\n", runs.len());
    for run in &runs {
        let attrs = run.attrs();
        let duration = attrs
            .duration_minutes()
            .map(|minutes| format!("{minutes:.1} min"))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "  #{:<5} {:<12} {:<10} started {}",
            attrs.number.map(|n| n.to_string()).unwrap_or_default(),
            completion_label(attrs.completion_status),
            duration,
            short_timestamp(attrs.started_date.as_deref())
        );
    }

    let summary = UsageSummary::from_runs(&runs);
    println!();
    println!("Succeeded: {}", summary.succeeded);
    println!("Failed: {}", summary.failed);
    println!("Other: {}", summary.other);
    println!("Total: {:.1} min", summary.total_minutes);
    println!(
        "Remaining of {MONTHLY_QUOTA_MINUTES:.0} min monthly quota: {:.1} min",
        summary.remaining_minutes()
    );

    Ok(())
}
