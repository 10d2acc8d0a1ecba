/*
cargo run -p asc-ci-client-cli --bin asc_ci_workflow_actions -- --workflow 'Default'
*/

use asc_ci_client::report::{completion_label, or_na};
use asc_ci_client_cli::{connect, init_tracing, print_error, yes_no, TargetArgs};
use clap::Parser;

/// List the build actions of a workflow
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let client = connect()?;

    let (_, workflow) = client.select_workflow(&args.target.product(), &args.target.workflow())?;
    println!(
        "Workflow: {} ({})\n",
        or_na(workflow.attrs().name.as_deref()),
        workflow.id
    );

    let actions = match client.list_build_actions(&workflow.id) {
        Ok(actions) => actions,
        Err(err) => {
            print_error("getting build actions", &err);
            return Ok(());
        }
    };

    println!("Build actions: {}\n", actions.len());
    for action in &actions {
        let attrs = action.attrs();
        println!("  - Name: {}", or_na(attrs.name.as_deref()));
        println!("    Type: {}", or_na(attrs.action_type.as_deref()));
        println!("    Platform: {}", or_na(attrs.platform.as_deref()));
        println!(
            "    Distribution: {}",
            or_na(attrs.build_distribution_audience.as_deref())
        );
        println!("    Required to pass: {}", yes_no(attrs.is_required_to_pass));
        println!("    Last status: {}", completion_label(attrs.completion_status));
        println!("    Action ID: {}", action.id);
        println!();
    }

    let archives = actions
        .iter()
        .any(|action| action.attrs().action_type.as_deref() == Some("ARCHIVE"));
    if !archives {
        println!("No archive action. TestFlight needs one:");
        println!("   run asc_ci_configure_testflight, or add an Archive action in Xcode");
    }

    Ok(())
}
