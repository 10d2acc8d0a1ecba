/*
cargo run -p asc-ci-client-cli --bin asc_ci_configure_testflight -- --bundle-id 'com.headshotairbattle'

Makes sure the workflow archives for App Store distribution and delivers the
result to TestFlight internal testers.
*/

use anyhow::bail;
use asc_ci_client::{
    ci::TESTFLIGHT_INTERNAL_TESTERS,
    report::or_na,
    resources::CiBuildActionAttributes,
};
use asc_ci_client_cli::{connect, init_tracing, print_error, TargetArgs};
use clap::Parser;

/// Add an archive action and TestFlight delivery to an Xcode Cloud workflow
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    #[arg(long, default_value = "com.headshotairbattle")]
    bundle_id: String,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let client = connect()?;

    let apps = client.list_apps(Some(&args.bundle_id))?;
    let Some(app) = apps.first() else {
        bail!("no app with bundle id {}", args.bundle_id);
    };
    println!(
        "App: {} ({})",
        or_na(app.attrs().name.as_deref()),
        app.id
    );

    let (_, workflow) = client.select_workflow(&args.target.product(), &args.target.workflow())?;
    println!(
        "Workflow: {} ({})\n",
        or_na(workflow.attrs().name.as_deref()),
        workflow.id
    );

    println!("Adding archive action...");
    let archive = CiBuildActionAttributes {
        name: Some("Archive - iOS".to_string()),
        action_type: Some("ARCHIVE".to_string()),
        platform: Some("IOS".to_string()),
        build_distribution_audience: Some("APP_STORE_ELIGIBLE".to_string()),
        is_required_to_pass: Some(true),
        ..Default::default()
    };
    let action_id = match client.create_build_action(&workflow.id, archive) {
        Ok(action) => {
            println!("Archive action created: {}", action.id);
            action.id
        }
        Err(err) => {
            print_error("creating archive action", &err);
            println!("\nFalling back to an existing action...");
            let existing = client.list_build_actions(&workflow.id)?;
            let Some(action) = existing.into_iter().next() else {
                bail!("workflow has no build actions");
            };
            println!(
                "Using action: {} ({})",
                or_na(action.attrs().name.as_deref()),
                action.id
            );
            action.id
        }
    };

    println!("\nAdding TestFlight delivery...");
    match client.create_test_destination(&workflow.id, TESTFLIGHT_INTERNAL_TESTERS) {
        Ok(destination) => println!("TestFlight delivery configured: {}", destination.id),
        Err(err) => {
            print_error("configuring TestFlight delivery", &err);
            println!("\nEnable it manually: App Store Connect > Xcode Cloud > workflow > Archive action ({action_id}) > TestFlight Internal Testing");
        }
    }

    Ok(())
}
