/*
cargo run -p asc-ci-client-cli --bin asc_ci_connect_repo -- --repository 'HeadshotAirBattle-iOS'
*/

use asc_ci_client::{report::or_na, select::select, Error, Selector};
use asc_ci_client_cli::{connect, init_tracing, print_error, TargetArgs};
use clap::Parser;

/// Point a workflow at a connected source repository
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    /// Repository id or name
    #[arg(long, default_value = "HeadshotAirBattle-iOS")]
    repository: String,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let client = connect()?;

    let repositories = client.list_scm_repositories()?;
    println!("Connected repositories: {}", repositories.len());
    for repository in &repositories {
        let attrs = repository.attrs();
        println!(
            "  - {}/{} ({})",
            or_na(attrs.owner_name.as_deref()),
            or_na(attrs.repository_name.as_deref()),
            repository.id
        );
    }

    let repository = match select(
        repositories,
        &Selector::Match(args.repository.clone()),
        "repository",
    ) {
        Ok(repository) => repository,
        Err(Error::NotFound { .. }) => {
            print!("{}", setup_steps(&args.repository));
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let (_, workflow) = client.select_workflow(&args.target.product(), &args.target.workflow())?;
    println!(
        "\nConnecting workflow {} to repository {}...",
        or_na(workflow.attrs().name.as_deref()),
        or_na(repository.attrs().repository_name.as_deref())
    );

    match client.set_workflow_repository(&workflow.id, &repository.id) {
        Ok(updated) => {
            println!("Workflow updated.");
            println!(
                "   Repository: {}",
                or_na(updated.related_id("repository"))
            );
        }
        Err(err) => print_error("updating workflow", &err),
    }

    Ok(())
}

fn setup_steps(repository: &str) -> String {
    format!(
        "\nRepository {repository} is not connected to Xcode Cloud yet.\n\
         \nConnect it first:\n\
         \x20  1. Visit https://appstoreconnect.apple.com/\n\
         \x20  2. Go to your app > Xcode Cloud\n\
         \x20  3. Click 'Manage' or 'Settings'\n\
         \x20  4. Connect the {repository} repository\n"
    )
}
