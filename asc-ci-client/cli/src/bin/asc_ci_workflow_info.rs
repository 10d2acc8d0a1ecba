/*
cargo run -p asc-ci-client-cli --bin asc_ci_workflow_info

Lists every connected repository, then every workflow of every CI product
together with its start branch and linked repository.
*/

use asc_ci_client::{report::or_na, Client};
use asc_ci_client_cli::{connect, init_tracing, print_error, yes_no};
use clap::Parser;

/// Show Xcode Cloud repositories and workflow configuration
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let _args = Args::parse();
    let client = connect()?;

    println!("Checking SCM repositories...\n");
    match client.list_scm_repositories() {
        Ok(repositories) => {
            for repository in &repositories {
                let attrs = repository.attrs();
                println!("Repository:");
                println!("   ID: {}", repository.id);
                println!("   Owner: {}", or_na(attrs.owner_name.as_deref()));
                println!("   Repository Name: {}", or_na(attrs.repository_name.as_deref()));
                println!("   URL: {}", or_na(attrs.http_clone_url.as_deref()));
                println!("   SSH URL: {}", or_na(attrs.ssh_clone_url.as_deref()));
                println!();
            }
        }
        Err(err) => print_error("getting repositories", &err),
    }

    println!("\nChecking workflow configuration...\n");
    let products = match client.list_ci_products() {
        Ok(products) => products,
        Err(err) => {
            print_error("getting CI products", &err);
            return Ok(());
        }
    };

    for product in &products {
        let workflows = match client.list_workflows(&product.id, true) {
            Ok(workflows) => workflows,
            Err(err) => {
                print_error("getting workflows", &err);
                continue;
            }
        };

        for workflow in &workflows {
            let attrs = workflow.attrs();
            println!("Workflow: {}", or_na(attrs.name.as_deref()));
            println!("   ID: {}", workflow.id);
            println!("   Description: {}", or_na(attrs.description.as_deref()));
            println!("   Enabled: {}", yes_no(attrs.is_enabled));
            println!("   Branch: {}", or_na(attrs.branch_name()));

            if let Some(repository_id) = workflow.related_id("repository") {
                println!("   Connected Repository ID: {repository_id}");
                print_repository(&client, repository_id);
            }
            println!();
        }
    }

    Ok(())
}

fn print_repository(client: &Client, repository_id: &str) {
    match client.get_scm_repository(repository_id) {
        Ok(repository) => {
            let attrs = repository.attrs();
            println!(
                "   Repository: {}/{}",
                or_na(attrs.owner_name.as_deref()),
                or_na(attrs.repository_name.as_deref())
            );
            println!("   Clone URL: {}", or_na(attrs.http_clone_url.as_deref()));
        }
        Err(err) => print_error("getting repository", &err),
    }
}
