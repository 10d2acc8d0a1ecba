/*
ASC_KEY_ID='key_id' ASC_ISSUER_ID='issuer_id' \
    cargo run -p asc-ci-client-cli --bin asc_ci_overview -- --product 'HeadshotAirBattle'
*/

use asc_ci_client::{report::or_na, Client, Selector};
use asc_ci_client_cli::{connect, init_tracing, print_error, yes_no};
use clap::Parser;

/// Check the API connection and summarise apps, Xcode Cloud products, repositories and workflows
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// CI product id or name whose workflows are listed; the first product when omitted
    #[arg(long)]
    product: Option<String>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let client = connect()?;

    println!("Connecting to App Store Connect API...");
    let apps = match client.list_apps(None) {
        Ok(apps) => apps,
        Err(err) => {
            print_error("listing apps", &err);
            return Ok(());
        }
    };

    println!("\nAPI connection successful.");
    println!("\nFound {} app(s):\n", apps.len());
    for app in &apps {
        let attrs = app.attrs();
        println!("  - Name: {}", or_na(attrs.name.as_deref()));
        println!("    Bundle ID: {}", or_na(attrs.bundle_id.as_deref()));
        println!("    SKU: {}", or_na(attrs.sku.as_deref()));
        println!("    App ID: {}", app.id);
        println!();
    }

    println!("\nChecking Xcode Cloud configuration...");
    let products = match client.list_ci_products() {
        Ok(products) => products,
        Err(err) => {
            print_error("getting CI products", &err);
            return Ok(());
        }
    };
    println!("\nXcode Cloud products: {}", products.len());
    for product in &products {
        let attrs = product.attrs();
        println!("  - Name: {}", or_na(attrs.name.as_deref()));
        println!("    Product Type: {}", or_na(attrs.product_type.as_deref()));
        println!("    Product ID: {}", product.id);
        println!();
    }

    print_repositories(&client);

    let selector = Selector::from_option(args.product);
    let product = match asc_ci_client::select::select(products, &selector, "CI product") {
        Ok(product) => product,
        Err(err) => {
            print_error("selecting CI product", &err);
            return Ok(());
        }
    };

    match client.list_workflows(&product.id, false) {
        Ok(workflows) if workflows.is_empty() => {
            println!("\nNo workflows found. You need to:");
            println!("   1. Connect your repository in App Store Connect");
            println!("   2. Create a workflow in Xcode or App Store Connect");
        }
        Ok(workflows) => {
            println!("\nWorkflows: {}", workflows.len());
            for workflow in &workflows {
                let attrs = workflow.attrs();
                println!("  - Name: {}", or_na(attrs.name.as_deref()));
                println!("    Description: {}", or_na(attrs.description.as_deref()));
                println!("    Enabled: {}", yes_no(attrs.is_enabled));
                println!("    Workflow ID: {}", workflow.id);
                println!();
            }
            println!("\nWorkflows are configured.");
        }
        Err(err) => print_error("getting workflows", &err),
    }

    Ok(())
}

fn print_repositories(client: &Client) {
    println!("\nChecking connected repositories...");
    match client.list_scm_repositories() {
        Ok(repositories) => {
            println!("\nConnected repositories: {}", repositories.len());
            for repository in &repositories {
                let attrs = repository.attrs();
                println!("  - URL: {}", or_na(attrs.http_clone_url.as_deref()));
                println!("    Owner: {}", or_na(attrs.owner_name.as_deref()));
                println!("    Repo ID: {}", repository.id);
                println!();
            }
        }
        Err(err) => print_error("getting repositories", &err),
    }
}
