/*
cargo run -p asc-ci-client-cli --bin asc_ci_testflight_builds -- --limit 5
*/

use asc_ci_client::report::{or_na, short_timestamp};
use asc_ci_client_cli::{connect, init_tracing, print_error};
use clap::Parser;

/// List the most recently uploaded TestFlight builds
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value_t = 5)]
    limit: u32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let client = connect()?;

    println!("Checking TestFlight builds...\n");
    match client.list_builds(args.limit) {
        Ok(builds) if builds.is_empty() => println!("No builds uploaded yet."),
        Ok(builds) => {
            println!("Recent builds: {}\n", builds.len());
            for build in &builds {
                let attrs = build.attrs();
                println!("  - Version: {}", or_na(attrs.version.as_deref()));
                println!("    State: {}", or_na(attrs.processing_state.as_deref()));
                println!("    Uploaded: {}", short_timestamp(attrs.uploaded_date.as_deref()));
                if attrs.expired == Some(true) {
                    println!("    Expired");
                }
                println!();
            }
        }
        Err(err) => print_error("getting builds", &err),
    }

    Ok(())
}
