/*
cargo run -p asc-ci-token-cli --bin asc_ci_token_gen -- 'key_id' '/path/AuthKey_xxx.p8' 'issuer_id'

Or

cargo install asc-ci-token-cli
asc_ci_token_gen 'key_id' '/path/AuthKey_xxx.p8' 'issuer_id' --ttl 600 --scope 'GET /v1/apps'
*/

use std::{path::PathBuf, time::Duration};

use asc_ci_token::{Issuer, SigningKey, EXPIRATION_TIME_DURATION_SECONDS_MAX_FOR_MOST_REQUESTS};
use clap::Parser;

/// Print a freshly signed App Store Connect API token
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    key_id: String,
    auth_key_path: PathBuf,
    issuer_id: String,

    /// Token lifetime in seconds
    #[arg(long, default_value_t = EXPIRATION_TIME_DURATION_SECONDS_MAX_FOR_MOST_REQUESTS)]
    ttl: u64,

    /// Restrict the token to a request, e.g. 'GET /v1/apps'. Repeatable.
    #[arg(long)]
    scope: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let key = SigningKey::from_file(&args.auth_key_path)?;

    let mut issuer =
        Issuer::new(&args.key_id, &args.issuer_id, key).with_validity(Duration::from_secs(args.ttl));
    if !args.scope.is_empty() {
        issuer = issuer.with_scope(args.scope.iter().map(|s| s.as_str().into()).collect());
    }

    let credential = issuer.issue()?;

    println!("{}", credential.as_str());

    Ok(())
}
