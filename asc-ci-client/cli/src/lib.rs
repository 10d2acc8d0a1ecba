//! Plumbing shared by the `asc_ci_*` binaries: logging, client setup,
//! resource selection flags and Ctrl-C handling.

use anyhow::Context as _;
use asc_ci_client::{CancelFlag, Client, Config, Error, Selector};
use clap::Args;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr, `RUST_LOG` overrides the default `warn` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds a client from `ASC_*` environment variables.
pub fn connect() -> anyhow::Result<Client> {
    let config = Config::from_env().context("reading ASC_* configuration")?;
    Client::new(&config).context("setting up the App Store Connect client")
}

#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// CI product id or name; the first product when omitted
    #[arg(long)]
    pub product: Option<String>,

    /// Workflow id or name; the first workflow of the product when omitted
    #[arg(long)]
    pub workflow: Option<String>,
}

impl TargetArgs {
    pub fn product(&self) -> Selector {
        Selector::from_option(self.product.clone())
    }

    pub fn workflow(&self) -> Selector {
        Selector::from_option(self.workflow.clone())
    }
}

/// Prints a failed call the way the reports do: status line, then the body as received.
pub fn print_error(context: &str, err: &Error) {
    match err {
        Error::Api(api) => {
            println!("Error {context}: {}", api.status);
            println!("{}", api.body);
        }
        err => println!("Error {context}: {err}"),
    }
}

/// Flag that flips when the user presses Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancelFlag {
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_flag.cancel()) {
        warn!("Failed to set Ctrl-C handler: {err}");
    }
    cancel
}

pub fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "N/A",
    }
}
