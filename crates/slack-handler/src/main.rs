//! sensu-slack-handler - post a Sensu event to a Slack channel.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use slack_handler::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let invocation = cli::parse();

    // stdout belongs to the pipeline; log to stderr
    let directives = invocation
        .cli
        .log_directives(std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| EnvFilter::new(invocation.cli.log_directives(None)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    slack_handler::run(std::io::stdin().lock(), &invocation.flags, |key| {
        std::env::var(key).ok()
    })
    .await
    .context("error executing handler")?;

    Ok(())
}
