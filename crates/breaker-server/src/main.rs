//! Demo host for the circuit-breaker metrics stream bundle
//!
//! Serves `/hystrix.stream` on the admin port (or the application port with
//! `--application-stream`) and a `/work` route guarded by a circuit breaker.

mod args;
mod demo;

use anyhow::Context;
use breaker_bundle::{
    Application, BaseConfiguration, BreakerStreamBundle, Configuration, RunningApplication,
    init_logging,
};
use clap::Parser;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = BaseConfiguration::load_from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    cli.apply(&mut config);
    init_logging(config.logging())?;

    let bundle = config.breaker_stream.to_builder().build()?;
    let mut app = Application::new("breaker-server")
        .add_bundle(BreakerStreamBundle::from_configuration(bundle));
    let mut environment = app.setup(&config)?;
    demo::register(&mut environment)?;

    let running = RunningApplication::bind(environment, config.server()).await?;
    tracing::info!(
        admin = %running.admin_addr(),
        application = %running.application_addr(),
        "breaker-server ready, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    tracing::info!("shutting down");
    running.shutdown().await?;
    Ok(())
}
