use clap::Parser;
use gnmi_set_server::{build_service, logging, Cli};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.resolve()?;
    logging::init(&cfg.log)?;

    tracing::info!(
        delete_mode = ?cfg.handler.delete_mode,
        validation_failure_code = %cfg.handler.validation_failure_code,
        strict_origin = cfg.handler.strict_origin,
        "gnmi-set-server starting"
    );

    let (service, _cache) = build_service(&cfg)?;
    let handled = service
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    tracing::info!(handled, "input closed, shutting down");
    Ok(())
}
