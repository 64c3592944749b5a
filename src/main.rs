use archgen::{CliArgs, LoggingConfig, RunSettings, init_logging, model_schema, run_batch};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    if cli.print_schema {
        println!("{}", model_schema()?);
        return Ok(());
    }

    let settings = RunSettings::from_args(cli)?;

    // Validate configuration before the first run is scheduled (fail-fast)
    settings.validate()?;

    let summary = run_batch(settings.generator, settings.batch).await?;
    for outcome in &summary.succeeded {
        println!("{}", outcome.model_file.display());
    }
    Ok(())
}
