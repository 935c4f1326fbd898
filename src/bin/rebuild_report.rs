use anyhow::Context;
use voice_batch::controllers::report::ReportController;
use voice_batch::infrastructure::config::{LogFormat, OutputConfig};
use voice_batch::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let output = OutputConfig::from_env().context("invalid output configuration")?;
    init_logging(LogFormat::from_env());

    let rows = ReportController::from_config(&output)
        .rebuild()
        .await
        .with_context(|| {
            format!(
                "could not rebuild {} from {}",
                output.report_path.display(),
                output.artifact_dir.display()
            )
        })?;

    tracing::info!(rows = rows, "Report rebuild finished");
    Ok(())
}
