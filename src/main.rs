use tokio_util::sync::CancellationToken;
use voice_batch::controllers::batch::BatchController;
use voice_batch::infrastructure::config::Config;
use voice_batch::infrastructure::logging::init_logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run());
    // A confirmation prompt abandoned on Ctrl-C is still blocked on stdin
    runtime.shutdown_background();
    result
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(config.log_format);

    tracing::info!(
        backend = ?config.backend,
        endpoint = %config.endpoint_base,
        policy = %config.retry_policy,
        artifact_dir = %config.output.artifact_dir.display(),
        report = %config.output.report_path.display(),
        "Starting voice batch"
    );

    // Stop before the next voice on Ctrl-C; collected outcomes are still reported
    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current voice");
            signal_token.cancel();
        }
    });

    let controller = BatchController::from_config(&config, cancel_token)?;

    match controller.run().await {
        Ok(summary) => {
            tracing::info!(
                saved = summary.saved_count(),
                failed = summary.failed_count(),
                skipped_existing = summary.skipped_existing,
                stopped = ?summary.stopped.as_ref().map(|reason| reason.to_string()),
                "Processing finished"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, setup = e.is_setup_error(), "Voice batch failed");
            Err(e.into())
        }
    }
}
