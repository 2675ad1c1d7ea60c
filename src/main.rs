use annotation_qa::AuditPipeline;
use annotation_qa::config::AuditConfig;
use annotation_qa::core_modules::image_fetcher::HttpImageFetcher;
use annotation_qa::error::{AuditError, ConfigError};
use annotation_qa::report::ReportWriter;
use annotation_qa::source::{JsonFileTaskSource, ScaleTaskSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AuditError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "annotation_qa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AuditConfig::from_env()?;
    tracing::info!(
        project = %config.project,
        output = %config.output_path.display(),
        "starting annotation audit"
    );

    let pipeline = AuditPipeline::with_default_checks();
    let fetcher = HttpImageFetcher::new();
    let mut report = ReportWriter::create(&config.output_path)?;

    let result = match (&config.tasks_file, &config.api_key) {
        (Some(path), _) => {
            let source = JsonFileTaskSource::new(path);
            pipeline.run(&source, &config.project, &fetcher, &mut report).await
        }
        (None, Some(api_key)) => {
            let source =
                ScaleTaskSource::new(config.api_url.clone(), api_key.clone(), config.page_size);
            pipeline.run(&source, &config.project, &fetcher, &mut report).await
        }
        (None, None) => Err(ConfigError::Missing("SCALE_API_KEY").into()),
    };

    // Flush whatever was written, even when the run failed part-way.
    let rows = report.rows_written();
    report.finish()?;
    let summary = result?;

    tracing::info!(
        tasks = summary.tasks_seen,
        incomplete = summary.tasks_incomplete,
        skipped = summary.tasks_skipped,
        annotations = summary.annotations_checked,
        findings = summary.findings,
        rows,
        "audit finished"
    );
    Ok(())
}
