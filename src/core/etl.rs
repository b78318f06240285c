use crate::core::report::format_duration;
use crate::core::{Pipeline, RunMetadata};
use crate::utils::error::Result;
use chrono::Local;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub total_companies: usize,
    pub failed_companies: usize,
    pub metadata: RunMetadata,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Local::now();
        let clock = Instant::now();
        tracing::info!("🚀 Starting run at {}", started_at.format("%Y-%m-%d %H:%M:%S"));

        // Extract
        let catalog = self.pipeline.extract().await?;

        // Transform
        let transformed = self.pipeline.transform(catalog).await?;
        let total_companies = transformed.results.len();
        let failed_companies = transformed.failed_count();

        let metadata = RunMetadata {
            started_at,
            finished_at: Local::now(),
            duration: clock.elapsed(),
            model: transformed.model.clone(),
            total_companies,
        };
        tracing::info!("⏱ Total execution time: {}", format_duration(metadata.duration));

        // Load
        let output_path = self.pipeline.load(transformed, metadata.clone()).await?;

        Ok(RunReport {
            output_path,
            total_companies,
            failed_companies,
            metadata,
        })
    }
}
