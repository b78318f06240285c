use crate::core::catalog::parse_catalog;
use crate::core::pacing::{call_with_retry, RateLimiter};
use crate::core::prompt::{build_prompt, parse_reply};
use crate::core::report::{format_duration, render_log};
use crate::core::{
    CompanyCatalog, CompanyResult, ConfigProvider, ContentGenerator, Outcome, Pipeline,
    RunMetadata, Storage, TransformResult,
};
use crate::utils::error::{InfosearchError, Result};

/// Reads the company list, describes each company through a
/// [`ContentGenerator`] and writes the run log.
pub struct CompanyPipeline<S: Storage, G: ContentGenerator, C: ConfigProvider> {
    storage: S,
    generator: G,
    config: C,
}

impl<S: Storage, G: ContentGenerator, C: ConfigProvider> CompanyPipeline<S, G, C> {
    pub fn new(storage: S, generator: G, config: C) -> Self {
        Self {
            storage,
            generator,
            config,
        }
    }

    async fn describe(&self, limiter: &RateLimiter, prompt: &str, label: &str) -> Result<Outcome> {
        let policy = &limiter.config().retry;
        let profile = call_with_retry(policy, label, |attempt| async move {
            if attempt > 1 {
                tracing::debug!("Attempt {} for {}", attempt, label);
            }
            let reply = self.generator.generate(prompt).await?;
            parse_reply(&reply)
        })
        .await?;

        Ok(Outcome::Described(profile))
    }
}

#[async_trait::async_trait]
impl<S: Storage, G: ContentGenerator, C: ConfigProvider> Pipeline for CompanyPipeline<S, G, C> {
    async fn extract(&self) -> Result<CompanyCatalog> {
        let path = self.config.input_file();
        tracing::debug!("Reading company list from: {}", path);

        let data = self.storage.read_file(path).await.map_err(|e| match e {
            InfosearchError::IoError(io) => InfosearchError::InputError {
                message: format!("{}: {}", path, io),
            },
            other => other,
        })?;
        let text = String::from_utf8(data).map_err(|e| InfosearchError::InputError {
            message: format!("{} is not valid UTF-8: {}", path, e),
        })?;

        let catalog = parse_catalog(&text);
        tracing::info!(
            "✅ Text file loaded: {} companies in {} countries ({} lines skipped)",
            catalog.company_count(),
            catalog.countries.len(),
            catalog.skipped.len()
        );
        Ok(catalog)
    }

    async fn transform(&self, catalog: CompanyCatalog) -> Result<TransformResult> {
        let total = catalog.company_count();
        let mut limiter = RateLimiter::new(self.config.rate_limit());
        tracing::info!(
            "⏱ Estimated total time: {}",
            format_duration(limiter.config().estimate(total))
        );

        let mut results = Vec::with_capacity(total);
        for company in catalog.companies() {
            tracing::info!(
                "Processing {}: Company {}/{} - {}",
                company.country,
                company.number,
                total,
                company.name
            );

            limiter.wait_turn().await;
            let prompt = build_prompt(company);
            let (outcome, rate_limited) =
                match self.describe(&limiter, &prompt, &company.name).await {
                    Ok(outcome) => (outcome, false),
                    Err(e) => {
                        tracing::warn!("⚠️ Recording failure for {}: {}", company.name, e);
                        let outcome = Outcome::Failed {
                            error: e.to_string(),
                        };
                        (outcome, e.is_rate_limited())
                    }
                };

            results.push(CompanyResult {
                company: company.clone(),
                outcome,
            });
            limiter.finish_call(total - results.len(), rate_limited).await;
        }

        let transformed = TransformResult {
            countries: catalog.country_names(),
            results,
            model: self.generator.model().to_string(),
        };
        if transformed.failed_count() > 0 {
            tracing::warn!(
                "⚠️ {} of {} companies could not be described",
                transformed.failed_count(),
                total
            );
        }
        Ok(transformed)
    }

    async fn load(&self, result: TransformResult, metadata: RunMetadata) -> Result<String> {
        let log = render_log(&metadata, &result.countries, &result.results);
        let output_path = self.config.output_path();

        tracing::debug!("Writing run log ({} bytes) to storage", log.len());
        self.storage.write_file(output_path, log.as_bytes()).await?;

        tracing::info!("✅ All responses saved to {}", output_path);
        Ok(output_path.to_string())
    }
}
