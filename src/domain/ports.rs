use crate::core::pacing::RateLimitConfig;
use crate::domain::model::{CompanyCatalog, RunMetadata, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn rate_limit(&self) -> RateLimitConfig;
}

/// A text-generation backend that answers one prompt per call.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
    fn model(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CompanyCatalog>;
    async fn transform(&self, catalog: CompanyCatalog) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult, metadata: RunMetadata) -> Result<String>;
}
