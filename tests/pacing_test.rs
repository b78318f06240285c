//! Pacing arithmetic of the request loop, checked on tokio's paused clock.

use async_trait::async_trait;
use company_infosearcher::core::pacing::RateLimitConfig;
use company_infosearcher::core::{ContentGenerator, Storage};
use company_infosearcher::{CompanyPipeline, EtlEngine, InfosearchError, Result, Settings};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    fn with_file(path: &str, content: String) -> Self {
        let storage = Self::default();
        storage
            .files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.into_bytes());
        storage
    }

    fn read_string(&self, path: &str) -> String {
        let files = self.files.lock().unwrap();
        String::from_utf8(files.get(path).cloned().unwrap_or_default()).unwrap()
    }
}

impl Storage for MemoryStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().unwrap();
        files.get(path).cloned().ok_or_else(|| {
            InfosearchError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.to_string(),
            ))
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

/// Fails the first `failures` calls with a 503, then always answers.
struct CountingGenerator {
    failures: usize,
    calls: AtomicUsize,
}

impl CountingGenerator {
    fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ContentGenerator for CountingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(InfosearchError::ApiStatusError {
                status: 503,
                message: "overloaded".to_string(),
            });
        }
        Ok("\"Described.\" | [Tag]".to_string())
    }

    fn model(&self) -> &str {
        "paced-model"
    }
}

/// Answers every company except `limited`, which always gets a 429.
struct QuotaGenerator {
    limited: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl ContentGenerator for QuotaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.contains(self.limited) {
            return Err(InfosearchError::RateLimitedError {
                message: "Quota exceeded".to_string(),
            });
        }
        Ok("\"Described.\" | [Tag]".to_string())
    }

    fn model(&self) -> &str {
        "paced-model"
    }
}

fn input(countries: usize, per_country: usize) -> String {
    let mut text = String::new();
    for c in 0..countries {
        text.push_str(&format!("Country {}:\n", c + 1));
        for n in 0..per_country {
            text.push_str(&format!("{}- Company {}-{}\n", n + 1, c + 1, n + 1));
        }
        text.push('\n');
    }
    text
}

fn settings(rate_limit: RateLimitConfig) -> Settings {
    let mut settings = Settings::new("companies.txt".to_string());
    settings.output_path = "gemini_log.txt".to_string();
    settings.model = "paced-model".to_string();
    settings.rate_limit = rate_limit;
    settings
}

fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + Duration::from_millis(50),
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

#[tokio::test(start_paused = true)]
async fn test_default_pacing_across_countries() {
    let storage = MemoryStorage::with_file("companies.txt", input(3, 10));
    let generator = CountingGenerator::new(0);
    let engine = EtlEngine::new(CompanyPipeline::new(
        storage.clone(),
        generator,
        settings(RateLimitConfig::default()),
    ));

    let report = engine.run().await.unwrap();

    // 30 companies -> 29 gaps; pause after call 15 -> 28 x 2s + 1 x 60s
    assert_eq!(report.total_companies, 30);
    assert_close(report.metadata.duration, Duration::from_secs(28 * 2 + 60));
    assert!(storage.read_string("gemini_log.txt").contains("Total Companies Processed: 30"));
}

#[tokio::test(start_paused = true)]
async fn test_pause_after_every_full_window() {
    let storage = MemoryStorage::with_file("companies.txt", input(1, 31));
    let engine = EtlEngine::new(CompanyPipeline::new(
        storage,
        CountingGenerator::new(0),
        settings(RateLimitConfig::default()),
    ));

    let report = engine.run().await.unwrap();

    // 31 companies -> 30 gaps; pauses after calls 15 and 30 -> 28 x 2s + 2 x 60s
    assert_eq!(report.total_companies, 31);
    assert_close(report.metadata.duration, Duration::from_secs(28 * 2 + 2 * 60));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_adds_to_pacing() {
    let storage = MemoryStorage::with_file("companies.txt", input(1, 2));
    let engine = EtlEngine::new(CompanyPipeline::new(
        storage.clone(),
        CountingGenerator::new(2),
        settings(RateLimitConfig::default()),
    ));

    let report = engine.run().await.unwrap();

    // company 1: 5s + 10s backoff before the third attempt succeeds; then a 2s delay
    assert_eq!(report.failed_companies, 0);
    assert_close(report.metadata.duration, Duration::from_secs(5 + 10 + 2));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_company_triggers_quota_pause() {
    let storage = MemoryStorage::with_file("companies.txt", input(1, 5));
    let generator = QuotaGenerator {
        limited: "Company 1-2 ",
        calls: AtomicUsize::new(0),
    };
    let engine = EtlEngine::new(CompanyPipeline::new(
        storage.clone(),
        generator,
        settings(RateLimitConfig::default()),
    ));

    let report = engine.run().await.unwrap();

    // delay 2s, company 2 spends 5s + 10s retrying and then pauses 60s,
    // the remaining three follow 2s apart from the restarted window
    assert_eq!(report.failed_companies, 1);
    assert_close(report.metadata.duration, Duration::from_secs(2 + 15 + 60 + 2 + 2));

    let log = storage.read_string("gemini_log.txt");
    assert!(log.contains("2- Company 1-2 - ERROR: Rate limit exceeded (429): Quota exceeded"));
    assert!(log.contains("5- Company 1-5 - Described. | [Tag]"));
}

#[test]
fn test_estimate_adds_request_time_to_pacing() {
    let config = RateLimitConfig::default();
    // the estimate adds 1.5s per request on top of the pacing
    let estimate = config.estimate(31);
    assert_eq!(
        estimate,
        Duration::from_millis(1500) * 31 + Duration::from_secs(28 * 2 + 2 * 60)
    );
}
