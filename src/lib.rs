pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{gemini::GeminiClient, storage::LocalStorage};
pub use config::Settings;
pub use core::{etl::EtlEngine, pipeline::CompanyPipeline};
pub use utils::error::{InfosearchError, Result};
