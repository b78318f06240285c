pub mod catalog;
pub mod etl;
pub mod pacing;
pub mod pipeline;
pub mod prompt;
pub mod report;

pub use crate::domain::model::{
    Company, CompanyCatalog, CompanyProfile, CompanyResult, Outcome, RunMetadata, TransformResult,
};
pub use crate::domain::ports::{ConfigProvider, ContentGenerator, Pipeline, Storage};
pub use crate::utils::error::Result;
