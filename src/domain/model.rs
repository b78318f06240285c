use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest description kept from a model reply, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub country: String,
    /// Global sequence number, starting at 1 and increasing across countries.
    pub number: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySection {
    pub name: String,
    pub companies: Vec<Company>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub content: String,
    pub reason: String,
}

/// Countries and their companies, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCatalog {
    pub countries: Vec<CountrySection>,
    pub skipped: Vec<SkippedLine>,
}

impl CompanyCatalog {
    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        self.countries.iter().flat_map(|c| c.companies.iter())
    }

    pub fn company_count(&self) -> usize {
        self.countries.iter().map(|c| c.companies.len()).sum()
    }

    pub fn country_names(&self) -> Vec<String> {
        self.countries.iter().map(|c| c.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub description: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Described(CompanyProfile),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyResult {
    pub company: Company,
    pub outcome: Outcome,
}

impl CompanyResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Described(_))
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub countries: Vec<String>,
    pub results: Vec<CompanyResult>,
    pub model: String,
}

impl TransformResult {
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub duration: Duration,
    pub model: String,
    pub total_companies: usize,
}
