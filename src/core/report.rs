use crate::domain::model::{CompanyResult, Outcome, RunMetadata};
use std::fmt::Write;
use std::time::Duration;

const RULE_WIDTH: usize = 60;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs_f64();
    let minutes = (total / 60.0).floor();
    format!("{} min {:.2} sec", minutes as u64, total - minutes * 60.0)
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One log line per company. Line breaks inside a description, a tag or an
/// error body are folded into spaces.
pub fn render_result_line(result: &CompanyResult) -> String {
    let company = &result.company;
    match &result.outcome {
        Outcome::Described(profile) => {
            let tags: Vec<String> = profile.tags.iter().map(|tag| single_line(tag)).collect();
            format!(
                "{}- {} - {} | [{}]",
                company.number,
                company.name,
                single_line(&profile.description),
                tags.join(", ")
            )
        }
        Outcome::Failed { error } => format!(
            "{}- {} - ERROR: {}",
            company.number,
            company.name,
            single_line(error)
        ),
    }
}

/// Renders the run log: the execution summary, then one section per country
/// in `countries` order. Results are expected in catalog order.
pub fn render_log(metadata: &RunMetadata, countries: &[String], results: &[CompanyResult]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "EXECUTION SUMMARY");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Start Time: {}", metadata.started_at.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "End Time: {}", metadata.finished_at.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "Total Duration: {}", format_duration(metadata.duration));
    let _ = writeln!(out, "Total Companies Processed: {}", metadata.total_companies);
    let _ = writeln!(out, "Model Used: {}", metadata.model);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out);

    let mut pending = results.iter().peekable();
    for country in countries {
        let _ = writeln!(out, "\n=== {} ===\n", country);
        while let Some(result) = pending.next_if(|r| &r.company.country == country) {
            let _ = writeln!(out, "{}\n", render_result_line(result));
        }
    }

    // Results whose country is not in the list still get written.
    let mut current: Option<&str> = None;
    for result in pending {
        if current != Some(result.company.country.as_str()) {
            current = Some(result.company.country.as_str());
            let _ = writeln!(out, "\n=== {} ===\n", result.company.country);
        }
        let _ = writeln!(out, "{}\n", render_result_line(result));
    }

    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSection {
    pub country: String,
    pub numbers: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLog {
    pub total_companies: Option<usize>,
    pub model: Option<String>,
    pub sections: Vec<ParsedSection>,
}

impl ParsedLog {
    pub fn country_names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.country.clone()).collect()
    }

    pub fn numbers(&self) -> Vec<usize> {
        self.sections.iter().flat_map(|s| s.numbers.iter().copied()).collect()
    }
}

/// Reads back the summary header, country sections and entry numbers of a
/// log produced by [`render_log`].
pub fn parse_log(text: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();

    for line in text.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("Total Companies Processed:") {
            parsed.total_companies = value.trim().parse().ok();
        } else if let Some(value) = line.strip_prefix("Model Used:") {
            parsed.model = Some(value.trim().to_string());
        } else if let Some(country) = line
            .strip_prefix("=== ")
            .and_then(|rest| rest.strip_suffix(" ==="))
        {
            parsed.sections.push(ParsedSection {
                country: country.to_string(),
                numbers: Vec::new(),
            });
        } else if let Some(section) = parsed.sections.last_mut() {
            if let Some(number) = line.split_once("- ").and_then(|(n, _)| n.parse().ok()) {
                section.numbers.push(number);
            }
        }
    }

    parsed
}
