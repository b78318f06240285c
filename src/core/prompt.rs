use crate::domain::model::{Company, CompanyProfile, MAX_DESCRIPTION_CHARS};
use crate::utils::error::{InfosearchError, Result};

const QUOTES: &[char] = &['"', '\'', '“', '”', '`'];

pub fn build_prompt(company: &Company) -> String {
    format!(
        "Provide a concise, {max}-character description of {name} in {country}. \
         Include all relevant industry categories based on the company's activities. \
         Always use the latest information from reputable web sources. \
         The output must be exactly in this format, with nothing extra, no explanations, \
         no greetings, no filler:\n\n\
         \"{max}-character description\" | [Relevant categories]",
        max = MAX_DESCRIPTION_CHARS,
        name = company.name,
        country = company.country,
    )
}

/// Reads a `"description" | [Tag, Tag]` reply.
///
/// Replies without a `|` are kept whole as the description. Descriptions
/// longer than [`MAX_DESCRIPTION_CHARS`] are cut on a character boundary.
pub fn parse_reply(reply: &str) -> Result<CompanyProfile> {
    let text = reply.trim().trim_matches('`').trim();

    let head_end = text.rfind('[').unwrap_or(text.len());
    let (description, tags) = match text[..head_end].rfind('|') {
        Some(split) => (&text[..split], &text[split + 1..]),
        None => (text, ""),
    };

    let description = truncate_chars(&clean(description), MAX_DESCRIPTION_CHARS);
    if description.is_empty() {
        return Err(InfosearchError::MalformedResponseError {
            message: format!("reply has no description: {:?}", reply),
        });
    }

    Ok(CompanyProfile {
        description,
        tags: parse_tags(tags),
    })
}

/// Strips surrounding quotes and folds any run of whitespace, line breaks
/// included, into one space.
fn clean(value: &str) -> String {
    value
        .trim()
        .trim_matches(QUOTES)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_tags(value: &str) -> Vec<String> {
    let value = value.trim();
    let value = value.strip_prefix('[').unwrap_or(value);
    let value = value.strip_suffix(']').unwrap_or(value);

    value
        .split(',')
        .map(clean)
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((cut, _)) => value[..cut].trim_end().to_string(),
        None => value.to_string(),
    }
}
