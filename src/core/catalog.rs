use crate::domain::model::{Company, CompanyCatalog, CountrySection, SkippedLine};
use regex::Regex;
use std::sync::LazyLock;

// "N-" at the start of a line, or " N- " further along it.
static ENTRY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)(\d+)-(\s*)").expect("entry marker regex is valid"));

/// Parses the country/company list.
///
/// Country headers end with `:`; company lines hold one or more `N- Name`
/// entries. Companies are renumbered globally in file order, so the numbers
/// written in the file only mark where an entry starts. Lines that cannot be
/// read are collected in [`CompanyCatalog::skipped`] instead of failing.
pub fn parse_catalog(text: &str) -> CompanyCatalog {
    let mut catalog = CompanyCatalog::default();
    let mut next_number = 1;

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_suffix(':') {
            let name = header.trim();
            if name.is_empty() {
                catalog.skipped.push(skipped(line_number, line, "country header without a name"));
            } else {
                catalog.countries.push(CountrySection {
                    name: name.to_string(),
                    companies: Vec::new(),
                });
            }
            continue;
        }

        let Some(section) = catalog.countries.last_mut() else {
            catalog.skipped.push(skipped(line_number, line, "company line before any country header"));
            continue;
        };

        let names = split_entries(line);
        if names.is_empty() {
            catalog.skipped.push(skipped(line_number, line, "no numbered company entry"));
            continue;
        }

        for name in names {
            section.companies.push(Company {
                country: section.name.clone(),
                number: next_number,
                name,
            });
            next_number += 1;
        }
    }

    for line in &catalog.skipped {
        tracing::warn!(
            "⚠️ Skipping input line {}: {} ({:?})",
            line.line_number,
            line.reason,
            line.content
        );
    }

    catalog
}

fn skipped(line_number: usize, content: &str, reason: &str) -> SkippedLine {
    SkippedLine {
        line_number,
        content: content.to_string(),
        reason: reason.to_string(),
    }
}

/// Splits one company line into entry names. Returns nothing unless the line
/// starts with an entry marker.
fn split_entries(line: &str) -> Vec<String> {
    let markers: Vec<(usize, usize)> = ENTRY_MARKER
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let spaced = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
            (whole.start() == 0 || spaced).then_some((whole.start(), whole.end()))
        })
        .collect();

    if markers.first().map(|(start, _)| *start) != Some(0) {
        return Vec::new();
    }

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, &(_, name_start))| {
            let name_end = markers.get(i + 1).map_or(line.len(), |&(start, _)| start);
            let name = line[name_start..name_end].trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}
