//! Word catalog loading from a spreadsheet CSV export.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use tracing::{info, warn};

use crate::models::{WordEntry, DEFAULT_RULE};

/// Catalog shipped with the binary, used when no CSV is configured.
const BUNDLED_CATALOG: &str = include_str!("../data/palabras.csv");

/// Load the catalog from a CSV file.
pub fn load_catalog(path: &Path) -> Result<Vec<WordEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
    let words = parse_catalog(&content);
    info!(path = %path.display(), words = words.len(), "catalog loaded");
    Ok(words)
}

pub fn bundled_catalog() -> Vec<WordEntry> {
    let words = parse_catalog(BUNDLED_CATALOG);
    info!(words = words.len(), "bundled catalog loaded");
    words
}

/// Map CSV rows to word entries.
///
/// The first record is a header. Rows either start with a row number
/// (`n, letter, rule, definition, word`) or go straight to the letter
/// (`letter, rule, definition, word`). Quoted fields may span lines. Ids
/// follow record order and rows without a word are dropped afterwards, so
/// ids stay stable when one is blanked.
pub fn parse_catalog(content: &str) -> Vec<WordEntry> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader
        .records()
        .filter_map(|record| match record {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "skipping unreadable catalog row");
                None
            }
        })
        .filter(|record| record.len() > 1)
        .enumerate()
        .map(|(index, record)| map_row(index, &record))
        .filter(|entry| !entry.word.is_empty())
        .collect()
}

fn map_row(index: usize, record: &StringRecord) -> WordEntry {
    let cell = |i: usize| record.get(i).map(str::trim).unwrap_or("");

    let (mut letter, rule, definition, word) = if is_row_number(cell(0)) {
        (cell(1), cell(2), cell(3), cell(4))
    } else {
        (cell(0), cell(1), cell(2), cell(3))
    };
    if is_row_number(letter) {
        letter = cell(1);
    }

    WordEntry {
        id: format!("word_{}", index),
        letter: letter.to_uppercase(),
        word: word.to_string(),
        definition: definition.to_string(),
        rule: if rule.is_empty() { DEFAULT_RULE } else { rule }.to_string(),
    }
}

fn is_row_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
