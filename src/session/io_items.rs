// Primitives for reading the list of items of a session.

use std::fs;

use crate::session::*;

/// Reads the items to rank from a file.
///
/// The file is either a JSON array of strings, or plain text with one item per line. In
/// plain text, blank lines and lines starting with '#' are skipped.
pub fn read_items_file(path: &str) -> SessionResult<Vec<ItemId>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let items = parse_items(&contents, path)?;
    info!("Read {} items from {}", items.len(), path);
    Ok(items)
}

fn parse_items(contents: &str, path: &str) -> SessionResult<Vec<ItemId>> {
    if contents.trim_start().starts_with('[') {
        let items: Vec<String> = serde_json::from_str(contents).context(ParsingJsonSnafu { path })?;
        return Ok(items.into_iter().map(|s| s.trim().to_string()).collect());
    }
    Ok(contents
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.to_string())
        .collect())
}
