/// Canonical header form: invisible marks stripped, whitespace runs joined by `_`, lower-cased.
pub fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    collapsed.to_lowercase()
}

/// Trimmed cell text, `None` when blank.
pub(crate) fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Decodes a raw row. Cells that are not UTF-8 are read as Latin-1, which is
/// what spreadsheet exports on Windows usually emit.
pub(crate) fn decode_record(raw: &csv::ByteRecord) -> csv::StringRecord {
    raw.iter().map(decode_cell).collect()
}

fn decode_cell(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}
