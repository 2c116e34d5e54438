use crate::model::{DISPLAY_UNIT, DimensionRecord};

/// Parse free-form multi-line dimension text into ordered records.
///
/// Per non-blank line, numeric tokens are extracted with the grammar "one or
/// more digits, optionally followed by a single `L`/`D`/`H` marker
/// (case-insensitive)"; anything else is filler (`x`, spaces, `/`, ...).
/// Markers are stripped. Lines with fewer than three tokens are silently
/// discarded; tokens map positionally to width, depth, height and an optional
/// front height, and any further tokens are ignored.
///
/// Parsing never fails: malformed input degrades to fewer records. Identical
/// text always yields identical records; there is no cross-line state.
pub fn parse_dimensions(text: &str) -> Vec<DimensionRecord> {
    let mut records = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let tokens = line_tokens(line);
        if tokens.len() < 3 {
            continue;
        }
        let mut tokens = tokens.into_iter();
        records.push(DimensionRecord {
            index: records.len(),
            width: tokens.next().unwrap_or_default(),
            depth: tokens.next().unwrap_or_default(),
            height: tokens.next().unwrap_or_default(),
            front_height: tokens.next().unwrap_or_default(),
            unit: DISPLAY_UNIT.to_string(),
        });
    }
    records
}

/// Scan one line into bare numeric token strings, markers stripped.
fn line_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        while let Some(&d) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            token.push(d);
            chars.next();
        }
        // At most one trailing L/D/H marker belongs to the token.
        if let Some(&m) = chars.peek()
            && matches!(m.to_ascii_uppercase(), 'L' | 'D' | 'H')
        {
            chars.next();
        }
        tokens.push(token);
    }
    tokens
}
