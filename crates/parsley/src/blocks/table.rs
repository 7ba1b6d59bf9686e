//! GFM table rows

use parsley_core::Alignment;

/// Split a table row into trimmed cell sources
///
/// One leading and one trailing pipe are optional. `\|` is a literal pipe
/// inside a cell; other escapes are left for the inline parser.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let line = line.trim_matches(|c| c == ' ' || c == '\t');
    let line = line.strip_prefix('|').unwrap_or(line);

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some(next) => {
                    cell.push('\\');
                    cell.push(next);
                }
                None => cell.push('\\'),
            },
            '|' => {
                cells.push(cell.trim().to_string());
                cell.clear();
                if chars.peek().is_none() {
                    return cells;
                }
            }
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

/// Parse a delimiter row such as `|:---|:-:|--:|`
pub(crate) fn delimiter_row(line: &str) -> Option<Vec<Alignment>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || !trimmed.contains('-') {
        return None;
    }
    split_row(trimmed)
        .iter()
        .map(|cell| alignment(cell))
        .collect()
}

fn alignment(cell: &str) -> Option<Alignment> {
    let left = cell.starts_with(':');
    let right = cell.len() > 1 && cell.ends_with(':');
    let dashes = &cell[left as usize..cell.len() - right as usize];
    if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    })
}

/// Pad or truncate a row to the table's column count
pub(crate) fn fit_row(mut cells: Vec<String>, columns: usize) -> Vec<String> {
    cells.resize(columns, String::new());
    cells
}
