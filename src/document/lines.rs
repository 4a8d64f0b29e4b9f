//! Splitting entry content into paragraph lines

/// Split `content` into the lines that become body paragraphs.
///
/// Lines end at `\n`; a `\r` directly before the `\n` belongs to the line
/// ending. Empty content has no lines, and a terminator at the very end does
/// not open a further empty line. A lone `\r` stays part of the line.
pub fn split_lines(content: &str) -> Vec<&str> {
    let mut segments = content.split('\n');
    // split always yields a final segment with no '\n' after it
    let last = segments.next_back().unwrap_or_default();

    let mut lines: Vec<&str> = segments
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    if !last.is_empty() {
        lines.push(last);
    }
    lines
}
