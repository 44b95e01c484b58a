//! Text helpers for labels and docstrings

use unicode_width::UnicodeWidthStr;

/// Greedy word wrap measured in display columns
///
/// Runs of whitespace, newlines included, collapse to one space. Words wider
/// than `max_width` get a line of their own rather than being split. A
/// `max_width` of 0 disables wrapping.
///
/// # Example
/// ```
/// use erdwright::core::wrap_label;
///
/// let lines = wrap_label("The members of\nthe party", 10);
/// assert_eq!(lines, vec!["The", "members of", "the party"]);
/// ```
pub fn wrap_label(text: &str, max_width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if max_width == 0
            || current.width() + 1 + word.width() <= max_width
        {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Python-style `inspect.cleandoc`: strip the common leading indentation
/// and surrounding blank lines
pub fn clean_docstring(doc: &str) -> String {
    let lines: Vec<&str> = doc.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.trim().is_empty() {
                line.trim()
            } else {
                line.get(indent..).unwrap_or(line).trim_end()
            }
        })
        .collect();

    let start = cleaned.iter().position(|l| !l.is_empty()).unwrap_or(cleaned.len());
    let end = cleaned
        .iter()
        .rposition(|l| !l.is_empty())
        .map(|i| i + 1)
        .unwrap_or(start);
    cleaned[start..end].join("\n")
}
