//! Line classification and tokenizing for the definition file formats.
//!
//! Both definition files are line based. A token ends at a comma, a space, a
//! tab or the end of the line; a single comma after a token (with optional
//! whitespace around it) is consumed as the separator, so `a, b`, `a,b` and
//! `a b` all yield two tokens while `a,,b` yields an empty middle token.

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn ends_line(c: char) -> bool {
    c == '\r' || c == '\n'
}

/// Returns the content of a line, or `None` for blank and comment lines.
///
/// Comments are lines whose first non-blank characters are `#` or `//`.
pub(crate) fn line_content(line: &str) -> Option<&str> {
    let s = line.trim_start_matches(is_blank);
    match s.chars().next() {
        None => None,
        Some(c) if ends_line(c) || c == '#' => None,
        Some(_) if s.starts_with("//") => None,
        Some(_) => Some(s),
    }
}

/// Iterator over the separated tokens of one line.
#[derive(Debug, Clone)]
pub(crate) struct Tokens<'a> {
    rest: &'a str,
}

/// Splits `text` into tokens.
pub(crate) fn tokens(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let s = self.rest.trim_start_matches(is_blank);
        if s.is_empty() || s.starts_with(ends_line) {
            self.rest = "";
            return None;
        }

        let end = s
            .find(|c: char| is_blank(c) || ends_line(c) || c == ',')
            .unwrap_or(s.len());
        let (token, after) = s.split_at(end);
        let after = after.trim_start_matches(is_blank);
        self.rest = after.strip_prefix(',').unwrap_or(after);
        Some(token)
    }
}
