//! The fragment table: named, reusable sequences of cell values.
//!
//! A fragment definition file holds one fragment per line:
//!
//! ```text
//! # name, value, value, ...
//! A, 1, 2, 3
//! POLY_T, 84, 84, 84, 84
//! ```
//!
//! Values are byte-sized integers. A fragment defined twice keeps its last
//! definition.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::error::SamplePrepError;
use crate::tokens::{line_content, tokens};

/// Maps fragment names to their value sequences.
///
/// Built once from a definition file and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentTable {
    fragments: BTreeMap<String, Vec<u8>>,
}

impl FragmentTable {
    /// Creates an empty fragment table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a fragment definition file.
    pub fn load(path: &Path) -> Result<Self, SamplePrepError> {
        let file = File::open(path).map_err(|source| SamplePrepError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let content = std::io::read_to_string(file).map_err(|source| SamplePrepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&content, path)?;
        log::info!(
            "loaded {} fragment(s) from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parses fragment definitions from text.
    ///
    /// `origin` is only used to label errors.
    pub fn parse(source: &str, origin: &Path) -> Result<Self, SamplePrepError> {
        let mut table = Self::new();

        for (index, line) in source.lines().enumerate() {
            let Some(content) = line_content(line) else {
                continue;
            };
            let mut toks = tokens(content);
            let name = match toks.next() {
                Some(name) if !name.is_empty() => name,
                _ => continue,
            };

            let values = toks
                .map(|token| {
                    token
                        .parse::<u8>()
                        .map_err(|_| SamplePrepError::InvalidNumber {
                            path: origin.to_path_buf(),
                            line: index + 1,
                            token: token.to_string(),
                            expected: "a fragment value between 0 and 255",
                        })
                })
                .collect::<Result<Vec<u8>, _>>()?;

            log::debug!("fragment {name}: {} value(s)", values.len());
            if table.insert(name, values).is_some() {
                log::warn!(
                    "{}:{}: fragment '{name}' redefined, last definition wins",
                    origin.display(),
                    index + 1
                );
            }
        }

        Ok(table)
    }

    /// Defines or replaces a fragment, returning the previous definition.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<u8>) -> Option<Vec<u8>> {
        self.fragments.insert(name.into(), values)
    }

    /// Looks up the values of a fragment.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.fragments.get(name).map(Vec::as_slice)
    }

    /// Number of defined fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns `true` if no fragment is defined.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<FragmentTable, SamplePrepError> {
        FragmentTable::parse(text, Path::new("fragments.txt"))
    }

    #[test]
    fn parse_basic_definitions() {
        let table = parse("A, 1, 2, 3\nB,4,5\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("A"), Some(&[1u8, 2, 3][..]));
        assert_eq!(table.get("B"), Some(&[4u8, 5][..]));
        assert_eq!(table.get("C"), None);
    }

    #[test]
    fn comments_blank_lines_and_crlf() {
        let text = "# header\r\n\r\n// note\r\n  A, 7, 8\r\n";
        let table = parse(text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("A"), Some(&[7u8, 8][..]));
    }

    #[test]
    fn fragment_without_values() {
        let table = parse("EMPTY\n").unwrap();
        assert_eq!(table.get("EMPTY"), Some(&[][..]));
    }

    #[test]
    fn empty_name_is_skipped() {
        let table = parse(", 1, 2\nA, 3\n").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn redefinition_last_wins() {
        let table = parse("A, 1\nA, 2, 2\n").unwrap();
        assert_eq!(table.get("A"), Some(&[2u8, 2][..]));
    }

    #[test]
    fn malformed_value_is_rejected() {
        let err = parse("A, 1\nB, 2, x3\n").unwrap_err();
        match err {
            SamplePrepError::InvalidNumber { line, token, .. } => {
                assert_eq!(line, 2);
                assert_eq!(token, "x3");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn value_out_of_byte_range_is_rejected() {
        let err = parse("A, 256\n").unwrap_err();
        assert!(matches!(err, SamplePrepError::InvalidNumber { .. }));
    }

    #[test]
    fn empty_value_token_is_rejected() {
        let err = parse("A, 1,, 2\n").unwrap_err();
        assert!(matches!(err, SamplePrepError::InvalidNumber { ref token, .. } if token.is_empty()));
    }

    #[test]
    fn load_missing_file() {
        let err = FragmentTable::load(Path::new("/nonexistent/fragments.txt")).unwrap_err();
        assert!(matches!(err, SamplePrepError::FileNotFound { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fragments.txt");
        std::fs::write(&path, "A, 1, 2, 3\n").unwrap();
        let table = FragmentTable::load(&path).unwrap();
        assert_eq!(table.get("A"), Some(&[1u8, 2, 3][..]));
    }
}
