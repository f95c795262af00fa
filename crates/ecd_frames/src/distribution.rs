//! Distribution records: which fragment sequence lands on which cells.
//!
//! A distribution definition file holds one record per line:
//!
//! ```text
//! # first, last, step $ fragment, fragment, ...
//! 1, 2048, 2 $ A, B
//! 7 $ POLY_T
//! ```
//!
//! `first` and `last` are 1-based inclusive cell numbers. A `last` of 0 (or
//! none at all) means the record covers `first` only, a `step` of 0 (or none)
//! means every cell. The values of the listed fragments are concatenated in
//! order; value `n` of that sequence is written to the record's cells in
//! data frame `n`. Lines without a `$` are not records and are ignored.

use std::fmt;
use std::fs::File;
use std::path::Path;

use crate::error::SamplePrepError;
use crate::fragment::FragmentTable;
use crate::tokens::{line_content, tokens};

/// One distribution rule: a strided cell range and its per-frame values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRecord {
    /// First covered cell, 1-based.
    pub first: u32,
    /// Last covered cell, 1-based and inclusive.
    pub last: u32,
    /// Distance between covered cells.
    pub step: u32,
    /// Value written to the covered cells, indexed by data frame number.
    pub values: Vec<u8>,
}

impl DistributionRecord {
    /// Creates a record with the defaulting rules of the file format applied:
    /// a `last` of 0 becomes `first` and a `step` of 0 becomes 1.
    pub fn new(first: u32, last: u32, step: u32, values: Vec<u8>) -> Self {
        Self {
            first,
            last: if last == 0 { first } else { last },
            step: step.max(1),
            values,
        }
    }

    /// Returns the 0-based cell indices covered by this record, limited to a
    /// frame of `cells_per_frame` cells.
    pub fn cells(&self, cells_per_frame: usize) -> impl Iterator<Item = usize> {
        let start = (self.first as usize).saturating_sub(1);
        let end = (self.last as usize).min(cells_per_frame);
        (start..end).step_by(self.step.max(1) as usize)
    }

    /// Returns the value for a data frame, if the sequence reaches that far.
    pub fn value_at(&self, frame_index: u64) -> Option<u8> {
        usize::try_from(frame_index)
            .ok()
            .and_then(|i| self.values.get(i))
            .copied()
    }
}

/// Ordered distribution records.
///
/// Order matters: when two records cover the same cell, the one appearing
/// later wins in every frame where both have a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionList {
    records: Vec<DistributionRecord>,
}

impl DistributionList {
    /// Creates an empty distribution list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a distribution definition file, resolving fragment names
    /// against `fragments`.
    pub fn load(
        path: &Path,
        fragments: &FragmentTable,
        cells_per_frame: u32,
    ) -> Result<Self, SamplePrepError> {
        let file = File::open(path).map_err(|source| SamplePrepError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let content = std::io::read_to_string(file).map_err(|source| SamplePrepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&content, path, fragments, cells_per_frame)?;
        log::info!(
            "loaded {} distribution record(s) from {}",
            list.len(),
            path.display()
        );
        log::debug!("distribution list:\n{list}");
        Ok(list)
    }

    /// Parses distribution records from text.
    ///
    /// `origin` is only used to label errors.
    pub fn parse(
        source: &str,
        origin: &Path,
        fragments: &FragmentTable,
        cells_per_frame: u32,
    ) -> Result<Self, SamplePrepError> {
        let mut list = Self::new();

        for (index, line) in source.lines().enumerate() {
            let Some(content) = line_content(line) else {
                continue;
            };
            let Some((header, names)) = content.split_once('$') else {
                continue;
            };
            let parser = RecordParser {
                origin,
                line: index + 1,
                cells_per_frame,
            };
            list.push(parser.parse(header, names, fragments)?);
        }

        Ok(list)
    }

    /// Appends a record; it takes precedence over every earlier record.
    pub fn push(&mut self, record: DistributionRecord) {
        self.records.push(record);
    }

    /// The records in precedence order.
    pub fn records(&self) -> &[DistributionRecord] {
        &self.records
    }

    /// Iterates over the records in precedence order.
    pub fn iter(&self) -> std::slice::Iter<'_, DistributionRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Length of the longest value sequence, 0 for an empty list.
    pub fn longest_sequence(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.values.len())
            .max()
            .unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a DistributionList {
    type Item = &'a DistributionRecord;
    type IntoIter = std::slice::Iter<'a, DistributionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Debug dump, one record per line: `first : last : step  *** v  v  ...`.
impl fmt::Display for DistributionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.records {
            write!(f, "{} : {} : {}  *** ", r.first, r.last, r.step)?;
            for v in &r.values {
                write!(f, "{v}  ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parses the pieces of one record line.
struct RecordParser<'a> {
    origin: &'a Path,
    line: usize,
    cells_per_frame: u32,
}

impl RecordParser<'_> {
    fn parse(
        &self,
        header: &str,
        names: &str,
        fragments: &FragmentTable,
    ) -> Result<DistributionRecord, SamplePrepError> {
        let mut fields = tokens(header);
        let first = self.header_number(fields.next())?;
        let last = self.header_number(fields.next())?;
        let step = self.header_number(fields.next())?;

        if first < 1 || first > i64::from(self.cells_per_frame) {
            return Err(self.invalid_cell(first));
        }
        let last = if last == 0 { first } else { last };
        if last < 0 || last > i64::from(self.cells_per_frame) {
            return Err(self.invalid_cell(last));
        }
        if step < 0 {
            return Err(self.invalid_range(format!("negative step {step}")));
        }
        // Bounded by cells_per_frame above.
        let first = first as u32;
        let last = last as u32;
        let step = u32::try_from(step).unwrap_or(u32::MAX);

        let names = names.trim_start_matches([' ', '\t']);
        let names = names.strip_prefix(',').unwrap_or(names);

        let mut values = Vec::new();
        for name in tokens(names) {
            let fragment = fragments
                .get(name)
                .ok_or_else(|| SamplePrepError::UndefinedFragment {
                    path: self.origin.to_path_buf(),
                    line: self.line,
                    name: name.to_string(),
                })?;
            values.extend_from_slice(fragment);
        }

        if last < first {
            log::warn!(
                "{}:{}: last cell {last} precedes first cell {first}, no cells covered",
                self.origin.display(),
                self.line
            );
        }
        if values.is_empty() {
            log::warn!(
                "{}:{}: record for cells {first}..={last} has no values",
                self.origin.display(),
                self.line
            );
        }
        log::debug!(
            "record {first}..={last} step {}: {} value(s)",
            step.max(1),
            values.len()
        );

        Ok(DistributionRecord::new(first, last, step, values))
    }

    /// Parses a header number; a missing or empty token counts as 0.
    fn header_number(&self, token: Option<&str>) -> Result<i64, SamplePrepError> {
        match token {
            None | Some("") => Ok(0),
            Some(t) => t.parse().map_err(|_| SamplePrepError::InvalidNumber {
                path: self.origin.to_path_buf(),
                line: self.line,
                token: t.to_string(),
                expected: "an integer cell number or step",
            }),
        }
    }

    fn invalid_cell(&self, cell: i64) -> SamplePrepError {
        SamplePrepError::InvalidCellNumber {
            path: self.origin.to_path_buf(),
            line: self.line,
            cell,
            cells_per_frame: self.cells_per_frame,
        }
    }

    fn invalid_range(&self, reason: String) -> SamplePrepError {
        SamplePrepError::InvalidCellRange {
            path: self.origin.to_path_buf(),
            line: self.line,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments() -> FragmentTable {
        let mut table = FragmentTable::new();
        table.insert("A", vec![1, 2, 3]);
        table.insert("B", vec![9]);
        table.insert("EMPTY", vec![]);
        table
    }

    fn parse(text: &str) -> Result<DistributionList, SamplePrepError> {
        DistributionList::parse(text, Path::new("dist.txt"), &fragments(), 16)
    }

    #[test]
    fn parse_full_record() {
        let list = parse("1, 8, 2 $ A, B\n").unwrap();
        assert_eq!(list.len(), 1);
        let r = &list.records()[0];
        assert_eq!((r.first, r.last, r.step), (1, 8, 2));
        assert_eq!(r.values, vec![1, 2, 3, 9]);
    }

    #[test]
    fn defaults_for_last_and_step() {
        let list = parse("5 $ B\n3, 0, 0 $ A\n").unwrap();
        let r = &list.records()[0];
        assert_eq!((r.first, r.last, r.step), (5, 5, 1));
        let r = &list.records()[1];
        assert_eq!((r.first, r.last, r.step), (3, 3, 1));
    }

    #[test]
    fn empty_header_tokens_count_as_absent() {
        let list = parse("2,,3 $ B\n").unwrap();
        let r = &list.records()[0];
        assert_eq!((r.first, r.last, r.step), (2, 2, 3));
    }

    #[test]
    fn comma_after_dollar_and_whitespace_names() {
        let list = parse("1,2,1 $, A B\n").unwrap();
        assert_eq!(list.records()[0].values, vec![1, 2, 3, 9]);
    }

    #[test]
    fn lines_without_dollar_are_ignored() {
        let list = parse("# comment\n1, 2, 3\n\n// x $ y\n4 $ B\n").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.records()[0].first, 4);
    }

    #[test]
    fn record_without_fragments_has_no_values() {
        let list = parse("1 $\n2 $ EMPTY\n").unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.records()[0].values.is_empty());
        assert_eq!(list.longest_sequence(), 0);
    }

    #[test]
    fn preserves_file_order() {
        let list = parse("3 $ A\n1 $ B\n2 $ A, A\n").unwrap();
        let firsts: Vec<_> = list.iter().map(|r| r.first).collect();
        assert_eq!(firsts, vec![3, 1, 2]);
        assert_eq!(list.longest_sequence(), 6);
    }

    #[test]
    fn first_cell_out_of_range() {
        for line in ["0 $ A\n", "17 $ A\n", "-1 $ A\n"] {
            let err = parse(line).unwrap_err();
            assert!(
                matches!(err, SamplePrepError::InvalidCellNumber { .. }),
                "{line:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn last_cell_beyond_frame_is_rejected() {
        let err = parse("1, 17, 1 $ A\n").unwrap_err();
        assert!(matches!(err, SamplePrepError::InvalidCellNumber { cell: 17, .. }));
    }

    #[test]
    fn last_before_first_covers_no_cells() {
        let mut table = fragments();
        table.insert("LONG", vec![1, 2, 3, 4, 5]);
        let list =
            DistributionList::parse("5, 3, 1 $ LONG\n", Path::new("dist.txt"), &table, 16)
                .unwrap();
        let r = &list.records()[0];
        assert_eq!((r.first, r.last, r.step), (5, 3, 1));
        assert_eq!(r.cells(16).count(), 0);
        // The sequence still decides how many frame groups are written.
        assert_eq!(list.longest_sequence(), 5);
    }

    #[test]
    fn negative_last_cell_is_rejected() {
        let err = parse("4, -2, 1 $ A\n").unwrap_err();
        assert!(matches!(err, SamplePrepError::InvalidCellNumber { cell: -2, .. }));
    }

    #[test]
    fn negative_step_is_rejected() {
        let err = parse("1, 4, -1 $ A\n").unwrap_err();
        assert!(matches!(err, SamplePrepError::InvalidCellRange { .. }));
    }

    #[test]
    fn undefined_fragment() {
        let err = parse("1 $ A\n1 $ A, NOPE\n").unwrap_err();
        match err {
            SamplePrepError::UndefinedFragment { line, name, .. } => {
                assert_eq!(line, 2);
                assert_eq!(name, "NOPE");
            }
            other => panic!("expected UndefinedFragment, got {other:?}"),
        }
    }

    #[test]
    fn malformed_header_number() {
        let err = parse("1x, 2 $ A\n").unwrap_err();
        assert!(matches!(err, SamplePrepError::InvalidNumber { ref token, .. } if token == "1x"));
    }

    #[test]
    fn stride_cells() {
        let r = DistributionRecord::new(2, 9, 3, vec![1]);
        assert_eq!(r.cells(16).collect::<Vec<_>>(), vec![1, 4, 7]);
        let r = DistributionRecord::new(1, 4, 0, vec![1]);
        assert_eq!(r.cells(16).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn cells_are_clamped_to_frame() {
        let r = DistributionRecord::new(1, 100, 1, vec![1]);
        assert_eq!(r.cells(4).count(), 4);
    }

    #[test]
    fn value_at_frame() {
        let r = DistributionRecord::new(1, 1, 1, vec![9, 8, 7]);
        assert_eq!(r.value_at(0), Some(9));
        assert_eq!(r.value_at(2), Some(7));
        assert_eq!(r.value_at(3), None);
    }

    #[test]
    fn display_dump() {
        let list = parse("1, 4, 1 $ A\n").unwrap();
        assert_eq!(list.to_string(), "1 : 4 : 1  *** 1  2  3  \n");
    }

    #[test]
    fn load_missing_file() {
        let err = DistributionList::load(Path::new("/nonexistent/dist.txt"), &fragments(), 16)
            .unwrap_err();
        assert!(matches!(err, SamplePrepError::FileNotFound { .. }));
    }
}
