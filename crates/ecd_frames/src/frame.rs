//! Data frame construction.

use crate::distribution::DistributionList;

/// Builds raw data frames from a distribution list.
///
/// A frame is fully determined by its data frame index: every cell starts at
/// the quiescent value, then each record that has a value for the index
/// writes it to its cells, in list order.
#[derive(Debug, Clone, Copy)]
pub struct FrameBuilder<'a> {
    distribution: &'a DistributionList,
    cells_per_frame: usize,
    quiescent: u8,
}

impl<'a> FrameBuilder<'a> {
    /// Creates a builder for frames of `cells_per_frame` cells.
    pub fn new(distribution: &'a DistributionList, cells_per_frame: usize, quiescent: u8) -> Self {
        Self {
            distribution,
            cells_per_frame,
            quiescent,
        }
    }

    /// Width of the frames this builder produces.
    pub fn cells_per_frame(&self) -> usize {
        self.cells_per_frame
    }

    /// Builds data frame `frame_index` into `frame`, overwriting all of it.
    ///
    /// `frame` must be exactly `cells_per_frame` bytes long.
    pub fn build_into(&self, frame_index: u64, frame: &mut [u8]) {
        debug_assert_eq!(frame.len(), self.cells_per_frame);
        frame.fill(self.quiescent);
        for record in self.distribution {
            if let Some(value) = record.value_at(frame_index) {
                for cell in record.cells(frame.len()) {
                    frame[cell] = value;
                }
            }
        }
    }

    /// Builds data frame `frame_index` into a new buffer.
    pub fn build(&self, frame_index: u64) -> Vec<u8> {
        let mut frame = vec![self.quiescent; self.cells_per_frame];
        self.build_into(frame_index, &mut frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DistributionRecord;

    fn list(records: Vec<DistributionRecord>) -> DistributionList {
        let mut list = DistributionList::new();
        for r in records {
            list.push(r);
        }
        list
    }

    #[test]
    fn empty_distribution_is_all_quiescent() {
        let dist = DistributionList::new();
        let builder = FrameBuilder::new(&dist, 64, 0x5A);
        for index in [0, 1, 1000] {
            assert!(builder.build(index).iter().all(|&b| b == 0x5A));
        }
    }

    #[test]
    fn values_follow_frame_index() {
        let dist = list(vec![DistributionRecord::new(1, 4, 1, vec![9, 8, 7])]);
        let builder = FrameBuilder::new(&dist, 8, 0);
        assert_eq!(builder.build(0), vec![9, 9, 9, 9, 0, 0, 0, 0]);
        assert_eq!(builder.build(1), vec![8, 8, 8, 8, 0, 0, 0, 0]);
        assert_eq!(builder.build(2), vec![7, 7, 7, 7, 0, 0, 0, 0]);
        assert_eq!(builder.build(3), vec![0; 8]);
    }

    #[test]
    fn stride_leaves_gaps_quiescent() {
        let dist = list(vec![DistributionRecord::new(2, 8, 3, vec![5])]);
        let builder = FrameBuilder::new(&dist, 8, 1);
        assert_eq!(builder.build(0), vec![1, 5, 1, 1, 5, 1, 1, 5]);
    }

    #[test]
    fn later_record_wins_on_overlap() {
        let dist = list(vec![
            DistributionRecord::new(1, 8, 1, vec![1, 1, 1]),
            DistributionRecord::new(6, 6, 1, vec![2, 2]),
        ]);
        let builder = FrameBuilder::new(&dist, 8, 0);
        assert_eq!(builder.build(0)[5], 2);
        assert_eq!(builder.build(1)[5], 2);
        // Only the earlier record still has a value in frame 2.
        assert_eq!(builder.build(2)[5], 1);
    }

    #[test]
    fn earlier_record_loses_even_if_longer() {
        let dist = list(vec![
            DistributionRecord::new(6, 6, 1, vec![2, 2]),
            DistributionRecord::new(1, 8, 1, vec![1, 1, 1]),
        ]);
        let builder = FrameBuilder::new(&dist, 8, 0);
        assert_eq!(builder.build(0)[5], 1);
    }

    #[test]
    fn build_into_overwrites_previous_contents() {
        let dist = list(vec![DistributionRecord::new(1, 1, 1, vec![3])]);
        let builder = FrameBuilder::new(&dist, 4, 0);
        let mut frame = vec![0xEE; 4];
        builder.build_into(0, &mut frame);
        assert_eq!(frame, vec![3, 0, 0, 0]);
        builder.build_into(1, &mut frame);
        assert_eq!(frame, vec![0, 0, 0, 0]);
    }
}
