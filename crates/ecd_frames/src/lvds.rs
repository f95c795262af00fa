//! LVDS row reordering.
//!
//! The chip transmits each 2048-cell row over LVDS in a different order than
//! the logical ("raw") cell order. A row is divided into 8 groups of 256
//! cells; each group is made of 4 sub-rows of 64 cells that are sent back to
//! front and interleaved across the groups.
//!
//! The translation table maps positions in the transmitted row to positions
//! in the raw row: `lvds_row[i] = raw_row[TRANSLATION_TABLE[i]]`. Both the
//! table and its inverse are computed at compile time.

use ecd_common::{EcdResult, InternalError};

/// Number of cells in one chip row, the unit of reordering.
pub const ROW_SIZE: usize = 2048;

/// Cell groups per row.
const GROUPS: usize = 8;

/// Cells per group.
const GROUP_SIZE: usize = ROW_SIZE / GROUPS;

/// Sub-rows per group.
const SUB_ROWS: usize = 4;

/// Cells per sub-row.
const SUB_ROW_SIZE: usize = GROUP_SIZE / SUB_ROWS;

/// Precomputed raw-order source position for every transmitted position.
pub const TRANSLATION_TABLE: [u16; ROW_SIZE] = build_translation_table();

/// Precomputed transmitted position for every raw position.
pub const INVERSE_TABLE: [u16; ROW_SIZE] = invert(&TRANSLATION_TABLE);

/// Builds the raw-order source position of every transmitted position.
pub const fn build_translation_table() -> [u16; ROW_SIZE] {
    let mut table = [0u16; ROW_SIZE];
    let mut group = 0;
    while group < GROUPS {
        let mut sub_row = 0;
        while sub_row < SUB_ROWS {
            let anchor = group * GROUP_SIZE + (SUB_ROW_SIZE - 1) + sub_row * SUB_ROW_SIZE;
            let mut i = 0;
            while i < SUB_ROW_SIZE {
                table[anchor - i] = (sub_row * (ROW_SIZE / SUB_ROWS) + group + i * GROUPS) as u16;
                i += 1;
            }
            sub_row += 1;
        }
        group += 1;
    }
    table
}

/// Inverts a permutation of `0..ROW_SIZE`.
///
/// Fails const evaluation if `table` is not a permutation.
pub const fn invert(table: &[u16; ROW_SIZE]) -> [u16; ROW_SIZE] {
    let mut inverse = [u16::MAX; ROW_SIZE];
    let mut i = 0;
    while i < ROW_SIZE {
        let raw = table[i] as usize;
        assert!(raw < ROW_SIZE, "translation entry out of range");
        assert!(inverse[raw] == u16::MAX, "translation entry repeated");
        inverse[raw] = i as u16;
        i += 1;
    }
    inverse
}

/// Returns the position of a raw row offset in the transmitted row.
///
/// Only offsets outside the row can fail, since the table is a permutation.
pub fn lvds_offset(raw_offset: usize) -> EcdResult<usize> {
    match INVERSE_TABLE.get(raw_offset) {
        Some(&i) if TRANSLATION_TABLE[i as usize] as usize == raw_offset => Ok(i as usize),
        _ => Err(InternalError::new(format!(
            "raw cell offset {raw_offset} has no LVDS position"
        ))),
    }
}

/// Maps a 0-based cell number of a raw frame to its index in the reordered frame.
pub fn lvds_cell_index(cell: usize) -> EcdResult<usize> {
    let row = cell / ROW_SIZE;
    Ok(row * ROW_SIZE + lvds_offset(cell % ROW_SIZE)?)
}

/// Reorders every full row of a frame from raw order to transmission order.
///
/// Bytes after the last full row are left untouched; frame widths are
/// validated to be whole rows before any frame is built.
pub fn reorder_frame(frame: &mut [u8]) {
    permute_rows(frame, |row, out| {
        for (dst, &src) in out.iter_mut().zip(TRANSLATION_TABLE.iter()) {
            *dst = row[src as usize];
        }
    });
}

/// Restores raw order in a frame produced by [`reorder_frame`].
pub fn restore_frame(frame: &mut [u8]) {
    permute_rows(frame, |row, out| {
        for (dst, &src) in out.iter_mut().zip(INVERSE_TABLE.iter()) {
            *dst = row[src as usize];
        }
    });
}

fn permute_rows(frame: &mut [u8], permute: impl Fn(&[u8], &mut [u8; ROW_SIZE])) {
    let mut scratch = [0u8; ROW_SIZE];
    for row in frame.chunks_exact_mut(ROW_SIZE) {
        permute(row, &mut scratch);
        row.copy_from_slice(&scratch);
    }
}

/// Renders the translation table as 32 lines of 64 comma-separated entries.
pub fn map_listing() -> String {
    let mut out = String::with_capacity(ROW_SIZE * 5 + 32);
    for line in TRANSLATION_TABLE.chunks(SUB_ROW_SIZE) {
        let cells: Vec<String> = line.iter().map(|v| format!("{v:4}")).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}
