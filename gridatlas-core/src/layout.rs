//! Uniform grid layout: every cell is as wide as the widest source and as tall as the tallest.

use std::num::NonZeroU32;

use crate::error::{AtlasError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl GridLayout {
    /// Returns `Ok(None)` when there is nothing to lay out. Fails when the canvas would not fit
    /// in `u32` pixel dimensions or in addressable memory.
    pub fn compute(sizes: &[(u32, u32)], columns: Option<NonZeroU32>) -> Result<Option<Self>> {
        if sizes.is_empty() {
            return Ok(None);
        }
        let count = sizes.len() as u32;
        let cell_width = sizes.iter().map(|&(w, _)| w).max().unwrap_or(0);
        let cell_height = sizes.iter().map(|&(_, h)| h).max().unwrap_or(0);
        let columns = columns.map_or_else(|| ceil_sqrt(count), NonZeroU32::get);
        let rows = count.div_ceil(columns);

        let width = u64::from(columns) * u64::from(cell_width);
        let height = u64::from(rows) * u64::from(cell_height);
        let too_large = || AtlasError::CanvasTooLarge { width, height };
        u32::try_from(width).map_err(|_| too_large())?;
        u32::try_from(height).map_err(|_| too_large())?;
        columns.checked_mul(rows).ok_or_else(too_large)?;
        // RGBA8 buffer
        let bytes = width.checked_mul(height).and_then(|px| px.checked_mul(4)).ok_or_else(too_large)?;
        usize::try_from(bytes).map_err(|_| too_large())?;

        Ok(Some(Self { columns, rows, cell_width, cell_height }))
    }

    pub fn capacity(&self) -> u32 { self.columns * self.rows }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.columns * self.cell_width, self.rows * self.cell_height)
    }

    /// Row-major (column, row) of the cell holding the `index`-th source.
    pub fn cell_of(&self, index: u32) -> (u32, u32) {
        (index % self.columns, index / self.columns)
    }

    /// Pixel origin (top-left) of the `index`-th cell.
    pub fn origin_of(&self, index: u32) -> (u32, u32) {
        let (col, row) = self.cell_of(index);
        (col * self.cell_width, row * self.cell_height)
    }
}

// Smallest c with c*c >= n; avoids float rounding at perfect squares.
fn ceil_sqrt(n: u32) -> u32 {
    let mut c = (n as f64).sqrt() as u32;
    while c.saturating_mul(c) < n {
        c += 1;
    }
    while c > 1 && (c - 1) * (c - 1) >= n {
        c -= 1;
    }
    c.max(1)
}
