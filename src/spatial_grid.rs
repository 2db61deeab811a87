/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct used to bound neighbour lookups.
 * It divides the world rectangle [0, width) x [0, height) into square cells and
 * buckets agent indices by cell. The grid is cleared and refilled every tick.
 *
 * Besides candidate lookups it exposes a density field (each cell's occupancy
 * blended with its eight neighbours) for heat-map style debugging.
 */

use glam::Vec2;

pub struct SpatialGrid {
    pub cell_size: f32,
    cols: usize,
    rows: usize,
    // Row-major buckets of agent indices
    buckets: Vec<Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, width: f32, height: f32) -> Self {
        let cols = (width / cell_size).floor() as usize;
        let rows = (height / cell_size).floor() as usize;

        let mut buckets = Vec::with_capacity(cols * rows);
        for _ in 0..(cols * rows) {
            buckets.push(Vec::new());
        }

        Self {
            cell_size,
            cols,
            rows,
            buckets,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    /// Cell holding `position`, or `None` when it lies outside the grid.
    #[inline]
    pub fn cell_of(&self, position: Vec2) -> Option<(usize, usize)> {
        if !(position.x >= 0.0 && position.y >= 0.0) {
            return None;
        }
        let col = (position.x / self.cell_size).floor() as usize;
        let row = (position.y / self.cell_size).floor() as usize;
        if col < self.cols && row < self.rows {
            Some((col, row))
        } else {
            None
        }
    }

    /// Like `cell_of`, but positions outside the grid snap to the nearest edge cell.
    pub fn nearest_cell(&self, position: Vec2) -> (usize, usize) {
        let max_col = self.cols.saturating_sub(1) as f32;
        let max_row = self.rows.saturating_sub(1) as f32;
        let col = (position.x / self.cell_size).floor().clamp(0.0, max_col) as usize;
        let row = (position.y / self.cell_size).floor().clamp(0.0, max_row) as usize;
        (col, row)
    }

    // Clear every bucket
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Insert one agent. Returns false when the position lies outside the grid.
    #[inline]
    pub fn insert(&mut self, agent_index: usize, position: Vec2) -> bool {
        match self.cell_of(position) {
            Some((col, row)) => {
                let index = self.index(col, row);
                self.buckets[index].push(agent_index);
                true
            }
            None => false,
        }
    }

    /// Re-bucket every agent from scratch. Agents outside the world are left out
    /// of the index for this tick; the count of indexed agents is returned.
    pub fn rebuild<I>(&mut self, positions: I) -> usize
    where
        I: IntoIterator<Item = Vec2>,
    {
        self.clear();

        let mut indexed = 0;
        for (agent_index, position) in positions.into_iter().enumerate() {
            if self.insert(agent_index, position) {
                indexed += 1;
            }
        }
        indexed
    }

    /// All valid cells in the inclusive square window of half-width `radius`
    /// around (`col`, `row`), row by row.
    pub fn cells_within_radius(&self, col: usize, row: usize, radius: usize) -> Vec<(usize, usize)> {
        let (col, row) = (col as isize, row as isize);
        let radius = radius as isize;
        let cols = self.cols as isize;
        let rows = self.rows as isize;

        let row_start = (row - radius).max(0);
        let row_end = (row + radius).min(rows - 1);
        let col_start = (col - radius).max(0);
        let col_end = (col + radius).min(cols - 1);

        let mut cells = Vec::new();
        for check_row in row_start..=row_end {
            for check_col in col_start..=col_end {
                cells.push((check_col as usize, check_row as usize));
            }
        }
        cells
    }

    /// Bucket contents; empty for out-of-range coordinates.
    pub fn agents_in_cell(&self, col: usize, row: usize) -> &[usize] {
        if col < self.cols && row < self.rows {
            &self.buckets[self.index(col, row)]
        } else {
            &[]
        }
    }

    /// Agent indices bucketed in the window around the cell containing `position`.
    pub fn candidates_near(&self, position: Vec2, radius: usize) -> Vec<usize> {
        let mut result = Vec::new();
        for row_buckets in self.window_rows(position, radius) {
            for bucket in row_buckets {
                result.extend_from_slice(bucket);
            }
        }
        result
    }

    /// Number of agents bucketed in the same window as `candidates_near`,
    /// without collecting them.
    pub fn count_near(&self, position: Vec2, radius: usize) -> usize {
        self.window_rows(position, radius)
            .map(|row_buckets| row_buckets.iter().map(Vec::len).sum::<usize>())
            .sum()
    }

    // Each row of the clipped window around `position`, as a slice of buckets
    fn window_rows(&self, position: Vec2, radius: usize) -> impl Iterator<Item = &[Vec<usize>]> + '_ {
        let (col, row) = self.nearest_cell(position);
        let col_start = col.saturating_sub(radius);
        let col_end = col.saturating_add(radius).min(self.cols.saturating_sub(1));
        let row_start = row.saturating_sub(radius);
        let row_end = row.saturating_add(radius).min(self.rows.saturating_sub(1));
        let rows = if self.buckets.is_empty() {
            1..=0
        } else {
            row_start..=row_end
        };

        rows.map(move |check_row| {
            let start = self.index(col_start, check_row);
            let end = self.index(col_end, check_row);
            &self.buckets[start..=end]
        })
    }

    /// Occupancy of a cell blended with its eight neighbours: own count plus the
    /// neighbours' counts divided by `neighbor_weight`, all over `divisor`.
    pub fn density(&self, col: usize, row: usize, neighbor_weight: f32, divisor: f32) -> f32 {
        if col >= self.cols || row >= self.rows {
            return 0.0;
        }

        let mut value = self.agents_in_cell(col, row).len() as f32;
        for (check_col, check_row) in self.cells_within_radius(col, row, 1) {
            if (check_col, check_row) != (col, row) {
                value += self.agents_in_cell(check_col, check_row).len() as f32 / neighbor_weight;
            }
        }
        value / divisor
    }

    /// Row-major density for every cell.
    pub fn density_map(&self, neighbor_weight: f32, divisor: f32) -> Vec<f32> {
        let mut field = Vec::with_capacity(self.cols * self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                field.push(self.density(col, row, neighbor_weight, divisor));
            }
        }
        field
    }
}
