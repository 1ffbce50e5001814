//! Uniform bucket grid over graph-layout positions.
//!
//! Repulsion only matters at short range, so instead of comparing every pair of people the layout
//! rebuilds this grid each step and only looks at the 3×3 block of cells around each person.

use crate::vector::Vec2;
use crate::HashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct CellKey {
    x: i64,
    y: i64,
}

#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f64,
    buckets: HashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        SpatialGrid {
            cell_size: cell_size.max(1.0),
            buckets: HashMap::default(),
        }
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn clear(&mut self) {
        // Keep the bucket allocations; the same cells are usually reused next step.
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
    }

    // Truncation toward zero, so the cells either side of an axis share index 0.
    fn cell_key(&self, pos: Vec2) -> CellKey {
        CellKey {
            x: (pos.x / self.cell_size) as i64,
            y: (pos.y / self.cell_size) as i64,
        }
    }

    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let key = self.cell_key(pos);
        self.buckets.entry(key).or_default().push(index);
    }

    /// Clears the grid and inserts every position, keyed by its index.
    pub fn rebuild(&mut self, positions: impl IntoIterator<Item = Vec2>) {
        self.clear();
        for (index, pos) in positions.into_iter().enumerate() {
            self.insert(index, pos);
        }
    }

    /// Calls `f` with every index in the cell containing `pos` and its eight neighbors. Within a
    /// cell, indices come in insertion order.
    pub fn for_each_candidate(&self, pos: Vec2, mut f: impl FnMut(usize)) {
        let key = self.cell_key(pos);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let neighbor = CellKey {
                    x: key.x + dx,
                    y: key.y + dy,
                };
                if let Some(items) = self.buckets.get(&neighbor) {
                    for &index in items {
                        f(index);
                    }
                }
            }
        }
    }
}
