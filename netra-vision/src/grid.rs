//! Persistent world map accumulating classified observations.
//!
//! Three u8 channels per cell (obstacle, target, navigable) in
//! structure-of-arrays layout. Each update increments a channel once per
//! distinct observed cell, saturating at 255, and a cell confirmed
//! navigable has its obstacle count zeroed in the same update.

use crate::core::GridCoord;

/// Square 3-channel accumulation grid in world coordinates.
#[derive(Clone, Debug)]
pub struct WorldMap {
    size: usize,
    obstacle: Vec<u8>,
    target: Vec<u8>,
    navigable: Vec<u8>,
}

/// Cell counts per channel, for end-of-run reporting.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapCoverage {
    /// Cells with positive navigable accumulation.
    pub navigable: usize,
    /// Cells with positive obstacle accumulation.
    pub obstacles: usize,
    /// Cells with positive target accumulation.
    pub targets: usize,
}

impl WorldMap {
    /// Create a zeroed map of `size` x `size` cells.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            obstacle: vec![0; size * size],
            target: vec![0; size * size],
            navigable: vec![0; size * size],
        }
    }

    /// Side length in cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, cell: GridCoord) -> usize {
        cell.y as usize * self.size + cell.x as usize
    }

    /// Obstacle accumulation at a cell.
    #[inline]
    pub fn obstacle_at(&self, cell: GridCoord) -> u8 {
        self.obstacle[self.index(cell)]
    }

    /// Target accumulation at a cell.
    #[inline]
    pub fn target_at(&self, cell: GridCoord) -> u8 {
        self.target[self.index(cell)]
    }

    /// Navigable accumulation at a cell.
    #[inline]
    pub fn navigable_at(&self, cell: GridCoord) -> u8 {
        self.navigable[self.index(cell)]
    }

    /// Integrate one frame's classified world cells.
    ///
    /// Each distinct cell in a list gains one count on its channel
    /// (saturating at 255); wherever navigable accumulation is positive
    /// the obstacle channel is forced back to zero.
    pub fn integrate(
        &mut self,
        obstacles: &[GridCoord],
        targets: &[GridCoord],
        navigable: &[GridCoord],
    ) {
        bump_cells(&mut self.obstacle, self.size, obstacles);
        bump_cells(&mut self.target, self.size, targets);
        bump_cells(&mut self.navigable, self.size, navigable);

        for i in 0..self.navigable.len() {
            if self.navigable[i] > 0 {
                self.obstacle[i] = 0;
            }
        }
    }

    /// Count cells with positive accumulation per channel.
    pub fn coverage(&self) -> MapCoverage {
        MapCoverage {
            navigable: self.navigable.iter().filter(|&&v| v > 0).count(),
            obstacles: self.obstacle.iter().filter(|&&v| v > 0).count(),
            targets: self.target.iter().filter(|&&v| v > 0).count(),
        }
    }

    /// Per-channel slices as (obstacle, target, navigable), row-major.
    pub fn channels(&self) -> (&[u8], &[u8], &[u8]) {
        (&self.obstacle, &self.target, &self.navigable)
    }
}

/// Increment each distinct listed cell once, saturating at 255.
fn bump_cells(channel: &mut [u8], size: usize, cells: &[GridCoord]) {
    let mut indices: Vec<usize> = cells
        .iter()
        .map(|c| c.y as usize * size + c.x as usize)
        .collect();
    indices.sort_unstable();
    indices.dedup();
    for i in indices {
        channel[i] = channel[i].saturating_add(1);
    }
}
