//! Level stacks and their per-position accessors

use gridlevels_core::raster::{Extent, Raster, ResamplingMethod};
use gridlevels_core::{Error, Result};

/// Where level heights come from
#[derive(Debug, Clone)]
pub enum LevelHeights<'a> {
    /// One fixed height per level, independent of position
    Table(Vec<f64>),
    /// One height grid per level, optionally limited by a minimum height
    /// grid: cells whose level height lies below the minimum are ignored.
    Grids {
        grids: Vec<&'a Raster<f64>>,
        minimum: Option<&'a Raster<f64>>,
    },
}

impl LevelHeights<'_> {
    pub fn len(&self) -> usize {
        match self {
            LevelHeights::Table(table) => table.len(),
            LevelHeights::Grids { grids, .. } => grids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only view on externally owned level grids.
///
/// All grids (variables, height grids and the minimum grid) share one grid
/// geometry, the level system. [`LevelStack::validate`] checks this.
#[derive(Debug, Clone)]
pub struct LevelStack<'a> {
    variables: Vec<&'a Raster<f64>>,
    heights: LevelHeights<'a>,
}

impl<'a> LevelStack<'a> {
    pub fn new(variables: Vec<&'a Raster<f64>>, heights: LevelHeights<'a>) -> Self {
        Self { variables, heights }
    }

    /// Stack with heights from a table
    pub fn with_height_table(variables: Vec<&'a Raster<f64>>, heights: Vec<f64>) -> Self {
        Self::new(variables, LevelHeights::Table(heights))
    }

    /// Stack with heights from per-level grids
    pub fn with_height_grids(
        variables: Vec<&'a Raster<f64>>,
        grids: Vec<&'a Raster<f64>>,
        minimum: Option<&'a Raster<f64>>,
    ) -> Self {
        Self::new(variables, LevelHeights::Grids { grids, minimum })
    }

    pub fn level_count(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[&'a Raster<f64>] {
        &self.variables
    }

    pub fn heights(&self) -> &LevelHeights<'a> {
        &self.heights
    }

    /// Grid defining the level system geometry
    pub fn system(&self) -> Option<&'a Raster<f64>> {
        self.variables.first().copied()
    }

    /// Extent of the level system
    pub fn extent(&self) -> Option<Extent> {
        self.system().map(Raster::extent)
    }

    /// Check level counts and that every grid belongs to the level system
    pub fn validate(&self) -> Result<()> {
        let system = self.system().ok_or(Error::NoLevels)?;

        if self.variables.len() != self.heights.len() {
            return Err(Error::LevelCountMismatch {
                variables: self.variables.len(),
                heights: self.heights.len(),
            });
        }

        let mismatch = |what: String| Error::GeometryMismatch { what };

        for (i, grid) in self.variables.iter().enumerate() {
            if !grid.same_geometry(system) {
                return Err(mismatch(format!("variable grid {} differs from level 0", i)));
            }
        }

        if let LevelHeights::Grids { grids, minimum } = &self.heights {
            for (i, grid) in grids.iter().enumerate() {
                if !grid.same_geometry(system) {
                    return Err(mismatch(format!("height grid {} differs from the variable grids", i)));
                }
            }
            if let Some(minimum) = minimum {
                if !minimum.same_geometry(system) {
                    return Err(mismatch("minimum height grid differs from the variable grids".into()));
                }
            }
        }

        Ok(())
    }
}

/// Height grid resolved for one run: borrowed from the caller, or an index
/// into the run's own masked copies.
#[derive(Debug, Clone, Copy)]
pub enum GridHandle<'a> {
    Borrowed(&'a Raster<f64>),
    Owned(usize),
}

impl<'a> GridHandle<'a> {
    /// Resolve against the owned grids of the run; `None` once they were released
    pub fn resolve<'s>(&self, owned: &'s [Raster<f64>]) -> Option<&'s Raster<f64>>
    where
        'a: 's,
    {
        match *self {
            GridHandle::Borrowed(grid) => Some(grid),
            GridHandle::Owned(index) => owned.get(index),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum HeightSource<'s> {
    Table(&'s [f64]),
    Grids {
        handles: &'s [GridHandle<'s>],
        owned: &'s [Raster<f64>],
    },
}

/// Heights and variables of a stack as seen during one run
#[derive(Debug, Clone, Copy)]
pub struct LevelView<'s> {
    variables: &'s [&'s Raster<f64>],
    heights: HeightSource<'s>,
    horizontal: ResamplingMethod,
}

impl<'s> LevelView<'s> {
    pub(crate) fn new(
        variables: &'s [&'s Raster<f64>],
        heights: HeightSource<'s>,
        horizontal: ResamplingMethod,
    ) -> Self {
        Self {
            variables,
            heights,
            horizontal,
        }
    }

    pub fn count(&self) -> usize {
        self.variables.len()
    }

    pub fn horizontal(&self) -> ResamplingMethod {
        self.horizontal
    }

    /// Grid defining the level system geometry
    pub fn system(&self) -> Option<&'s Raster<f64>> {
        self.variables.first().copied()
    }

    /// Variable of `level` resampled at (x, y)
    pub fn variable(&self, x: f64, y: f64, level: usize) -> Option<f64> {
        self.variables.get(level)?.sample(x, y, self.horizontal)
    }

    /// Height of `level` at (x, y)
    pub fn height(&self, x: f64, y: f64, level: usize) -> Option<f64> {
        match self.heights {
            HeightSource::Table(table) => table.get(level).copied(),
            HeightSource::Grids { handles, owned } => handles
                .get(level)?
                .resolve(owned)?
                .sample(x, y, self.horizontal),
        }
    }

    /// (height, value) of `level` when both are valid
    pub fn sample(&self, x: f64, y: f64, level: usize) -> Option<(f64, f64)> {
        let height = self.height(x, y, level)?;
        let value = self.variable(x, y, level)?;
        Some((height, value))
    }

    /// All valid (height, value) pairs at (x, y), sorted by height
    pub fn values_table(&self, x: f64, y: f64) -> Vec<(f64, f64)> {
        let mut table: Vec<(f64, f64)> = (0..self.count())
            .filter_map(|level| self.sample(x, y, level))
            .collect();
        table.sort_by(|a, b| a.0.total_cmp(&b.0));
        table
    }
}
