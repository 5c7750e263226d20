//! Moves staggered heights and winds onto cell centres and full levels.

use {
    crate::{
        constants::GRAVITY,
        error::Result,
        grid::{self, Dims, GridAccessor, MemoryOrder, LEVEL, SOUTH_NORTH, WEST_EAST},
    },
    log::debug,
    ndarray::{Array4, ArrayView4, Axis, Slice},
};

/// Heights and winds on unstaggered full levels, axes
/// `(time, level, south_north, west_east)`.
#[derive(Debug, Clone)]
pub struct Destaggered {
    /// Geopotential height of every staggered level (m), `n_half` levels;
    /// the topmost level bounds later interpolation
    pub height_staggered: Array4<f32>,
    /// Geopotential height (m)
    pub height: Array4<f32>,
    /// West-east wind (m s-1)
    pub u: Array4<f32>,
    /// South-north wind (m s-1)
    pub v: Array4<f32>,
    /// Vertical wind (m s-1)
    pub w: Array4<f32>,
    /// Vertical wind on the staggered levels, kept for the 10 m diagnostic
    pub w_staggered: Array4<f32>,
}

impl Destaggered {
    pub fn from_grid<G: GridAccessor>(grid: &G, dims: &Dims) -> Result<Self> {
        let ph = grid::field4(grid, "PH", MemoryOrder::BottomTopStaggered, dims)?;
        let phb = grid::field4(grid, "PHB", MemoryOrder::BottomTopStaggered, dims)?;
        let u = grid::field4(grid, "U", MemoryOrder::WestEastStaggered, dims)?;
        let v = grid::field4(grid, "V", MemoryOrder::SouthNorthStaggered, dims)?;
        let w = grid::field4(grid, "W", MemoryOrder::BottomTopStaggered, dims)?;

        debug!("destaggering {} staggered levels", dims.n_half);

        let height_staggered = staggered_height(ph.view(), phb.view());

        Ok(Destaggered {
            height: destagger(height_staggered.view(), LEVEL),
            height_staggered,
            u: destagger(u.view(), WEST_EAST),
            v: destagger(v.view(), SOUTH_NORTH),
            w: destagger(w.view(), LEVEL),
            w_staggered: w,
        })
    }
}

/// Height of the staggered levels from perturbation and base geopotential.
pub fn staggered_height(ph: ArrayView4<f32>, phb: ArrayView4<f32>) -> Array4<f32> {
    (&ph + &phb) / GRAVITY
}

/// Plain mean of every pair of neighbouring slices along `axis`, so the
/// result is one element shorter on that axis.
///
/// `field` must have at least one element along `axis`.
pub fn destagger(field: ArrayView4<f32>, axis: Axis) -> Array4<f32> {
    let n = field.len_of(axis);
    let lower = field.slice_axis(axis, Slice::from(..n - 1));
    let upper = field.slice_axis(axis, Slice::from(1..));

    (&lower + &upper) * 0.5
}
