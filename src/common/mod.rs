//! Shared primitives: bit buffers, module grids, GF(256)/Reed-Solomon,
//! perspective transform and grid sampling.

mod bits;
mod matrix;
mod perspective;
pub mod reedsolomon;
mod sampler;

pub use bits::{BitArray, BitSource, BitVector};
pub use matrix::{BitMatrix, ByteMatrix};
pub use perspective::PerspectiveTransform;
pub use sampler::{grid_sampler, install_grid_sampler, DefaultGridSampler, GridSampler};
