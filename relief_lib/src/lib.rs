//!
//! Library for deterministic conversion of raster images into triangulated relief meshes.
//! Entry point is the [convert_image] function.
//!
//! The conversion is a synchronous pipeline of four pure stages: the input
//! image is decoded and reduced to a square single-channel intensity grid
//! ([intensity]), a per-pixel depth field in `[0, 1]` is estimated from edge
//! distance and brightness cues ([depth]), the depth grid is lifted into a
//! triangulated surface with UV coordinates ([mesh]) and per-vertex normals
//! and a bounding box are computed from the triangle adjacency. No state is
//! shared or cached between calls, identical inputs produce bit-identical
//! meshes.
//!

/// Re-export the version of nalgebra used by this crate
pub use nalgebra;

/// Estimation of depth fields from intensity grids
pub mod depth;
/// Row-major scalar grid storage shared by the pipeline stages
pub mod grid;
/// Image decoding and reduction to intensity grids
pub mod intensity;
/// Height-field triangulation and per-vertex normal computation
pub mod mesh;

mod aabb;
mod numeric_types;

use log::info;
use thiserror::Error as ThisError;

pub use aabb::Aabb3d;
pub use mesh::HeightFieldMesh;
pub use numeric_types::{Real, ThreadSafe};

/// Parameters for the image to mesh conversion
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters<R: Real> {
    /// Side length of the square depth grid the image is resampled to (has to be at least 2)
    pub resolution: usize,
    /// Scale factor mapping normalized depth values to world-space z displacement
    pub extrusion_height: R,
}

impl<R: Real> Default for Parameters<R> {
    fn default() -> Self {
        Self {
            resolution: 64,
            extrusion_height: R::from_f64_unchecked(0.2),
        }
    }
}

impl<R: Real> Parameters<R> {
    /// Tries to convert the parameters from one [Real] type to another [Real] type, returns None if conversion fails
    pub fn try_convert<T: Real>(&self) -> Option<Parameters<T>> {
        Some(Parameters {
            resolution: self.resolution,
            extrusion_height: self.extrusion_height.try_convert()?,
        })
    }
}

/// Error type returned when the image to mesh conversion fails
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum ConversionError {
    /// The image payload could not be parsed as a supported raster format
    #[error("image decoding: {0}")]
    Decode(#[from] image::ImageError),
    /// A numeric option was outside of its valid range
    #[error("invalid value for option \"{option}\": {reason}")]
    InvalidOption {
        /// Name of the offending option
        option: &'static str,
        /// Description of the violated constraint
        reason: String,
    },
    /// The depth grid has a dimension too small to triangulate
    #[error("degenerate input grid of dimensions {width}x{height}")]
    DegenerateInput {
        /// Number of grid columns
        width: usize,
        /// Number of grid rows
        height: usize,
    },
}

/// Converts an encoded raster image into a triangulated relief mesh
///
/// The conversion either returns a complete mesh satisfying all documented
/// invariants or an error, never a partial result. All errors are local and
/// non-retryable; any retry policy belongs to the caller. The function holds
/// no shared state, so independent calls can run concurrently without
/// synchronization.
pub fn convert_image<R: Real>(
    image_bytes: &[u8],
    parameters: &Parameters<R>,
) -> Result<HeightFieldMesh<R>, ConversionError> {
    info!(
        "Starting image to mesh conversion with a {0}x{0} grid.",
        parameters.resolution
    );

    let intensity = intensity::decode_intensity_grid::<R>(image_bytes, parameters.resolution)?;
    let depth = depth::estimate_depth(&intensity);
    mesh::triangulate_height_field(&depth, parameters.extrusion_height)
}
