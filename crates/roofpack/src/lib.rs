//! # roofpack
//!
//! Rooftop segmentation and solar panel placement on aerial imagery.
//!
//! The pipeline has two halves:
//!
//! 1. **Mask**: contours from an Otsu threshold and from a Canny edge map
//!    are filtered by edge support, drawn as outlines, and ANDed into a
//!    rooftop mask ([`pipeline::analyze_rooftop`]).
//! 2. **Pack**: a rotated grid of panel-array footprints is tested against
//!    the (upsampled) mask and accepted footprints are rendered with one
//!    separator per panel ([`pack::pack`]).
//!
//! ## Rust Lesson #7: Modules
//!
//! Every module is declared here explicitly; `pub use` lifts the handful of
//! types most callers need to the crate root so they can write
//! `roofpack::PanelLayout` instead of `roofpack::pack::PanelLayout`.

pub mod config;
pub mod containment;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod io;
pub mod line;
pub mod mask;
pub mod pack;
pub mod pipeline;
pub mod pyramid;
pub mod vision;

// Re-export common types at crate root for convenience.
pub use config::{MaskConfig, PipelineConfig};
pub use containment::{point_in_polygon, Containment};
pub use error::{Result, RoofError};
pub use geometry::{rotate_points, Footprint, GridPoint, Point, Polygon};
pub use line::{rasterize_line, LineSample};
pub use mask::{compose, polygon_raster, ContourFilter};
pub use pack::{pack, OccupancyScan, PackerOptions, PackingSession, PanelLayout};
pub use pipeline::{analyze_rooftop, pack_mask, place_panels, RooftopAnalysis};
pub use pyramid::pyr_up;
pub use vision::BilateralSmoothing;
