//! Raster visualization of device floorplans and fixed placements.
//!
//! Two read-only renderers over the parsed models:
//!
//! - [`render_sitemap`] draws the device grid, one colored square per
//!   site, keyed by site type.
//! - [`render_fixed`] draws fixed-instance markers, keyed by master cell
//!   type, on an empty grid of the same extents.
//!
//! Both make a single linear pass over their inputs and return an
//! [`image::RgbaImage`] the caller can encode to PNG.

#![warn(missing_docs)]

pub mod palette;
pub mod render;

pub use render::{marker_colors, render_fixed, render_sitemap, site_colors, RenderOptions};
