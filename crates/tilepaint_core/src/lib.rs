//! Core data structures for tilepaint
//!
//! This crate provides the fundamental types for the pixel-editing core:
//! - `Tileset` - Deduplicating, content-addressed packed tile atlas
//! - `Layer` - A single layer (tile-backed or image-backed)
//! - `Project` - Self-contained bundle of the shared atlas and its layers
//! - `Grid` / `Viewport` - Exact coordinate mapping between spaces
//!
//! Rendering, input translation, and storage live in the embedding
//! application; this crate only hands encoded bitmaps across that boundary.

pub mod bitmap;
mod geometry;
mod layer;
mod project;
mod tileset;

pub use geometry::{GeometryError, Grid, Viewport};
pub use layer::{Layer, LayerData, OPAQUE};
pub use project::{Project, ProjectError};
pub use tileset::{
    remap_gid, AtlasError, TileImport, TileRect, Tileset, DEFAULT_FIRST_GID,
};
