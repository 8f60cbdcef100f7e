//! # tilepaint
//!
//! Pixel-editing core for tile-based map editors: a deduplicating packed
//! tile atlas, a scratch-buffer drawing engine with atomic commits, exact
//! world/cell/atlas coordinate mapping, and a reusable undo/redo engine.
//!
//! The surrounding application supplies windowing, input translation,
//! rendering, and storage; this workspace hands encoded bitmaps and layer
//! updates across that boundary and nothing else.
//!
//! ## Crate Structure
//!
//! This umbrella crate re-exports all tilepaint_* sub-crates:
//!
//! - [`core`] - Data model (Tileset, Layer, Project) and coordinate mapping
//! - [`edit`] - Scratch-buffer rasterizer and gesture engine
//! - [`history`] - Bounded, recipe-driven undo/redo

// =============================================================================
// Core module - data model and coordinate mapping
// =============================================================================

/// Core data types for the editing domain.
///
/// - [`Tileset`] - Deduplicating packed tile atlas
/// - [`Layer`] - Tile-backed or image-backed layer
/// - [`Project`] - Self-contained atlas + layer bundle
/// - [`Grid`] / [`Viewport`] - Exact coordinate mapping
pub mod core {
    pub use tilepaint_core::*;
}

pub use tilepaint_core::{
    remap_gid, AtlasError, GeometryError, Grid, Layer, LayerData, Project, ProjectError,
    TileImport, TileRect, Tileset, Viewport, DEFAULT_FIRST_GID, OPAQUE,
};

// =============================================================================
// Edit module - rasterizer and gesture engine
// =============================================================================

/// Scratch-buffer drawing with atomic per-gesture commits.
///
/// - [`PixelEditor`] - The press-move-release state machine
/// - [`BrushOp`] - Point, line, flood fill, brightness primitives
/// - [`PixelBuffer`] - Flat RGBA scratch buffer
pub mod edit {
    pub use tilepaint_edit::*;
}

pub use tilepaint_edit::{
    BrushOp, CommitOutcome, EditError, Pixel, PixelBuffer, PixelEditor, TRANSPARENT,
};

// =============================================================================
// History module - undo/redo engine
// =============================================================================

/// Recipe-driven undo/redo with bounded stacks.
///
/// - [`HistoryEngine`] - The dispatch-boundary wrapper
/// - [`RecipeTable`] - Per-action-kind invert/project configuration
pub mod history {
    pub use tilepaint_history::*;
}

pub use tilepaint_history::{HistoryAction, HistoryEngine, Recipe, RecipeTable, HISTORY_DEPTH};

// =============================================================================
// Prelude - import everything commonly needed
// =============================================================================

/// Commonly used types and traits.
///
/// Import with:
/// ```rust,ignore
/// use tilepaint::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BrushOp, Grid, HistoryAction, HistoryEngine, Layer, LayerData, PixelEditor, Project,
        RecipeTable, Tileset, Viewport, TRANSPARENT,
    };
}
