//! Scratch-buffer pixel editing for tilepaint
//!
//! Drawing happens in three phases per gesture: [`PixelEditor::begin`] seeds
//! a scratch buffer from the edit target, [`PixelEditor::update`] applies
//! rasterization primitives and recomposites into the caller's visible
//! bitmap, and [`PixelEditor::commit`] writes the result into the atlas or
//! layer bitmap atomically, once per gesture rather than once per mouse move.

mod buffer;
mod engine;
pub mod raster;

pub use buffer::{Pixel, PixelBuffer, TRANSPARENT};
pub use engine::{BrushOp, CommitOutcome, EditError, PixelEditor};
