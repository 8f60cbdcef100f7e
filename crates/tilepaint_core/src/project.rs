//! Project - bundles the shared tile atlas with its layer list
//!
//! The atlas is a single resource shared by every tile-backed layer, so the
//! cross-cutting operations live here: deleting a tile compacts the atlas and
//! remaps every layer's references in one step, and the integrity audit walks
//! all layers against the atlas.

use crate::layer::Layer;
use crate::tileset::{AtlasError, Tileset};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    #[error("layer {layer} cell ({x}, {y}) references gid {gid} beyond the atlas")]
    DanglingReference { layer: Uuid, x: u32, y: u32, gid: u32 },
}

/// A self-contained editing project: one shared atlas plus its layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Format version for future compatibility
    pub version: u32,
    pub tileset: Tileset,
    pub layers: Vec<Layer>,
}

impl Project {
    pub fn new(tileset: Tileset) -> Self {
        Self {
            version: 1,
            tileset,
            layers: Vec::new(),
        }
    }

    /// Get a layer by ID
    pub fn layer(&self, id: Uuid) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Get a mutable layer by ID
    pub fn layer_mut(&mut self, id: Uuid) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Remove a layer by ID
    pub fn remove_layer(&mut self, id: Uuid) -> Option<Layer> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .map(|pos| self.layers.remove(pos))
    }

    /// Move a layer up (toward index 0)
    pub fn move_layer_up(&mut self, index: usize) -> bool {
        if index > 0 && index < self.layers.len() {
            self.layers.swap(index, index - 1);
            true
        } else {
            false
        }
    }

    /// Move a layer down (toward higher index)
    pub fn move_layer_down(&mut self, index: usize) -> bool {
        if index < self.layers.len().saturating_sub(1) {
            self.layers.swap(index, index + 1);
            true
        } else {
            false
        }
    }

    /// Toggle layer visibility
    pub fn toggle_layer_visibility(&mut self, index: usize) -> bool {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.visible = !layer.visible;
            true
        } else {
            false
        }
    }

    /// Delete a tile and remap every layer reference in one step.
    ///
    /// The atlas shrink and the per-layer gid slide-down are one operation
    /// from the caller's view; nothing observes the intermediate state.
    /// Deleting the last remaining tile degrades to clearing its pixels; the
    /// gid stays valid and layer references are untouched.
    pub fn delete_tile(&mut self, gid: u32) -> Result<Vec<u8>, AtlasError> {
        match self.tileset.delete_tile(gid)? {
            Some(blob) => {
                for layer in &mut self.layers {
                    layer.remap_after_delete(gid);
                }
                Ok(blob)
            }
            None => self.tileset.clear_tile(gid),
        }
    }

    /// Surface the first dangling tile reference, if any.
    pub fn validate(&self) -> Result<(), ProjectError> {
        for layer in &self.layers {
            if let Some(&(x, y, gid)) = layer.dangling_gids(&self.tileset).first() {
                return Err(ProjectError::DanglingReference {
                    layer: layer.id,
                    x,
                    y,
                    gid,
                });
            }
        }
        Ok(())
    }

    /// Drop all layers and replace the atlas content wholesale, keeping its
    /// geometry. Callers also reset their undo history on this lifecycle.
    pub fn clear(&mut self) {
        self.layers.clear();
        let tileset = &mut self.tileset;
        tileset.tile_count = 1;
        tileset.image = RgbaImage::new(tileset.columns * tileset.tile_width, tileset.tile_height);
    }
}
