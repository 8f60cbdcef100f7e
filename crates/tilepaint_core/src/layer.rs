//! Tile-backed and image-backed layers

use crate::bitmap::png_bytes;
use crate::tileset::{remap_gid, Tileset};
use glam::IVec2;
use image::RgbaImage;
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fully opaque layer opacity.
pub const OPAQUE: u8 = 255;

/// A single layer of the project.
///
/// `width`/`height` are in grid cells for tile-backed layers and in pixels
/// for image-backed layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: Uuid,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
    pub opacity: u8,
    /// Per-layer pixel offset applied by the view transform.
    #[serde(default)]
    pub offset: IVec2,
    pub data: LayerData,
}

/// The backing store of a layer: exactly one of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerData {
    /// Grid of atlas references; `None` is an empty cell.
    /// Cell `(x, y)` lives at index `x + width * y`.
    Tiles { cells: Vec<Option<u32>> },
    /// Freeform pixel bitmap, no tile semantics. PNG bytes across serde.
    Image {
        #[serde(with = "png_bytes")]
        image: RgbaImage,
    },
}

impl Layer {
    /// Create an empty tile-backed layer of `width x height` cells.
    pub fn new_tile_layer(name: String, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            width,
            height,
            visible: true,
            opacity: OPAQUE,
            offset: IVec2::ZERO,
            data: LayerData::Tiles {
                cells: vec![None; (width * height) as usize],
            },
        }
    }

    /// Create a transparent image-backed layer of `width x height` pixels.
    pub fn new_image_layer(name: String, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            width,
            height,
            visible: true,
            opacity: OPAQUE,
            offset: IVec2::ZERO,
            data: LayerData::Image {
                image: RgbaImage::new(width, height),
            },
        }
    }

    pub fn is_tile_backed(&self) -> bool {
        matches!(self.data, LayerData::Tiles { .. })
    }

    /// Gid at cell `(x, y)`; `None` for empty, out-of-bounds, or image layers.
    pub fn gid_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        match &self.data {
            LayerData::Tiles { cells } => cells.get((x + self.width * y) as usize).copied().flatten(),
            LayerData::Image { .. } => None,
        }
    }

    /// Set the gid at cell `(x, y)`; out-of-bounds and image layers are no-ops.
    pub fn set_gid(&mut self, x: u32, y: u32, gid: Option<u32>) {
        if x >= self.width || y >= self.height {
            return;
        }
        if let LayerData::Tiles { cells } = &mut self.data {
            let index = (x + self.width * y) as usize;
            if index < cells.len() {
                cells[index] = gid;
            }
        }
    }

    /// Apply the gid slide-down rule to every cell after a tile deletion.
    ///
    /// Must run on every tile-backed layer atomically with the atlas shrink,
    /// or references desynchronize. No-op on image layers.
    pub fn remap_after_delete(&mut self, deleted: u32) {
        if let LayerData::Tiles { cells } = &mut self.data {
            for cell in cells.iter_mut() {
                *cell = cell.and_then(|gid| remap_gid(gid, deleted));
            }
        }
    }

    /// Cells referencing gids beyond the atlas, as `(x, y, gid)`.
    ///
    /// Renderers treat such cells as empty; the audit surfaces them as the
    /// integrity bug they are instead of silently fixing them.
    pub fn dangling_gids(&self, tileset: &Tileset) -> Vec<(u32, u32, u32)> {
        let LayerData::Tiles { cells } = &self.data else {
            return Vec::new();
        };
        let mut dangling = Vec::new();
        for (index, cell) in cells.iter().enumerate() {
            if let Some(gid) = cell {
                if !tileset.contains_gid(*gid) {
                    let x = index as u32 % self.width;
                    let y = index as u32 / self.width;
                    warn!("layer {} cell ({x}, {y}) references dangling gid {gid}", self.name);
                    dangling.push((x, y, *gid));
                }
            }
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tile_layer() {
        let layer = Layer::new_tile_layer("Ground".to_string(), 10, 8);
        assert_eq!(layer.name, "Ground");
        assert!(layer.visible);
        assert_eq!(layer.opacity, OPAQUE);
        assert!(layer.is_tile_backed());

        if let LayerData::Tiles { cells } = &layer.data {
            assert_eq!(cells.len(), 80);
            assert!(cells.iter().all(|c| c.is_none()));
        } else {
            panic!("Expected tile layer");
        }
    }

    #[test]
    fn test_new_image_layer() {
        let layer = Layer::new_image_layer("Sketch".to_string(), 64, 32);
        assert!(!layer.is_tile_backed());

        if let LayerData::Image { image } = &layer.data {
            assert_eq!((image.width(), image.height()), (64, 32));
        } else {
            panic!("Expected image layer");
        }
    }

    #[test]
    fn test_cell_addressing() {
        let mut layer = Layer::new_tile_layer("Ground".to_string(), 4, 3);
        layer.set_gid(3, 2, Some(7));
        assert_eq!(layer.gid_at(3, 2), Some(7));

        if let LayerData::Tiles { cells } = &layer.data {
            assert_eq!(cells[3 + 4 * 2], Some(7));
        } else {
            panic!("Expected tile layer");
        }

        // Out of bounds reads and writes fall through.
        assert_eq!(layer.gid_at(4, 0), None);
        layer.set_gid(0, 3, Some(9));
        assert_eq!(layer.gid_at(0, 2), None);
    }

    #[test]
    fn test_remap_after_delete() {
        let mut layer = Layer::new_tile_layer("Ground".to_string(), 4, 1);
        layer.set_gid(0, 0, Some(1));
        layer.set_gid(1, 0, Some(2));
        layer.set_gid(2, 0, Some(3));

        layer.remap_after_delete(2);
        assert_eq!(layer.gid_at(0, 0), Some(1));
        assert_eq!(layer.gid_at(1, 0), None);
        assert_eq!(layer.gid_at(2, 0), Some(2));
        assert_eq!(layer.gid_at(3, 0), None);
    }

    #[test]
    fn test_remap_randomized_fixtures() {
        // The slide-down rule, checked cell by cell over random layers.
        for _ in 0..50 {
            let width = fastrand::u32(1..12);
            let height = fastrand::u32(1..12);
            let tile_count = fastrand::u32(2..20);
            let mut layer = Layer::new_tile_layer("r".to_string(), width, height);
            for y in 0..height {
                for x in 0..width {
                    if fastrand::bool() {
                        layer.set_gid(x, y, Some(fastrand::u32(1..=tile_count)));
                    }
                }
            }
            let before = layer.clone();
            let deleted = fastrand::u32(1..=tile_count);
            layer.remap_after_delete(deleted);

            for y in 0..height {
                for x in 0..width {
                    let expected = match before.gid_at(x, y) {
                        Some(r) if r == deleted => None,
                        Some(r) if r > deleted => Some(r - 1),
                        other => other,
                    };
                    assert_eq!(layer.gid_at(x, y), expected);
                }
            }
        }
    }

    #[test]
    fn test_dangling_audit() {
        let tileset = Tileset::new("t".to_string(), 16, 16, 2).unwrap();
        let mut layer = Layer::new_tile_layer("Ground".to_string(), 2, 2);
        layer.set_gid(0, 0, Some(1));
        layer.set_gid(1, 1, Some(5));

        assert_eq!(layer.dangling_gids(&tileset), vec![(1, 1, 5)]);
    }
}
