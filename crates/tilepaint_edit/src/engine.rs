//! Gesture-scoped pixel editing against a scratch buffer
//!
//! One press-move-release gesture edits exactly one target: a tile rectangle
//! of the shared atlas, or the whole bitmap of an image-backed layer. All
//! intermediate drawing happens in the scratch buffer and is recomposited
//! into the caller's visible bitmap; the atlas and the persisted layer data
//! change only at commit, exactly once per gesture. An abandoned gesture
//! leaves both byte-identical to their pre-gesture state.

use crate::buffer::{Pixel, PixelBuffer};
use crate::raster;
use glam::{IVec2, Vec2};
use image::RgbaImage;
use log::{debug, warn};
use thiserror::Error;
use tilepaint_core::{bitmap, AtlasError, GeometryError, Grid, LayerData, Project};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("a gesture is already in progress")]
    GestureInFlight,
    #[error("no gesture in progress")]
    NoActiveGesture,
    #[error("unknown layer {0}")]
    UnknownLayer(Uuid),
    #[error("cell ({x}, {y}) is outside the layer")]
    OutOfBounds { x: i32, y: i32 },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
}

/// One rasterization step of an active gesture, in target-local pixel
/// coordinates. Erasing is a `Point`/`Line` with [`crate::TRANSPARENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushOp {
    Point { pos: IVec2, size: u32, color: Pixel },
    Line { from: IVec2, to: IVec2, size: u32, color: Pixel },
    Fill { pos: IVec2, color: Pixel },
    Brightness { delta: i16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditTarget {
    /// One tile rect of the shared atlas. `gid` is `None` while the edited
    /// cell is empty; commit mints one.
    Tile {
        layer_id: Uuid,
        cell: IVec2,
        gid: Option<u32>,
    },
    /// The whole bitmap of an image-backed layer.
    Image { layer_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum GestureState {
    #[default]
    Idle,
    Editing {
        target: EditTarget,
        scratch: PixelBuffer,
    },
}

/// What a committed gesture hands back to the layer-store and persistence
/// collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub layer_id: Uuid,
    /// Re-encoded atlas after a tile commit.
    pub atlas_png: Option<Vec<u8>>,
    /// Gid minted because the edited cell was previously empty.
    pub minted_gid: Option<u32>,
    /// Re-encoded layer bitmap after an image-layer commit.
    pub layer_png: Option<Vec<u8>>,
}

/// The press-move-release editing state machine.
///
/// Gestures are strictly serialized: [`PixelEditor::begin`] refuses while one
/// is active, and there is exactly one scratch buffer per active gesture.
#[derive(Debug, Default)]
pub struct PixelEditor {
    state: GestureState,
}

impl PixelEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, GestureState::Editing { .. })
    }

    /// Start a gesture on `layer_id` at a layer-local point.
    ///
    /// Tile-backed layers resolve the point to a cell and seed the scratch
    /// buffer with that tile's current pixels (blank for an empty cell), so
    /// partial edits compose against the real picture. Image-backed layers
    /// seed from the whole layer bitmap.
    pub fn begin(&mut self, project: &Project, layer_id: Uuid, point: Vec2) -> Result<(), EditError> {
        if self.is_editing() {
            return Err(EditError::GestureInFlight);
        }
        let layer = project.layer(layer_id).ok_or(EditError::UnknownLayer(layer_id))?;
        let (target, scratch) = match &layer.data {
            LayerData::Tiles { .. } => {
                let tileset = &project.tileset;
                let grid = Grid::new(tileset.tile_width, tileset.tile_height)?;
                let cell = grid.world_to_cell(point);
                if cell.x < 0
                    || cell.y < 0
                    || cell.x >= layer.width as i32
                    || cell.y >= layer.height as i32
                {
                    return Err(EditError::OutOfBounds { x: cell.x, y: cell.y });
                }
                let mut gid = layer.gid_at(cell.x as u32, cell.y as u32);
                if let Some(g) = gid {
                    if !tileset.contains_gid(g) {
                        warn!(
                            "cell ({}, {}) references dangling gid {g}; editing it as empty",
                            cell.x, cell.y
                        );
                        gid = None;
                    }
                }
                let scratch = match gid {
                    Some(g) => PixelBuffer::from_image(&tileset.read_tile(g)?),
                    None => PixelBuffer::new(tileset.tile_width, tileset.tile_height),
                };
                (EditTarget::Tile { layer_id, cell, gid }, scratch)
            }
            LayerData::Image { image } => {
                (EditTarget::Image { layer_id }, PixelBuffer::from_image(image))
            }
        };
        self.state = GestureState::Editing { target, scratch };
        Ok(())
    }

    /// Apply one primitive to the scratch buffer and recomposite it into the
    /// caller's visible layer bitmap. The atlas is untouched until commit, so
    /// an interrupted gesture can never leave it partially drawn.
    pub fn update(&mut self, op: BrushOp, visible: &mut RgbaImage) -> Result<(), EditError> {
        let GestureState::Editing { target, scratch } = &mut self.state else {
            return Err(EditError::NoActiveGesture);
        };
        match op {
            BrushOp::Point { pos, size, color } => raster::draw_point(scratch, pos, size, color),
            BrushOp::Line { from, to, size, color } => {
                raster::draw_line(scratch, from, to, size, color)
            }
            BrushOp::Fill { pos, color } => raster::flood_fill(scratch, pos, color),
            BrushOp::Brightness { delta } => raster::adjust_brightness(scratch, delta),
        }
        let at = match target {
            EditTarget::Tile { cell, .. } => IVec2::new(
                cell.x * scratch.width() as i32,
                cell.y * scratch.height() as i32,
            ),
            EditTarget::Image { .. } => IVec2::ZERO,
        };
        scratch.blit_into(visible, at);
        Ok(())
    }

    /// Write the scratch buffer through and end the gesture.
    ///
    /// Exactly one encode-and-persist per gesture, independent of how many
    /// update steps ran: an occupied tile slot is overwritten in place, an
    /// empty slot first mints a gid via the atlas and records it in the
    /// layer's cells, and an image layer replaces its bitmap.
    pub fn commit(&mut self, project: &mut Project) -> Result<CommitOutcome, EditError> {
        // The layer must still exist before any atlas mutation happens.
        let layer_id = match &self.state {
            GestureState::Editing { target: EditTarget::Tile { layer_id, .. }, .. }
            | GestureState::Editing { target: EditTarget::Image { layer_id }, .. } => *layer_id,
            GestureState::Idle => return Err(EditError::NoActiveGesture),
        };
        if project.layer(layer_id).is_none() {
            self.state = GestureState::Idle;
            return Err(EditError::UnknownLayer(layer_id));
        }

        let GestureState::Editing { target, scratch } = std::mem::take(&mut self.state) else {
            return Err(EditError::NoActiveGesture);
        };
        match target {
            EditTarget::Tile { layer_id, cell, gid } => {
                let pixels = scratch.to_image();
                let (blob, minted) = match gid {
                    Some(g) => (project.tileset.write_tile(g, &pixels)?, None),
                    None => {
                        let (blob, g) = project.tileset.create_tile_from_pixels(&pixels)?;
                        if let Some(layer) = project.layer_mut(layer_id) {
                            layer.set_gid(cell.x as u32, cell.y as u32, Some(g));
                        }
                        (blob, Some(g))
                    }
                };
                debug!(
                    "committed tile gesture on layer {layer_id} cell ({}, {})",
                    cell.x, cell.y
                );
                Ok(CommitOutcome {
                    layer_id,
                    atlas_png: Some(blob),
                    minted_gid: minted,
                    layer_png: None,
                })
            }
            EditTarget::Image { layer_id } => {
                let image = scratch.to_image();
                let blob = bitmap::encode_png(&image).map_err(AtlasError::from)?;
                if let Some(layer) = project.layer_mut(layer_id) {
                    if let LayerData::Image { image: stored } = &mut layer.data {
                        *stored = image;
                    }
                }
                debug!("committed image gesture on layer {layer_id}");
                Ok(CommitOutcome {
                    layer_id,
                    atlas_png: None,
                    minted_gid: None,
                    layer_png: Some(blob),
                })
            }
        }
    }

    /// Discard the gesture. Not an error path: the atlas and layer data were
    /// never touched, so there is nothing to roll back.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}
