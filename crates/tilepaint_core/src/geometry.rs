//! Coordinate mapping between world pixels, grid cells, and view space

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected geometry configuration.
///
/// Every constructor in this crate validates its geometry up front, so an
/// offending call fails before any bitmap exists or is mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("grid cell size must be positive, got {width}x{height}")]
    InvalidGridSize { width: u32, height: u32 },
    #[error("tile size must be positive, got {width}x{height}")]
    InvalidTileSize { width: u32, height: u32 },
    #[error("tileset must have at least one column")]
    NoColumns,
    #[error("viewport scale must be positive, got {0}")]
    InvalidScale(f32),
    #[error(
        "source bitmap is {width}x{height}, not a multiple of the {tile_width}x{tile_height} tile size"
    )]
    UnalignedImport {
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    },
}

/// Pixel size of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::InvalidGridSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Cell containing a world-space point.
    ///
    /// Uses the ceil-then-minus-one form: a point exactly on a cell boundary
    /// belongs to the cell whose lower edge it touches, not the one below or
    /// to the right. Every drawing tool chains this, so the rounding is part
    /// of the contract.
    pub fn world_to_cell(&self, point: Vec2) -> IVec2 {
        IVec2::new(
            (point.x / self.width as f32).ceil() as i32 - 1,
            (point.y / self.height as f32).ceil() as i32 - 1,
        )
    }

    /// World-space center of a cell. Exact inverse of [`Grid::world_to_cell`]
    /// for every integer cell.
    pub fn cell_to_world(&self, cell: IVec2) -> Vec2 {
        self.cell_origin(cell) + Vec2::new(self.width as f32, self.height as f32) / 2.0
    }

    /// World-space top-left corner of a cell (rect placement anchor).
    pub fn cell_origin(&self, cell: IVec2) -> Vec2 {
        Vec2::new(
            (cell.x * self.width as i32) as f32,
            (cell.y * self.height as i32) as f32,
        )
    }
}

/// View transform applied on top of an optional per-layer pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, scale: f32) -> Result<Self, GeometryError> {
        if !(scale > 0.0) {
            return Err(GeometryError::InvalidScale(scale));
        }
        Ok(Self { x, y, scale })
    }

    /// Map a screen-space point into layer-local pixel space.
    pub fn to_local(&self, point: Vec2, offset: IVec2) -> Vec2 {
        Vec2::new(
            (point.x - offset.x as f32 * self.scale - self.x) / self.scale,
            (point.y - offset.y as f32 * self.scale - self.y) / self.scale,
        )
    }
}
