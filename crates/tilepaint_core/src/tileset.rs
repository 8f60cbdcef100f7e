//! Packed tile atlas with content-addressed tile management
//!
//! A [`Tileset`] owns a single packed bitmap holding every tile in row-major
//! order, plus the mapping from 1-based gids to pixel rectangles. The packing
//! invariant maintained by every mutating operation: the bitmap is exactly
//! `columns * tile_width` wide and `ceil(tile_count / columns) * tile_height`
//! tall, with no slack rows.
//!
//! Mutating operations re-encode the packed bitmap once and hand the PNG blob
//! back for the persistence boundary to version and store.

use crate::bitmap::{self, png_bytes};
use crate::geometry::GeometryError;
use image::{imageops, Rgba, RgbaImage};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Default gid of the first tile in an atlas.
pub const DEFAULT_FIRST_GID: u32 = 1;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("gid {0} is outside the atlas")]
    DanglingGid(u32),
    #[error("tile pixels are {got_width}x{got_height}, expected {want_width}x{want_height}")]
    TileSizeMismatch {
        got_width: u32,
        got_height: u32,
        want_width: u32,
        want_height: u32,
    },
    #[error("failed to encode atlas bitmap: {0}")]
    Encode(#[from] image::ImageError),
}

/// Pixel rectangle of one tile inside the packed bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Result of a bulk bitmap import with content dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImport {
    /// Gid per source partition in row-major order. `None` marks an all-zero
    /// partition ("no tile"); those are never minted or deduplicated.
    pub mapping: Vec<Option<u32>>,
    /// Partition grid size of the source bitmap, in tiles.
    pub columns: u32,
    pub rows: u32,
    /// Tiles actually appended after dedup.
    pub appended: u32,
    /// Encoded atlas after the import.
    pub blob: Vec<u8>,
}

/// A deduplicating, content-addressed tile atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    pub id: Uuid,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub first_gid: u32,
    pub tile_count: u32,
    /// The packed bitmap, PNG bytes across serde.
    #[serde(with = "png_bytes")]
    pub image: RgbaImage,
}

impl Tileset {
    /// Create an atlas holding a single blank tile at gid [`DEFAULT_FIRST_GID`].
    ///
    /// An atlas never holds fewer than one tile; [`Tileset::delete_tile`]
    /// refuses to remove the last one.
    pub fn new(
        name: String,
        tile_width: u32,
        tile_height: u32,
        columns: u32,
    ) -> Result<Self, GeometryError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(GeometryError::InvalidTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        if columns == 0 {
            return Err(GeometryError::NoColumns);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            tile_width,
            tile_height,
            columns,
            first_gid: DEFAULT_FIRST_GID,
            tile_count: 1,
            image: RgbaImage::new(columns * tile_width, tile_height),
        })
    }

    /// Highest gid currently in the atlas.
    pub fn last_gid(&self) -> u32 {
        self.first_gid + self.tile_count - 1
    }

    pub fn contains_gid(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid <= self.last_gid()
    }

    /// Bitmap height the packing invariant requires for the current count.
    pub fn packed_height(&self) -> u32 {
        self.tile_count.div_ceil(self.columns) * self.tile_height
    }

    /// Pixel rectangle of `gid`, row-major tile order.
    ///
    /// A gid outside the atlas returns `None`: renderers treat the cell as
    /// empty, but the dangling reference is an integrity bug and gets
    /// surfaced here rather than silently fixed.
    pub fn tile_rect(&self, gid: u32) -> Option<TileRect> {
        if !self.contains_gid(gid) {
            warn!(
                "dangling tile reference: gid {gid} outside {}..={}",
                self.first_gid,
                self.last_gid()
            );
            return None;
        }
        Some(self.slot_rect(gid - self.first_gid))
    }

    /// Rectangle of a 0-based slot index, with no occupancy check.
    fn slot_rect(&self, slot: u32) -> TileRect {
        TileRect {
            x: (slot % self.columns) * self.tile_width,
            y: (slot / self.columns) * self.tile_height,
            width: self.tile_width,
            height: self.tile_height,
        }
    }

    /// Encode the packed bitmap as a PNG blob.
    pub fn encode(&self) -> Result<Vec<u8>, AtlasError> {
        Ok(bitmap::encode_png(&self.image)?)
    }

    /// Append one blank tile and return `(blob, new_gid)`.
    ///
    /// The new gid is `first_gid + tile_count` (with the default first gid,
    /// `tile_count + 1`). Grows the bitmap if the new tile's row exceeds the
    /// current bounds; creation never shrinks it.
    pub fn create_empty_tile(&mut self) -> Result<(Vec<u8>, u32), AtlasError> {
        let blank = RgbaImage::new(self.tile_width, self.tile_height);
        self.create_tile_from_pixels(&blank)
    }

    /// Append one tile seeded with `pixels` and return `(blob, new_gid)`.
    pub fn create_tile_from_pixels(
        &mut self,
        pixels: &RgbaImage,
    ) -> Result<(Vec<u8>, u32), AtlasError> {
        self.check_tile_size(pixels)?;
        let gid = self.append_tile(pixels);
        debug!("created tile gid {gid} ({} tiles)", self.tile_count);
        Ok((self.encode()?, gid))
    }

    /// Append without re-encoding; bulk paths encode once at the end.
    fn append_tile(&mut self, pixels: &RgbaImage) -> u32 {
        let gid = self.first_gid + self.tile_count;
        self.tile_count += 1;
        self.grow_to_packed_height();
        let rect = self.slot_rect(gid - self.first_gid);
        imageops::replace(&mut self.image, pixels, i64::from(rect.x), i64::from(rect.y));
        gid
    }

    /// Copy of one tile's pixels.
    pub fn read_tile(&self, gid: u32) -> Result<RgbaImage, AtlasError> {
        let rect = self.tile_rect(gid).ok_or(AtlasError::DanglingGid(gid))?;
        Ok(imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height).to_image())
    }

    /// Overwrite one tile's pixels and return the re-encoded blob.
    pub fn write_tile(&mut self, gid: u32, pixels: &RgbaImage) -> Result<Vec<u8>, AtlasError> {
        self.check_tile_size(pixels)?;
        let rect = self.tile_rect(gid).ok_or(AtlasError::DanglingGid(gid))?;
        imageops::replace(&mut self.image, pixels, i64::from(rect.x), i64::from(rect.y));
        self.encode()
    }

    /// Zero one tile's pixels and return the re-encoded blob.
    pub fn clear_tile(&mut self, gid: u32) -> Result<Vec<u8>, AtlasError> {
        let rect = self.tile_rect(gid).ok_or(AtlasError::DanglingGid(gid))?;
        self.zero_rect(rect);
        self.encode()
    }

    /// Remove tile `gid`, sliding every later tile down one slot.
    ///
    /// Returns `Ok(None)` without touching anything when only one tile
    /// remains; callers treat "delete the last tile" as "clear its pixels,
    /// keep the gid". On success every layer reference must be adjusted with
    /// [`remap_gid`] atomically with this shrink, or references desynchronize.
    pub fn delete_tile(&mut self, gid: u32) -> Result<Option<Vec<u8>>, AtlasError> {
        if !self.contains_gid(gid) {
            return Err(AtlasError::DanglingGid(gid));
        }
        if self.tile_count <= 1 {
            return Ok(None);
        }
        // Increasing gid order: each source rect is copied before anything
        // overwrites it, so overlapping slots cannot corrupt.
        for g in gid + 1..=self.last_gid() {
            let src = self.slot_rect(g - self.first_gid);
            let dst = self.slot_rect(g - 1 - self.first_gid);
            let tile =
                imageops::crop_imm(&self.image, src.x, src.y, src.width, src.height).to_image();
            imageops::replace(&mut self.image, &tile, i64::from(dst.x), i64::from(dst.y));
        }
        self.tile_count -= 1;
        // The vacated last slot may survive the height recompute; it must not
        // keep stale pixels.
        let vacated = self.slot_rect(self.tile_count);
        self.zero_rect(vacated);
        self.shrink_to_packed_height();
        debug!("deleted tile gid {gid}, {} tiles remain", self.tile_count);
        Ok(Some(self.encode()?))
    }

    /// Partition `source` into tiles and append the unseen ones.
    ///
    /// Each partition's raw RGBA bytes are the content key: a byte-identical
    /// partition reuses the existing gid (equal bytes are definitionally the
    /// same tile, including alpha). The seen-map is seeded with the atlas's
    /// current tiles, so importing into a non-empty atlas reuses them too.
    /// An all-zero partition maps to `None` and is never minted.
    pub fn import_bitmap(&mut self, source: &RgbaImage) -> Result<TileImport, AtlasError> {
        if source.width() == 0
            || source.height() == 0
            || source.width() % self.tile_width != 0
            || source.height() % self.tile_height != 0
        {
            return Err(GeometryError::UnalignedImport {
                width: source.width(),
                height: source.height(),
                tile_width: self.tile_width,
                tile_height: self.tile_height,
            }
            .into());
        }
        let columns = source.width() / self.tile_width;
        let rows = source.height() / self.tile_height;

        let mut seen: HashMap<Vec<u8>, u32> = HashMap::new();
        for gid in self.first_gid..=self.last_gid() {
            let tile = self.read_tile(gid)?;
            seen.entry(tile.into_raw()).or_insert(gid);
        }

        let mut mapping = Vec::with_capacity((columns * rows) as usize);
        let mut appended = 0;
        for ty in 0..rows {
            for tx in 0..columns {
                let tile = imageops::crop_imm(
                    source,
                    tx * self.tile_width,
                    ty * self.tile_height,
                    self.tile_width,
                    self.tile_height,
                )
                .to_image();
                if tile.as_raw().iter().all(|&b| b == 0) {
                    mapping.push(None);
                    continue;
                }
                let gid = match seen.get(tile.as_raw()) {
                    Some(&gid) => gid,
                    None => {
                        let gid = self.append_tile(&tile);
                        appended += 1;
                        seen.insert(tile.into_raw(), gid);
                        gid
                    }
                };
                mapping.push(Some(gid));
            }
        }
        debug!("imported {}x{rows} partitions, {appended} tiles appended", columns);
        Ok(TileImport {
            mapping,
            columns,
            rows,
            appended,
            blob: self.encode()?,
        })
    }

    fn check_tile_size(&self, pixels: &RgbaImage) -> Result<(), AtlasError> {
        if pixels.width() != self.tile_width || pixels.height() != self.tile_height {
            return Err(AtlasError::TileSizeMismatch {
                got_width: pixels.width(),
                got_height: pixels.height(),
                want_width: self.tile_width,
                want_height: self.tile_height,
            });
        }
        Ok(())
    }

    fn zero_rect(&mut self, rect: TileRect) {
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                self.image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn grow_to_packed_height(&mut self) {
        let want = self.packed_height();
        if self.image.height() < want {
            let mut grown = RgbaImage::new(self.columns * self.tile_width, want);
            imageops::replace(&mut grown, &self.image, 0, 0);
            self.image = grown;
        }
    }

    fn shrink_to_packed_height(&mut self) {
        let want = self.packed_height();
        if self.image.height() > want {
            self.image =
                imageops::crop_imm(&self.image, 0, 0, self.image.width(), want).to_image();
        }
    }
}

/// Gid adjustment after `deleted` is removed from the atlas: the deleted gid
/// empties, later gids slide down one, earlier gids are unchanged.
pub fn remap_gid(reference: u32, deleted: u32) -> Option<u32> {
    match reference {
        r if r == deleted => None,
        r if r > deleted => Some(r - 1),
        r => Some(r),
    }
}
