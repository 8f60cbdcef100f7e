//! PNG-backed helpers for moving RGBA bitmaps across the serde boundary
//!
//! Project files are self-contained: bitmaps travel inside the serialized
//! value as PNG bytes rather than as paths to sibling files.

use image::RgbaImage;
use std::io::Cursor;

/// Encode a bitmap as a PNG blob for the persistence boundary.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

/// Decode a PNG blob back into an RGBA bitmap.
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.to_rgba8())
}

/// `#[serde(with = "png_bytes")]` adapter for `RgbaImage` fields.
pub mod png_bytes {
    use image::RgbaImage;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(image: &RgbaImage, serializer: S) -> Result<S::Ok, S::Error> {
        let bytes = super::encode_png(image).map_err(S::Error::custom)?;
        bytes.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RgbaImage, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        super::decode_png(&bytes).map_err(D::Error::custom)
    }
}
