use bytes::Bytes;
use gamepack_core::prelude::*;
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// The distributable archive plus the manifests it was built from.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Suggested download name, `game_pack_<code>.zip`.
    pub file_name: String,
    pub data: Bytes,
    pub pack: PackManifest,
    pub sprite: SpriteManifest,
}

pub fn archive_name(game_code: &str) -> String {
    format!("game_pack_{game_code}.zip")
}

pub fn pack_entry(game_code: &str) -> String {
    format!("pack_{game_code}.json")
}

pub fn sprite_manifest_entry(game_code: &str) -> String {
    format!("sprite_{game_code}.json")
}

pub fn sprite_image_entry(game_code: &str) -> String {
    format!("sprite_{game_code}.png")
}

/// Writes the pack manifest, the sprite manifest and the raw sheet PNG into
/// one zip archive.
pub fn write_archive(
    game_code: &str,
    pack: &PackManifest,
    sprite: &SpriteManifest,
    png: &[u8],
) -> Result<Vec<u8>, BuildError> {
    let archive_err = |e: zip::result::ZipError| BuildError::Archive(e.to_string());
    let io_err = |e: std::io::Error| BuildError::Archive(e.to_string());
    let json_err = |e: serde_json::Error| BuildError::Archive(e.to_string());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file(pack_entry(game_code), options)
        .map_err(archive_err)?;
    zip.write_all(&serde_json::to_vec_pretty(pack).map_err(json_err)?)
        .map_err(io_err)?;

    zip.start_file(sprite_manifest_entry(game_code), options)
        .map_err(archive_err)?;
    zip.write_all(&serde_json::to_vec_pretty(sprite).map_err(json_err)?)
        .map_err(io_err)?;

    // Already compressed.
    let stored = options.compression_method(zip::CompressionMethod::Stored);
    zip.start_file(sprite_image_entry(game_code), stored)
        .map_err(archive_err)?;
    zip.write_all(png).map_err(io_err)?;

    Ok(zip.finish().map_err(archive_err)?.into_inner())
}
