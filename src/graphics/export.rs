// Mon Oct 19 2026 - Alex

use crate::graphics::palette::{PaletteBank, COLORS_PER_BANK};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub const PALETTE_FORMAT_VERSION: &str = "1.0";
pub const EXTRACTION_TOOL: &str = concat!("spritepal ", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteDocument {
    pub format_version: String,
    pub format_description: String,
    pub source: PaletteSource,
    pub palette: PaletteBody,
    pub usage_hints: UsageHints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteSource {
    pub source_image: String,
    pub palette_index: usize,
    pub extraction_tool: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteBody {
    pub name: String,
    pub description: String,
    pub colors: Vec<[u8; 3]>,
    pub color_count: usize,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageHints {
    pub transparent_index: usize,
    pub typical_use: String,
}

impl PaletteDocument {
    pub fn from_bank(bank: &PaletteBank, source_image: &str) -> Self {
        let label = bank.label();
        Self {
            format_version: PALETTE_FORMAT_VERSION.to_string(),
            format_description: "Indexed Pixel Editor Palette File".to_string(),
            source: PaletteSource {
                source_image: source_image.to_string(),
                palette_index: bank.index,
                extraction_tool: EXTRACTION_TOOL.to_string(),
            },
            palette: PaletteBody {
                name: label.name,
                description: label.description,
                colors: bank.colors.iter().map(|c| c.to_array()).collect(),
                color_count: COLORS_PER_BANK,
                format: "RGB888".to_string(),
            },
            usage_hints: UsageHints {
                transparent_index: 0,
                typical_use: if bank.is_sprite_bank() { "sprite" } else { "background" }.to_string(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        write_json(self, path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionParams {
    pub source: String,
    pub offset: usize,
    pub tile_count: usize,
    pub byte_size: usize,
    pub timestamp: String,
}

/// Companion document listing which file each exported bank went to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub palette_files: IndexMap<String, String>,
    pub extraction: ExtractionParams,
}

impl ExtractionMetadata {
    pub fn new(source: &str, offset: usize, tile_count: usize, byte_size: usize) -> Self {
        Self {
            palette_files: IndexMap::new(),
            extraction: ExtractionParams {
                source: source.to_string(),
                offset,
                tile_count,
                byte_size,
                timestamp: unix_timestamp(),
            },
        }
    }

    pub fn add_palette_file(&mut self, bank_index: usize, file_name: &str) {
        self.palette_files.insert(bank_index.to_string(), file_name.to_string());
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        write_json(self, path)
    }
}

fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn unix_timestamp() -> String {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", duration.as_secs(), duration.subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::palette::{unpack_color_table, Rgb};

    #[test]
    fn test_document_fields() {
        let mut cgram = vec![0u8; 512];
        cgram[256] = 0x7F;
        cgram[257] = 0x4E;
        cgram[258] = 0x7F;
        cgram[259] = 0x4E;
        let banks = unpack_color_table(&cgram);

        let doc = PaletteDocument::from_bank(&banks[8], "Cave.SnesCgRam.dmp");
        assert_eq!(doc.format_version, "1.0");
        assert_eq!(doc.source.palette_index, 8);
        assert_eq!(doc.palette.name, "Kirby");
        assert_eq!(doc.palette.colors.len(), 16);
        assert_eq!(doc.palette.colors[0], Rgb::new(248, 152, 152).to_array());
        assert_eq!(doc.palette.colors[1], Rgb::new(248, 152, 152).to_array());
        assert_eq!(doc.palette.colors[2], [0, 0, 0]);
        assert_eq!(doc.usage_hints.typical_use, "sprite");
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let banks = unpack_color_table(&[]);
        let doc = PaletteDocument::from_bank(&banks[2], "bg.dmp");
        let path = dir.path().join("palette_2.pal.json");
        doc.write_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: PaletteDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, doc);
        assert_eq!(parsed.palette.name, "Palette 2");
        assert_eq!(parsed.usage_hints.typical_use, "background");
    }

    #[test]
    fn test_metadata_keeps_insertion_order() {
        let mut meta = ExtractionMetadata::new("vram.dmp", 0xC000, 128, 4096);
        meta.add_palette_file(11, "sprite_11.pal.json");
        meta.add_palette_file(8, "sprite_8.pal.json");

        let json = serde_json::to_string(&meta).unwrap();
        let first = json.find("\"11\"").unwrap();
        let second = json.find("\"8\"").unwrap();
        assert!(first < second);
        assert_eq!(meta.extraction.offset, 0xC000);
    }
}
