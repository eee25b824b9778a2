// Mon Oct 19 2026 - Alex

pub mod canvas;
pub mod export;
pub mod oam;
pub mod palette;
pub mod tile;

pub use canvas::{assemble_canvas, disassemble_canvas, PixelCanvas};
pub use export::{ExtractionMetadata, PaletteDocument};
pub use oam::{OamEntry, OamTable};
pub use palette::{bank_label, sprite_banks, unpack_color_table, PaletteBank, Rgb};
pub use tile::{decode_tile, decode_tiles, encode_tile, PixelGrid, TileBlock};

/// Decodes `byte_len` bytes of tile data at `offset` into a canvas.
pub fn extract_canvas(data: &[u8], offset: usize, byte_len: usize, tiles_per_row: usize) -> PixelCanvas {
    let view = crate::memory::ByteView::new(data);
    let tiles = decode_tiles(view.clipped(offset, byte_len));
    assemble_canvas(&tiles, tiles_per_row)
}

/// Canvas back to raw 4bpp tile bytes, for the injection side.
pub fn encode_canvas(canvas: &PixelCanvas) -> Vec<u8> {
    tile::encode_tiles(&disassemble_canvas(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vram_tile_scenario() {
        let mut vram = vec![0u8; 0x10000];
        vram[0xC000] = 0x80;
        vram[0xC000 + 17] = 0x80;

        let canvas = extract_canvas(&vram, 0xC000, 32, 16);
        assert_eq!(canvas.get(0, 0), Some(9));
        assert_eq!(canvas.get(1, 0), Some(0));

        let tile = TileBlock::read(&vram, 0xC000).decode();
        assert_eq!(tile[0][0], 9);
        assert_eq!(tile[0][1], 0);
    }

    #[test]
    fn test_canvas_encode_round_trip() {
        let data: Vec<u8> = (0..32 * 4).map(|i| (i * 31 % 251) as u8).collect();
        let canvas = extract_canvas(&data, 0, data.len(), 2);
        assert_eq!(encode_canvas(&canvas), data);
    }

    #[test]
    fn test_extract_past_end_is_empty() {
        let canvas = extract_canvas(&[0u8; 64], 128, 32, 16);
        assert_eq!(canvas.height(), 0);
    }
}
