// Mon Oct 19 2026 - Alex

use crate::graphics::palette::{PaletteBank, Rgb};
use crate::graphics::tile::{PixelGrid, TILE_HEIGHT, TILE_WIDTH};

pub const DEFAULT_TILES_PER_ROW: usize = 16;

/// Row-major grid of palette indices assembled from tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelCanvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = value & 0x0F;
        }
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Maps every index through `bank`, three bytes per pixel.
    pub fn to_rgb(&self, bank: &PaletteBank) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &index in &self.pixels {
            let Rgb { r, g, b } = bank.color(index as usize);
            out.extend_from_slice(&[r, g, b]);
        }
        out
    }

    /// Preview ramp used when no CGRAM is loaded: index 0 stays black,
    /// 1..=15 spread evenly over 17..=255.
    pub fn to_grayscale(&self) -> Vec<u8> {
        self.pixels.iter().map(|&p| grayscale_level(p)).collect()
    }
}

pub fn grayscale_level(index: u8) -> u8 {
    match index & 0x0F {
        0 => 0,
        i => (17 + (i as u32 - 1) * (255 - 17) / 14) as u8,
    }
}

/// Places tile `i` at `((i % tiles_per_row) * 8, (i / tiles_per_row) * 8)`.
/// Height rounds up to whole tile rows; uncovered cells stay 0.
pub fn assemble_canvas(tiles: &[PixelGrid], tiles_per_row: usize) -> PixelCanvas {
    let tiles_per_row = tiles_per_row.max(1);
    let rows = (tiles.len() + tiles_per_row - 1) / tiles_per_row;
    let mut canvas = PixelCanvas::new(tiles_per_row * TILE_WIDTH, rows * TILE_HEIGHT);
    let width = canvas.width;

    for (i, tile) in tiles.iter().enumerate() {
        let base_x = (i % tiles_per_row) * TILE_WIDTH;
        let base_y = (i / tiles_per_row) * TILE_HEIGHT;

        for (y, run) in tile.iter().enumerate() {
            let start = (base_y + y) * width + base_x;
            canvas.pixels[start..start + TILE_WIDTH].copy_from_slice(run);
        }
    }

    canvas
}

/// Splits a canvas back into tiles in row-major tile order. Edge tiles that
/// hang past the canvas are zero-padded.
pub fn disassemble_canvas(canvas: &PixelCanvas) -> Vec<PixelGrid> {
    let tiles_x = (canvas.width + TILE_WIDTH - 1) / TILE_WIDTH;
    let tiles_y = (canvas.height + TILE_HEIGHT - 1) / TILE_HEIGHT;
    let mut tiles = Vec::with_capacity(tiles_x * tiles_y);

    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut grid = [[0u8; TILE_WIDTH]; TILE_HEIGHT];
            for (y, run) in grid.iter_mut().enumerate() {
                let py = ty * TILE_HEIGHT + y;
                if py >= canvas.height {
                    break;
                }
                let px = tx * TILE_WIDTH;
                let n = TILE_WIDTH.min(canvas.width - px);
                let start = py * canvas.width + px;
                run[..n].copy_from_slice(&canvas.pixels[start..start + n]);
            }
            tiles.push(grid);
        }
    }

    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::palette::PaletteBank;

    fn solid(value: u8) -> PixelGrid {
        [[value; TILE_WIDTH]; TILE_HEIGHT]
    }

    #[test]
    fn test_dimensions_round_up() {
        let tiles = vec![solid(1); 5];
        let canvas = assemble_canvas(&tiles, 4);
        assert_eq!(canvas.width(), 32);
        assert_eq!(canvas.height(), 16);
        assert_eq!(canvas.get(8, 8), Some(0));
        assert_eq!(canvas.get(0, 8), Some(1));
    }

    #[test]
    fn test_tile_placement() {
        let tiles: Vec<PixelGrid> = (0..4u8).map(solid).collect();
        let canvas = assemble_canvas(&tiles, 2);
        assert_eq!(canvas.get(0, 0), Some(0));
        assert_eq!(canvas.get(8, 0), Some(1));
        assert_eq!(canvas.get(0, 8), Some(2));
        assert_eq!(canvas.get(15, 15), Some(3));
        assert_eq!(canvas.get(16, 0), None);
    }

    #[test]
    fn test_disassemble_inverts_assemble() {
        let mut tiles = Vec::new();
        for i in 0..6u8 {
            let mut grid = solid(0);
            grid[i as usize % 8][7 - i as usize] = i + 1;
            tiles.push(grid);
        }
        let canvas = assemble_canvas(&tiles, 3);
        assert_eq!(disassemble_canvas(&canvas), tiles);
    }

    #[test]
    fn test_empty_tile_list() {
        let canvas = assemble_canvas(&[], 16);
        assert_eq!(canvas.height(), 0);
        assert!(canvas.pixels().is_empty());
    }

    #[test]
    fn test_grayscale_ramp() {
        assert_eq!(grayscale_level(0), 0);
        assert_eq!(grayscale_level(1), 17);
        assert_eq!(grayscale_level(15), 255);
    }

    #[test]
    fn test_to_rgb_uses_bank() {
        let mut bank = PaletteBank::black(8);
        bank.colors[1] = Rgb::new(248, 152, 152);
        let canvas = assemble_canvas(&[solid(1)], 1);
        let rgb = canvas.to_rgb(&bank);
        assert_eq!(rgb.len(), 64 * 3);
        assert_eq!(&rgb[..3], &[248, 152, 152]);
    }
}
