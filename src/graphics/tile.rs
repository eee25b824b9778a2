// Mon Oct 19 2026 - Alex

use crate::memory::ByteView;
use rayon::prelude::*;

pub const TILE_WIDTH: usize = 8;
pub const TILE_HEIGHT: usize = 8;
pub const BYTES_PER_TILE: usize = 32;

/// Tiles below this count are decoded on the calling thread.
const PARALLEL_THRESHOLD: usize = 256;

/// 8x8 grid of 4-bit palette indices, `grid[row][col]`.
pub type PixelGrid = [[u8; TILE_WIDTH]; TILE_HEIGHT];

/// One 4bpp planar tile as stored in VRAM.
///
/// Rows interleave bitplanes 0/1 in the first 16 bytes and 2/3 in the
/// second 16; the most significant bit of each plane byte is the leftmost
/// pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBlock {
    bytes: [u8; BYTES_PER_TILE],
}

impl TileBlock {
    pub fn new(bytes: [u8; BYTES_PER_TILE]) -> Self {
        Self { bytes }
    }

    /// Slices a tile out of `data` at `offset`. Short input is zero-padded.
    pub fn read(data: &[u8], offset: usize) -> Self {
        Self {
            bytes: ByteView::new(data).read_array_or_zero(offset),
        }
    }

    pub fn bytes(&self) -> &[u8; BYTES_PER_TILE] {
        &self.bytes
    }

    pub fn decode(&self) -> PixelGrid {
        decode_tile(&self.bytes)
    }

    pub fn encode(grid: &PixelGrid) -> Self {
        Self {
            bytes: encode_tile(grid),
        }
    }
}

pub fn decode_tile(data: &[u8]) -> PixelGrid {
    let view = ByteView::new(data);
    let mut grid = [[0u8; TILE_WIDTH]; TILE_HEIGHT];

    for (y, row) in grid.iter_mut().enumerate() {
        let p0 = view.read_or_zero(y * 2);
        let p1 = view.read_or_zero(y * 2 + 1);
        let p2 = view.read_or_zero(y * 2 + 16);
        let p3 = view.read_or_zero(y * 2 + 17);

        for (x, pixel) in row.iter_mut().enumerate() {
            let bit = 7 - x;
            *pixel = ((p0 >> bit) & 1)
                | (((p1 >> bit) & 1) << 1)
                | (((p2 >> bit) & 1) << 2)
                | (((p3 >> bit) & 1) << 3);
        }
    }

    grid
}

/// Inverse of [`decode_tile`]. Only the low 4 bits of each pixel are stored.
pub fn encode_tile(grid: &PixelGrid) -> [u8; BYTES_PER_TILE] {
    let mut out = [0u8; BYTES_PER_TILE];

    for (y, row) in grid.iter().enumerate() {
        let mut planes = [0u8; 4];
        for (x, &pixel) in row.iter().enumerate() {
            let bit = 7 - x;
            for (plane, byte) in planes.iter_mut().enumerate() {
                *byte |= ((pixel >> plane) & 1) << bit;
            }
        }
        out[y * 2] = planes[0];
        out[y * 2 + 1] = planes[1];
        out[y * 2 + 16] = planes[2];
        out[y * 2 + 17] = planes[3];
    }

    out
}

/// Number of tiles `len` bytes cover, counting a trailing partial tile.
pub fn tile_count(len: usize) -> usize {
    (len + BYTES_PER_TILE - 1) / BYTES_PER_TILE
}

/// Decodes every tile in `data`. A trailing partial tile is zero-padded.
pub fn decode_tiles(data: &[u8]) -> Vec<PixelGrid> {
    let count = tile_count(data.len());

    if count < PARALLEL_THRESHOLD {
        (0..count)
            .map(|i| TileBlock::read(data, i * BYTES_PER_TILE).decode())
            .collect()
    } else {
        (0..count)
            .into_par_iter()
            .map(|i| TileBlock::read(data, i * BYTES_PER_TILE).decode())
            .collect()
    }
}

pub fn encode_tiles(grids: &[PixelGrid]) -> Vec<u8> {
    let mut out = Vec::with_capacity(grids.len() * BYTES_PER_TILE);
    for grid in grids {
        out.extend_from_slice(&encode_tile(grid));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_random_tile(seed: u32) -> [u8; BYTES_PER_TILE] {
        let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
        let mut out = [0u8; BYTES_PER_TILE];
        for byte in out.iter_mut() {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            *byte = (state & 0xFF) as u8;
        }
        out
    }

    #[test]
    fn test_decode_plane_weights() {
        let mut bytes = [0u8; BYTES_PER_TILE];
        bytes[0] = 0x80;
        bytes[17] = 0x80;

        let grid = decode_tile(&bytes);
        assert_eq!(grid[0][0], 9);
        assert_eq!(grid[0][1], 0);

        bytes[1] = 0x01;
        bytes[16] = 0x01;
        let grid = decode_tile(&bytes);
        assert_eq!(grid[0][7], 6);
    }

    #[test]
    fn test_decode_short_buffer_pads_with_zero() {
        let grid = decode_tile(&[0xFF, 0xFF]);
        assert_eq!(grid[0], [3; 8]);
        for row in &grid[1..] {
            assert_eq!(*row, [0; 8]);
        }

        assert_eq!(decode_tile(&[]), [[0; 8]; 8]);
    }

    #[test]
    fn test_round_trip_many_tiles() {
        for seed in 0..512 {
            let bytes = pseudo_random_tile(seed);
            let grid = decode_tile(&bytes);
            assert_eq!(encode_tile(&grid), bytes, "seed {}", seed);
        }
    }

    #[test]
    fn test_round_trip_extremes() {
        for fill in [0x00u8, 0xFF, 0xAA, 0x55] {
            let bytes = [fill; BYTES_PER_TILE];
            assert_eq!(encode_tile(&decode_tile(&bytes)), bytes);
        }
    }

    #[test]
    fn test_pixels_stay_four_bit() {
        let grid = decode_tile(&[0xFF; BYTES_PER_TILE]);
        assert!(grid.iter().flatten().all(|&p| p == 15));
    }

    #[test]
    fn test_decode_tiles_counts_partial_tile() {
        let data = vec![0u8; BYTES_PER_TILE * 3 + 5];
        assert_eq!(decode_tiles(&data).len(), 4);
    }

    #[test]
    fn test_decode_tiles_parallel_matches_sequential() {
        let mut data = Vec::new();
        for seed in 0..(PARALLEL_THRESHOLD as u32 + 10) {
            data.extend_from_slice(&pseudo_random_tile(seed));
        }
        let grids = decode_tiles(&data);
        assert_eq!(grids.len(), PARALLEL_THRESHOLD + 10);
        assert_eq!(encode_tiles(&grids), data);
    }
}
