// Mon Oct 19 2026 - Alex

use crate::graphics::palette::SPRITE_BANK_START;
use crate::memory::dump::OAM_TABLE_SIZE;
use crate::memory::ByteView;
use std::collections::BTreeMap;

pub const OAM_ENTRY_SIZE: usize = 4;
pub const OAM_ENTRY_COUNT: usize = OAM_TABLE_SIZE / OAM_ENTRY_SIZE;
/// Sprites at or below this Y line are parked off-screen.
pub const OFFSCREEN_Y: u8 = 0xE0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OamEntry {
    pub index: usize,
    pub x: u8,
    pub y: u8,
    pub tile: u8,
    pub attributes: u8,
}

impl OamEntry {
    pub fn is_on_screen(&self) -> bool {
        self.y < OFFSCREEN_Y
    }

    /// CGRAM bank used by this sprite: low three attribute bits, offset into
    /// the sprite half of CGRAM.
    pub fn cgram_bank(&self) -> usize {
        (self.attributes & 0x07) as usize + SPRITE_BANK_START
    }

    pub fn priority(&self) -> u8 {
        (self.attributes >> 4) & 0x03
    }

    pub fn flip_x(&self) -> bool {
        self.attributes & 0x40 != 0
    }

    pub fn flip_y(&self) -> bool {
        self.attributes & 0x80 != 0
    }
}

/// Parsed low OAM table.
#[derive(Debug, Clone, Default)]
pub struct OamTable {
    entries: Vec<OamEntry>,
}

impl OamTable {
    /// Reads up to 128 four-byte entries. A trailing partial entry is
    /// zero-padded like every other short buffer.
    pub fn parse(data: &[u8]) -> Self {
        let view = ByteView::new(data);
        let len = data.len().min(OAM_TABLE_SIZE);
        let count = (len + OAM_ENTRY_SIZE - 1) / OAM_ENTRY_SIZE;

        let entries = (0..count)
            .map(|index| {
                let base = index * OAM_ENTRY_SIZE;
                OamEntry {
                    index,
                    x: view.read_or_zero(base),
                    y: view.read_or_zero(base + 1),
                    tile: view.read_or_zero(base + 2),
                    attributes: view.read_or_zero(base + 3),
                }
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[OamEntry] {
        &self.entries
    }

    pub fn on_screen(&self) -> impl Iterator<Item = &OamEntry> {
        self.entries.iter().filter(|e| e.is_on_screen())
    }

    /// Sorted, de-duplicated CGRAM banks referenced by on-screen sprites.
    pub fn active_banks(&self) -> Vec<usize> {
        self.bank_usage().into_keys().collect()
    }

    /// On-screen sprite count per CGRAM bank.
    pub fn bank_usage(&self) -> BTreeMap<usize, usize> {
        let mut usage = BTreeMap::new();
        for entry in self.on_screen() {
            *usage.entry(entry.cgram_bank()).or_insert(0) += 1;
        }
        usage
    }
}
