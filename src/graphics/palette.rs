// Mon Oct 19 2026 - Alex

use crate::memory::ByteView;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const COLORS_PER_BANK: usize = 16;
pub const BANK_COUNT: usize = 16;
pub const SPRITE_BANK_START: usize = 8;
pub const COLOR_TABLE_SIZE: usize = BANK_COUNT * COLORS_PER_BANK * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Expands a 15-bit BGR value. Channels scale by 8, so the brightest
    /// producible value is 248, not 255. Existing palette files depend on
    /// these exact values.
    pub fn from_bgr555(value: u16) -> Self {
        Self {
            r: ((value & 0x1F) * 8) as u8,
            g: (((value >> 5) & 0x1F) * 8) as u8,
            b: (((value >> 10) & 0x1F) * 8) as u8,
        }
    }

    /// Packs back to BGR555, dropping the low three bits of each channel.
    pub fn to_bgr555(&self) -> u16 {
        (self.r as u16 >> 3) | ((self.g as u16 >> 3) << 5) | ((self.b as u16 >> 3) << 10)
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// One 16-color palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteBank {
    pub index: usize,
    pub colors: [Rgb; COLORS_PER_BANK],
}

impl PaletteBank {
    pub fn black(index: usize) -> Self {
        Self {
            index,
            colors: [Rgb::BLACK; COLORS_PER_BANK],
        }
    }

    pub fn color(&self, i: usize) -> Rgb {
        self.colors.get(i).copied().unwrap_or(Rgb::BLACK)
    }

    pub fn is_sprite_bank(&self) -> bool {
        self.index >= SPRITE_BANK_START && self.index < BANK_COUNT
    }

    pub fn label(&self) -> BankLabel {
        bank_label(self.index)
    }
}

/// Unpacks a CGRAM color table into its 16 banks.
///
/// Entry `bank * 16 + i` lives at byte `(bank * 16 + i) * 2`, little-endian.
/// Entries past the end of `data` come out black.
pub fn unpack_color_table(data: &[u8]) -> [PaletteBank; BANK_COUNT] {
    let view = ByteView::new(data);
    std::array::from_fn(|bank| {
        let colors = std::array::from_fn(|i| {
            let offset = (bank * COLORS_PER_BANK + i) * 2;
            Rgb::from_bgr555(view.read_u16_le_or_zero(offset))
        });
        PaletteBank { index: bank, colors }
    })
}

/// Inverse of [`unpack_color_table`] for a full set of banks.
pub fn pack_color_table(banks: &[PaletteBank]) -> Vec<u8> {
    let mut out = vec![0u8; COLOR_TABLE_SIZE];
    for bank in banks.iter().filter(|b| b.index < BANK_COUNT) {
        for (i, color) in bank.colors.iter().enumerate() {
            let offset = (bank.index * COLORS_PER_BANK + i) * 2;
            out[offset..offset + 2].copy_from_slice(&color.to_bgr555().to_le_bytes());
        }
    }
    out
}

pub fn sprite_banks(banks: &[PaletteBank; BANK_COUNT]) -> &[PaletteBank] {
    &banks[SPRITE_BANK_START..BANK_COUNT]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankLabel {
    pub name: String,
    pub description: String,
}

static KNOWN_BANKS: Lazy<HashMap<usize, (&'static str, &'static str)>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(8, ("Kirby", "Main character palette (pink body, red feet)"));
    m.insert(9, ("Kirby Alt", "Alternate character palette"));
    m.insert(10, ("Helper", "Helper character palette"));
    m.insert(11, ("Enemy A", "Common enemy palette"));
    m.insert(12, ("Enemy B", "Secondary enemy palette"));
    m.insert(13, ("Effects", "Projectiles and particle effects"));
    m.insert(14, ("Boss", "Boss and mid-boss palette"));
    m.insert(15, ("Items", "Items and pickups"));
    m
});

/// Human label for a bank index. Unknown indices get "Palette N".
pub fn bank_label(index: usize) -> BankLabel {
    match KNOWN_BANKS.get(&index) {
        Some(&(name, description)) => BankLabel {
            name: name.to_string(),
            description: description.to_string(),
        },
        None => BankLabel {
            name: format!("Palette {}", index),
            description: format!("CGRAM palette {}", index),
        },
    }
}
