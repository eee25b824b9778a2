// Mon Oct 19 2026 - Alex

use crate::memory::{ByteSource, ByteView, MemoryError};
use std::fmt;
use std::fs;
use std::path::Path;

pub const VRAM_SIZE: usize = 0x10000;
pub const CGRAM_SIZE: usize = 512;
pub const OAM_TABLE_SIZE: usize = 512;
/// Low table plus the 32-byte high table.
pub const OAM_FULL_SIZE: usize = 544;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DumpKind {
    Vram,
    Cgram,
    Oam,
}

impl DumpKind {
    pub fn canonical_size(&self) -> usize {
        match self {
            DumpKind::Vram => VRAM_SIZE,
            DumpKind::Cgram => CGRAM_SIZE,
            DumpKind::Oam => OAM_TABLE_SIZE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DumpKind::Vram => "VRAM",
            DumpKind::Cgram => "CGRAM",
            DumpKind::Oam => "OAM",
        }
    }
}

impl fmt::Display for DumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A console memory dump read fully into memory.
///
/// Oversized VRAM and CGRAM dumps are truncated to their canonical size
/// with a warning. Undersized dumps are kept as-is and read through
/// [`ByteView`], so missing bytes decode as zero.
#[derive(Debug, Clone)]
pub struct MemoryDump {
    kind: DumpKind,
    data: Vec<u8>,
    label: String,
}

impl MemoryDump {
    pub fn load<P: AsRef<Path>>(path: P, kind: DumpKind) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| MemoryError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(data, kind, &label)
    }

    pub fn from_bytes(mut data: Vec<u8>, kind: DumpKind, label: &str) -> Result<Self, MemoryError> {
        if data.is_empty() {
            return Err(MemoryError::InvalidInput(format!("{} dump '{}' is empty", kind, label)));
        }

        let canonical = kind.canonical_size();

        match kind {
            DumpKind::Oam if data.len() > OAM_FULL_SIZE => {
                return Err(MemoryError::InvalidInput(format!(
                    "OAM dump '{}' is {} bytes, expected at most {}",
                    label,
                    data.len(),
                    OAM_FULL_SIZE
                )));
            }
            DumpKind::Oam if data.len() > canonical => {
                log::debug!("Ignoring OAM high table in '{}'", label);
                data.truncate(canonical);
            }
            _ if data.len() > canonical => {
                log::warn!(
                    "{} dump '{}' is {} bytes, truncating to {}",
                    kind,
                    label,
                    data.len(),
                    canonical
                );
                data.truncate(canonical);
            }
            _ if data.len() < canonical => {
                log::warn!(
                    "{} dump '{}' is short ({} of {} bytes), missing bytes read as zero",
                    kind,
                    label,
                    data.len(),
                    canonical
                );
            }
            _ => {}
        }

        Ok(Self {
            kind,
            data,
            label: label.to_string(),
        })
    }

    pub fn kind(&self) -> DumpKind {
        self.kind
    }

    pub fn view(&self) -> ByteView<'_> {
        ByteView::new(&self.data)
    }
}

impl ByteSource for MemoryDump {
    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vram_truncated_not_rejected() {
        let dump = MemoryDump::from_bytes(vec![0xAA; VRAM_SIZE + 100], DumpKind::Vram, "big.dmp").unwrap();
        assert_eq!(dump.len(), VRAM_SIZE);
    }

    #[test]
    fn test_empty_dump_is_invalid_input() {
        let err = MemoryDump::from_bytes(Vec::new(), DumpKind::Cgram, "empty.dmp").unwrap_err();
        assert!(matches!(err, MemoryError::InvalidInput(_)));
    }

    #[test]
    fn test_oam_limits() {
        let dump = MemoryDump::from_bytes(vec![0; OAM_FULL_SIZE], DumpKind::Oam, "oam.dmp").unwrap();
        assert_eq!(dump.len(), OAM_TABLE_SIZE);

        let err = MemoryDump::from_bytes(vec![0; OAM_FULL_SIZE + 1], DumpKind::Oam, "oam.dmp").unwrap_err();
        assert!(matches!(err, MemoryError::InvalidInput(_)));
    }

    #[test]
    fn test_short_cgram_kept() {
        let dump = MemoryDump::from_bytes(vec![0x1F, 0x00], DumpKind::Cgram, "short.dmp").unwrap();
        assert_eq!(dump.len(), 2);
        assert_eq!(dump.view().read_u16_le_or_zero(2), 0);
    }
}
