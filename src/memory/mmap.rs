// Mon Oct 19 2026 - Alex

use crate::memory::{ByteSource, MemoryError};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only memory map of a ROM or dump file.
///
/// Zero-length files are not mapped (most platforms refuse an empty map);
/// they show up as an empty source instead.
#[derive(Debug, Clone)]
pub struct MmapSource {
    mmap: Option<Arc<Mmap>>,
    path: PathBuf,
    label: String,
}

impl MmapSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| MemoryError::Open {
            path: path.clone(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| MemoryError::Open {
                path: path.clone(),
                source,
            })?
            .len();

        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: mapped read-only and never written through; concurrent
            // sessions may share the same file.
            let map = unsafe { Mmap::map(&file) }.map_err(|source| MemoryError::Map {
                path: path.clone(),
                source,
            })?;
            Some(Arc::new(map))
        };

        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::debug!("Mapped {} ({} bytes)", path.display(), len);

        Ok(Self { mmap, path, label })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.mmap.as_ref().map(|m| m.len()).unwrap_or(0)
    }
}

impl ByteSource for MmapSource {
    fn bytes(&self) -> &[u8] {
        match self.mmap {
            Some(ref m) => m.as_ref(),
            None => &[],
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_maps_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        file.flush().unwrap();

        let source = MmapSource::open(file.path()).unwrap();
        assert_eq!(source.size(), 4);
        assert_eq!(source.bytes(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_open_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = MmapSource::open(file.path()).unwrap();
        assert!(source.is_empty());
        assert!(format!("{:?}", source).contains("MmapSource"));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = MmapSource::open(dir.path().join("missing.sfc")).unwrap_err();
        assert!(matches!(err, MemoryError::Open { .. }));
        assert!(err.to_string().contains("missing.sfc"));
    }
}
