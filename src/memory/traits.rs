// Mon Oct 19 2026 - Alex

/// Read-only byte image the scanner walks over.
///
/// Implementors hand out a borrowed view; nothing is copied until a match
/// is packaged into a result.
pub trait ByteSource: Send + Sync {
    fn bytes(&self) -> &[u8];
    fn label(&self) -> &str;

    fn len(&self) -> usize {
        self.bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }
}
