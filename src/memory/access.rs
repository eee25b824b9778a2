// Mon Oct 19 2026 - Alex

/// Bounds-lenient view over a byte buffer.
///
/// Every read past the end yields zero instead of failing. Truncated VRAM
/// and CGRAM dumps decode to pixel 0 / black for the missing part; this is
/// the single place that policy lives.
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    pub fn read_or_zero(&self, offset: usize) -> u8 {
        self.data.get(offset).copied().unwrap_or(0)
    }

    pub fn read_u16_le_or_zero(&self, offset: usize) -> u16 {
        let lo = self.read_or_zero(offset) as u16;
        let hi = match offset.checked_add(1) {
            Some(next) => self.read_or_zero(next) as u16,
            None => 0,
        };
        lo | (hi << 8)
    }

    /// Copies `N` bytes starting at `offset`, zero-filling whatever is missing.
    pub fn read_array_or_zero<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        let available = self.clipped(offset, N);
        out[..available.len()].copy_from_slice(available);
        out
    }

    /// Sub-slice clipped to the buffer; never panics, may be shorter than `len`.
    pub fn clipped(&self, offset: usize, len: usize) -> &'a [u8] {
        let start = offset.min(self.data.len());
        let end = offset.saturating_add(len).min(self.data.len());
        &self.data[start..end]
    }

    /// Context window of `before`/`after` bytes around `[offset, offset + len)`.
    /// Returns the window start alongside the bytes.
    pub fn window(&self, offset: usize, len: usize, before: usize, after: usize) -> (usize, &'a [u8]) {
        let start = offset.saturating_sub(before).min(self.data.len());
        let end = offset
            .saturating_add(len)
            .saturating_add(after)
            .min(self.data.len());
        (start, &self.data[start..end.max(start)])
    }
}
