/// Read-only cursor over a possibly truncated byte buffer.
///
/// Every read is bounds-checked and returns `None` once the buffer runs out,
/// so callers walking legacy data can stop early instead of panicking.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Cursor placed at an absolute offset. Offsets past the end yield an
    /// exhausted cursor.
    pub fn at(data: &'a [u8], position: usize) -> Self {
        Self {
            data,
            position: position.min(data.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.position)?;
        self.position += 1;
        Some(byte)
    }

    pub fn read_i16_le(&mut self) -> Option<i16> {
        let bytes = self.read_array::<2>()?;
        Some(i16::from_le_bytes(bytes))
    }

    pub fn read_i32_le(&mut self) -> Option<i32> {
        let bytes = self.read_array::<4>()?;
        Some(i32::from_le_bytes(bytes))
    }

    /// Skips `count` bytes, or fails without moving if fewer remain.
    pub fn skip(&mut self, count: usize) -> Option<()> {
        if count > self.remaining() {
            return None;
        }
        self.position += count;
        Some(())
    }

    /// Reads up to `count` bytes. A short slice means the buffer ended early.
    pub fn read_clipped(&mut self, count: usize) -> &'a [u8] {
        let end = self.position + count.min(self.remaining());
        let slice = &self.data[self.position..end];
        self.position = end;
        slice
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.position.checked_add(N)?;
        let bytes: [u8; N] = self.data.get(self.position..end)?.try_into().ok()?;
        self.position = end;
        Some(bytes)
    }
}
