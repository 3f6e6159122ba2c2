/// Byte ring buffer shared between a UART vector and the main loop.
///
/// `N` must be a power of two; one slot stays empty to tell full from empty.
pub struct Buffer<const N: usize> {
    data: [u8; N],
    write_idx: usize,
    read_idx: usize,
}

impl<const N: usize> Buffer<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "buffer size must be a power of 2");
        N - 1
    };

    pub const fn new() -> Self {
        Self {
            data: [0; N],
            write_idx: 0,
            read_idx: 0,
        }
    }

    /// Returns `false` when the buffer is full and the byte was dropped
    pub fn write(&mut self, byte: u8) -> bool {
        let next_write = (self.write_idx + 1) & Self::MASK;
        if next_write != self.read_idx {
            self.data[self.write_idx] = byte;
            self.write_idx = next_write;
            true
        } else {
            false
        }
    }

    pub fn read(&mut self) -> Option<u8> {
        if self.read_idx != self.write_idx {
            let byte = self.data[self.read_idx];
            self.read_idx = (self.read_idx + 1) & Self::MASK;
            Some(byte)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read_idx == self.write_idx
    }

    pub fn is_full(&self) -> bool {
        (self.write_idx + 1) & Self::MASK == self.read_idx
    }

    pub fn len(&self) -> usize {
        self.write_idx.wrapping_sub(self.read_idx) & Self::MASK
    }
}

impl<const N: usize> Default for Buffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
