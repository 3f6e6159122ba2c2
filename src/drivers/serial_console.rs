use embedded_hal::serial::{Read, Write};

/// Non-blocking console over any byte serial port
pub struct SerialConsole<S> {
    serial: S,
    // Received byte still waiting for TX room
    pending: Option<u8>,
}

impl<S, E> SerialConsole<S>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
{
    pub fn new(serial: S) -> Self {
        Self {
            serial,
            pending: None,
        }
    }

    /// `None` when nothing has arrived or the port reported an error
    pub fn read_byte(&mut self) -> Option<u8> {
        match self.serial.read() {
            Ok(byte) => Some(byte),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(_)) => None,
        }
    }

    /// Queue a byte. Returns `false` if the port had no room.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        self.serial.write(byte).is_ok()
    }

    /// Writes as much of `s` as fits; returns the number of bytes queued
    pub fn write_str(&mut self, s: &str) -> usize {
        s.bytes().take_while(|byte| self.write_byte(*byte)).count()
    }

    pub fn write_line(&mut self, s: &str) -> usize {
        self.write_str(s) + self.write_str("\r\n")
    }

    /// Echo at most one received byte. Returns the byte echoed.
    ///
    /// A byte that finds the TX queue full is held and retried on the next call before
    /// anything else is read.
    pub fn echo(&mut self) -> Option<u8> {
        let byte = match self.pending.take() {
            Some(byte) => byte,
            None => self.read_byte()?,
        };
        if self.write_byte(byte) {
            Some(byte)
        } else {
            self.pending = Some(byte);
            None
        }
    }

    /// Byte read by [`echo`](Self::echo) that has not been sent yet
    pub fn pending(&self) -> Option<u8> {
        self.pending
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn release(self) -> S {
        self.serial
    }
}
