#![allow(clippy::missing_safety_doc)]

use avr_device::atmega2560::USART0;
use core::cell::RefCell;
use core::convert::Infallible;
use critical_section::Mutex;
use embedded_hal::serial;

use super::buffer::Buffer;
use crate::config::CPU_FREQ_HZ;

const TX_BUFFER_SIZE: usize = 128;
const RX_BUFFER_SIZE: usize = 32;

// Global buffers for interrupt handlers
static TX_BUFFER: Mutex<RefCell<Buffer<TX_BUFFER_SIZE>>> =
    Mutex::new(RefCell::new(Buffer::new()));
static RX_BUFFER: Mutex<RefCell<Buffer<RX_BUFFER_SIZE>>> =
    Mutex::new(RefCell::new(Buffer::new()));

/// Double speed mode: UBRR = F_CPU / (8 * baud) - 1
pub const fn ubrr(cpu_hz: u32, baud: u32) -> u16 {
    (cpu_hz / (8 * baud) - 1) as u16
}

/// Handle to the interrupt driven USART0. The hardware is owned by the vectors below,
/// so copies of the handle all talk to the same ring buffers.
#[derive(Clone, Copy)]
pub struct Uart {
    _private: (),
}

impl Uart {
    /// 8N1, double speed, RX complete interrupt enabled
    pub fn init(usart0: USART0, baud: u32) -> Self {
        usart0.ucsr0a.modify(|_, w| w.u2x0().set_bit());
        usart0
            .ubrr0
            .write(|w| unsafe { w.bits(ubrr(CPU_FREQ_HZ, baud)) });
        usart0.ucsr0c.write(|w| {
            w.umsel0()
                .usart_async()
                .upm0()
                .disabled()
                .usbs0()
                .clear_bit()
                .ucsz0()
                .chr8()
        });
        usart0.ucsr0b.write(|w| {
            w.rxen0()
                .set_bit()
                .txen0()
                .set_bit()
                .rxcie0()
                .set_bit()
                .udrie0()
                .clear_bit()
        });
        Self { _private: () }
    }

    /// Queue a byte; `false` if the TX buffer is full and the byte was dropped
    pub fn write_byte(&mut self, byte: u8) -> bool {
        critical_section::with(|cs| {
            let queued = TX_BUFFER.borrow_ref_mut(cs).write(byte);
            // Data register empty interrupt pulls from the buffer
            start_transmit();
            queued
        })
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        critical_section::with(|cs| RX_BUFFER.borrow_ref_mut(cs).read())
    }
}

#[inline(always)]
fn start_transmit() {
    unsafe {
        (*USART0::ptr()).ucsr0b.modify(|_, w| w.udrie0().set_bit());
    }
}

/// Log output never blocks: bytes that do not fit are dropped
impl ufmt::uWrite for Uart {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for byte in s.bytes() {
            if !self.write_byte(byte) {
                break;
            }
        }
        Ok(())
    }
}

impl serial::Read<u8> for Uart {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.read_byte().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for Uart {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        if self.write_byte(word) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        let empty = critical_section::with(|cs| TX_BUFFER.borrow_ref(cs).is_empty());
        if empty {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

#[avr_device::interrupt(atmega2560)]
fn USART0_RX() {
    let byte = unsafe { (*USART0::ptr()).udr0.read().bits() };
    critical_section::with(|cs| {
        RX_BUFFER.borrow_ref_mut(cs).write(byte);
    });
}

#[avr_device::interrupt(atmega2560)]
fn USART0_UDRE() {
    critical_section::with(|cs| {
        let usart0 = unsafe { &*USART0::ptr() };
        if let Some(byte) = TX_BUFFER.borrow_ref_mut(cs).read() {
            usart0.udr0.write(|w| unsafe { w.bits(byte) });
        } else {
            // Buffer empty - disable TX interrupt
            usart0.ucsr0b.modify(|_, w| w.udrie0().clear_bit());
        }
    });
}
