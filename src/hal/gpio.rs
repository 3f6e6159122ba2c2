use avr_device::atmega2560::{PORTB, PORTE, PORTH};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::OutputPin;

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

/// Pin `P` of `PORT`, tracked by type
pub struct Pin<PORT, const P: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8> Pin<PORT, P, Input> {
    /// Pins start as inputs after reset
    const fn new() -> Self {
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $ddr:ident, $port:ident) => {
        impl<const P: u8, MODE: PinMode> Pin<$PORT, P, MODE> {
            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                // SAFETY: read-modify-write of our own bit, done before interrupts are enabled
                unsafe {
                    (*$PORT::ptr())
                        .$ddr
                        .modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Infallible> {
                // PORTx is shared with pins owned elsewhere
                critical_section::with(|_| unsafe {
                    (*$PORT::ptr())
                        .$port
                        .modify(|r, w| w.bits(r.bits() | (1 << P)));
                });
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Infallible> {
                critical_section::with(|_| unsafe {
                    (*$PORT::ptr())
                        .$port
                        .modify(|r, w| w.bits(r.bits() & !(1 << P)));
                });
                Ok(())
            }
        }
    };
}

impl_port!(PORTB, ddrb, portb);
impl_port!(PORTE, ddre, porte);
impl_port!(PORTH, ddrh, porth);

/// Arduino Mega 2560 pin map for the onboard LED and the Arduino Motor Shield R3
pub mod board {
    use super::*;

    /// D13
    pub type LedBuiltin = Pin<PORTB, 7, Output>;
    /// D12
    pub type DirA = Pin<PORTB, 6, Output>;
    /// D9
    pub type BrakeA = Pin<PORTH, 6, Output>;
    /// D3, OC3C
    pub type PwmPinA = Pin<PORTE, 5, Output>;

    /// Output pins used by the firmware. Motor B shares D13 with the LED, so only motor A
    /// is wired up.
    pub struct Pins {
        pub led: LedBuiltin,
        pub dir_a: DirA,
        pub brake_a: BrakeA,
        pub pwm_a: PwmPinA,
    }

    impl Pins {
        /// Take ownership of the ports and configure the pins as outputs
        pub fn take(_portb: PORTB, _porte: PORTE, _porth: PORTH) -> Self {
            Self {
                led: Pin::<PORTB, 7, Input>::new().into_output(),
                dir_a: Pin::<PORTB, 6, Input>::new().into_output(),
                brake_a: Pin::<PORTH, 6, Input>::new().into_output(),
                pwm_a: Pin::<PORTE, 5, Input>::new().into_output(),
            }
        }
    }
}
