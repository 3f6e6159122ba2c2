//! Cooperative tick scheduler firmware for ATmega2560 boards.
//!
//! The scheduler core ([`rtos`]), drivers and application tasks are hardware independent and
//! build on the host for testing; register level code in [`hal`] only exists on AVR.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

pub mod application;
pub mod config;
pub mod drivers;
pub mod hal;
pub mod logger;
pub mod rtos;
