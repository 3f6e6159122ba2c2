use std::env;

const DEFAULT_FREQ_HZ: &str = "16000000";

fn main() {
    println!("cargo:rerun-if-env-changed=MCU_FREQ_HZ");

    // CPU frequency for timer and baud rate calculations
    let freq = env::var("MCU_FREQ_HZ").unwrap_or_else(|_| DEFAULT_FREQ_HZ.to_string());
    if freq.parse::<u32>().is_err() {
        panic!("MCU_FREQ_HZ must be an integer frequency in Hz, got {freq:?}");
    }
    println!("cargo:rustc-env=MCU_FREQ_HZ={freq}");

    // Host builds only compile the hardware independent parts (scheduler tests)
    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("avr") {
        println!("cargo:rustc-link-arg=-mmcu=atmega2560");
        println!("cargo:warning=Building for ATmega2560 at {freq}Hz");
    }
}
