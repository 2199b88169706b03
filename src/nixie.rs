//! Wire encoding for the six-tube nixie display.
//!
//! The tubes hang off a chain of two 32-bit HV5122 shift registers. Each
//! register carries three tubes (one-hot, ten bits per digit) plus one pair
//! of colon lamp bits, so the full frame is a single 64-bit payload:
//!
//! bits 0–29 digits 0–2, bits 30–31 colon, bits 32–61 digits 3–5,
//! bits 62–63 the second register's colon pair.
//!
//! The chain wants the most significant byte first, so the payload goes out
//! as `to_be_bytes`.

use crate::error::Error;
use crate::gpio::RegisterBank;
use crate::spi::SpiLink;

/// How the display loop drives the colon lamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColonMode {
    Off,
    Blink,
    On,
}

impl ColonMode {
    /// Lamp state for the coming second, given the current one.
    pub fn next(self, current: bool) -> bool {
        match self {
            Self::Off => false,
            Self::Blink => !current,
            Self::On => true,
        }
    }
}

/// Packs six ASCII digits and the colon state into the shift-register
/// payload. A non-digit byte lights nothing in its slot; callers only pass
/// decimal digits.
pub(crate) fn encode_payload(digits: &[u8; 6], colon: bool) -> u64 {
    let mut payload: u64 = 0;
    if colon {
        payload |= 0b11;
    }
    for &digit in digits[3..6].iter().rev() {
        payload <<= 10;
        if digit.is_ascii_digit() {
            payload |= 1 << (digit - b'0');
        }
    }
    payload <<= 2;
    if colon {
        payload |= 0b11;
    }
    for &digit in digits[..3].iter().rev() {
        payload <<= 10;
        if digit.is_ascii_digit() {
            payload |= 1 << (digit - b'0');
        }
    }
    payload
}

/// Pushes one frame to the display. `None` blanks every tube.
///
/// The latch pin is dropped low for the transfer and raised afterwards; the
/// rising edge is what commits the shifted bits into the output latches.
/// Releasing chip select alone would leave the previous digits showing.
pub(crate) fn render(
    spi: &mut SpiLink,
    gpio: &mut RegisterBank,
    latch_pin: u8,
    colon: bool,
    digits: Option<&[u8; 6]>,
) -> Result<(), Error> {
    let payload = digits.map_or(0, |digits| encode_payload(digits, colon));
    let tx = payload.to_be_bytes();
    let mut rx = [0u8; 8];

    gpio.clear_output(latch_pin);
    let result = spi.transfer(&tx, &mut rx);
    gpio.set_output(latch_pin);
    result
}
