//! The display worker: keeps the tubes on the wall-clock second.
//!
//! Updates are quantized to second boundaries by busy-polling the realtime
//! clock for the seconds rollover, and the loop then sleeps to an
//! *absolute* deadline just short of the next boundary. Relative sleeps
//! would accumulate scheduling jitter and eventually skip a second;
//! anchoring every wakeup to the boundary cannot drift.

use std::sync::Arc;

use chrono::Timelike;
use nix::time::{ClockId, clock_gettime};

use crate::context::Context;
use crate::error::Error;
use crate::gpio::{PinFunction, RegisterBank};
use crate::konst;
use crate::nixie;
use crate::spi::SpiLink;

pub struct ClockTask {
    context: Arc<Context>,
}

impl ClockTask {
    pub fn new(context: Arc<Context>) -> Self {
        Self { context }
    }

    /// Opens the display hardware and runs until shutdown. The display
    /// cannot function with either device missing, so any error signals
    /// the sibling thread before returning.
    pub fn run(self) -> Result<(), Error> {
        let result = self.drive();
        if result.is_err() {
            self.context.signal_shutdown();
        }
        result
    }

    fn drive(&self) -> Result<(), Error> {
        let mut spi = SpiLink::open(konst::SPI_DEVICE)?;
        let mut gpio = RegisterBank::open()?;
        gpio.set_function(konst::LATCH_PIN, PinFunction::Output);
        nixie::render(&mut spi, &mut gpio, konst::LATCH_PIN, false, None)?;

        let result = self
            .test_pattern(&mut spi, &mut gpio)
            .and_then(|()| self.run_loop(&mut spi, &mut gpio));

        // Draining: leave the tubes dark whatever happened above.
        tracing::info!("Blanking display");
        if let Err(error) = nixie::render(&mut spi, &mut gpio, konst::LATCH_PIN, false, None) {
            tracing::error!(%error, "Failed to blank display");
        }
        result
    }

    /// Cycles every tube through all ten digits so an operator can spot a
    /// dead cathode or socket pin. Diagnostic only.
    fn test_pattern(&self, spi: &mut SpiLink, gpio: &mut RegisterBank) -> Result<(), Error> {
        tracing::debug!("Running tube test pattern");
        let mut digits = *b"123456";
        let mut colon = false;
        for _ in 0..konst::TEST_PATTERN_ROUNDS {
            nixie::render(spi, gpio, konst::LATCH_PIN, colon, Some(&digits))?;
            std::thread::sleep(konst::TEST_PATTERN_STEP);
            for digit in &mut digits {
                *digit = if *digit == b'9' { b'0' } else { *digit + 1 };
            }
            colon = !colon;
        }
        Ok(())
    }

    fn run_loop(&self, spi: &mut SpiLink, gpio: &mut RegisterBank) -> Result<(), Error> {
        let realtime = ClockId::CLOCK_REALTIME;
        let mut last_sec = clock_gettime(realtime).map_err(Error::Clock)?.tv_sec();
        let mut colon = false;

        loop {
            // Busy-poll for the seconds rollover; the absolute sleep below
            // wakes just before it, so this spins only briefly.
            let now = loop {
                let now = clock_gettime(realtime).map_err(Error::Clock)?;
                if now.tv_sec() != last_sec {
                    break now;
                }
            };
            last_sec = now.tv_sec();

            let local = chrono::Local::now();
            let digits = clock_digits(local.hour(), local.minute(), local.second());
            colon = self.context.colon.next(colon);
            nixie::render(spi, gpio, konst::LATCH_PIN, colon, Some(&digits))?;
            tracing::trace!(
                time = %local.format("%H:%M:%S"),
                colon,
                "Updated display"
            );

            sleep_until_wake_mark(last_sec)?;

            if self.context.is_shutting_down() {
                return Ok(());
            }
        }
    }
}

/// Sleeps to the absolute wake mark inside the second that began at
/// `second_start`, retrying on signal interruption. A deadline already in
/// the past returns immediately.
fn sleep_until_wake_mark(second_start: nix::libc::time_t) -> Result<(), Error> {
    let deadline = nix::sys::time::TimeSpec::new(second_start, konst::SECOND_WAKE_NS);
    loop {
        match nix::time::clock_nanosleep(
            ClockId::CLOCK_REALTIME,
            nix::time::ClockNanosleepFlags::TIMER_ABSTIME,
            &deadline,
        ) {
            Ok(_) => return Ok(()),
            Err(nix::errno::Errno::EINTR) => continue,
            Err(errno) => return Err(Error::ClockSleep(errno)),
        }
    }
}

/// Formats a local time as the six ASCII digits `HHMMSS`.
fn clock_digits(hour: u32, minute: u32, second: u32) -> [u8; 6] {
    let digit = |value: u32| b'0' + (value % 10) as u8;
    [
        digit(hour / 10),
        digit(hour),
        digit(minute / 10),
        digit(minute),
        digit(second / 10),
        digit(second),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_midnight() {
        assert_eq!(clock_digits(0, 0, 0), *b"000000");
    }

    #[test]
    fn formats_end_of_day() {
        assert_eq!(clock_digits(23, 59, 59), *b"235959");
    }

    #[test]
    fn formats_mixed_digits() {
        assert_eq!(clock_digits(9, 30, 7), *b"093007");
    }

    #[test]
    fn test_pattern_digits_wrap() {
        let mut digits = *b"678901";
        for digit in &mut digits {
            *digit = if *digit == b'9' { b'0' } else { *digit + 1 };
        }
        assert_eq!(digits, *b"789012");
    }
}
