//! Board wiring and timing constants for the GRA-AFCH nixie adapter.

/// Latch-enable line of the HV5122 shift-register chain. Its rising edge
/// commits the shifted bits into the display outputs.
pub(crate) const LATCH_PIN: u8 = 22;

/// PWM1 output driving the SK6812 strip (swapped with the UP button on this
/// board so the strip sits on a DMA-capable pin).
pub(crate) const STRIP_PIN: u8 = 18;

pub(crate) const STRIP_DMA: u8 = 10;

pub(crate) const LED_COUNT: usize = 8;

pub(crate) const SPI_DEVICE: &str = "/dev/spidev0.1";

pub(crate) const SPI_SPEED_HZ: u32 = 500_000;

pub(crate) const SPI_BITS_PER_WORD: u8 = 8;

/// Granularity of an interpolated color transition.
pub(crate) const INTERPOLATE_STEP_MS: u32 = 25;

/// Absolute wake target within each second, leaving a 50 ms margin before
/// the next boundary. Measured wakeup latency on a Pi 3B+ is around 130 µs;
/// lower this if the clock skips seconds under load.
pub(crate) const SECOND_WAKE_NS: i64 = 950_000_000;

pub(crate) const TEST_PATTERN_ROUNDS: u32 = 10;

pub(crate) const TEST_PATTERN_STEP: std::time::Duration = std::time::Duration::from_millis(500);

/// Candidate configuration locations, tried in order.
pub(crate) const CONFIG_PATHS: &[&str] = &[
    "/etc/LEDcolor.json",
    "/usr/local/etc/LEDcolor.json",
    "./LEDcolor.json",
];

pub(crate) const DEFAULT_LEVEL: u8 = 100;

pub(crate) const DEFAULT_DELAY_MS: u32 = 1000;
