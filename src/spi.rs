//! The synchronous serial link to the display's shift-register chain.
//!
//! One [`SpiLink::transfer`] call is exactly one bus transaction: chip
//! select is asserted for the duration and released afterwards. The chain
//! is SPI mode 1 (clock idle low, data sampled on the falling edge).

use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};

use crate::error::Error;
use crate::konst;

pub struct SpiLink {
    dev: Spidev,
}

impl SpiLink {
    pub fn open(path: &'static str) -> Result<Self, Error> {
        let mut dev =
            Spidev::open(path).map_err(|source| Error::SpiUnavailable { path, source })?;

        let options = SpidevOptions::new()
            .mode(SpiModeFlags::SPI_MODE_1)
            .bits_per_word(konst::SPI_BITS_PER_WORD)
            .max_speed_hz(konst::SPI_SPEED_HZ)
            .build();
        dev.configure(&options)
            .map_err(|source| Error::SpiConfigRejected { path, source })?;

        tracing::debug!(
            path,
            speed_hz = konst::SPI_SPEED_HZ,
            "Configured SPI device"
        );
        Ok(Self { dev })
    }

    /// Full-duplex exchange of exactly `tx.len()` bytes.
    pub fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Error> {
        let mut exchange = SpidevTransfer::read_write(tx, rx);
        self.dev
            .transfer(&mut exchange)
            .map_err(Error::SpiTransfer)
    }
}
