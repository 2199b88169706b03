//! Seam to the external LED renderer.
//!
//! The actual DMA/PWM waveform generation lives in the `rpi_ws281x` library
//! (via the `rs_ws281x` binding); this module only hands it per-frame color
//! buffers. The trait exists so the animation engine can be driven against
//! a fake in tests.

use rgb::RGB8;

use crate::error::Error;
use crate::konst;

pub trait StripRenderer {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Pushes one full frame to the strip.
    fn render(&mut self, colors: &[RGB8; konst::LED_COUNT]) -> Result<(), Self::Error>;
}

/// The SK6812 strip behind the ws281x driver. Teardown happens on drop
/// (the binding calls `ws2811_fini`).
pub struct Ws281xRenderer {
    controller: rs_ws281x::Controller,
}

impl Ws281xRenderer {
    pub fn init() -> Result<Self, Error> {
        let controller = rs_ws281x::ControllerBuilder::new()
            .freq(800_000)
            .dma(i32::from(konst::STRIP_DMA))
            .channel(
                0,
                rs_ws281x::ChannelBuilder::new()
                    .pin(i32::from(konst::STRIP_PIN))
                    .count(konst::LED_COUNT as i32)
                    .strip_type(rs_ws281x::StripType::Sk6812)
                    .brightness(255)
                    .build(),
            )
            .build()
            .map_err(|source| Error::StripInit(Box::new(source)))?;

        tracing::debug!(
            pin = konst::STRIP_PIN,
            leds = konst::LED_COUNT,
            "Initialized LED strip"
        );
        Ok(Self { controller })
    }
}

impl StripRenderer for Ws281xRenderer {
    type Error = rs_ws281x::WS2811Error;

    fn render(&mut self, colors: &[RGB8; konst::LED_COUNT]) -> Result<(), Self::Error> {
        for (led, color) in self.controller.leds_mut(0).iter_mut().zip(colors) {
            // ws281x raw color order is [B, G, R, W]
            *led = [color.b, color.g, color.r, 0];
        }
        self.controller.render()
    }
}
