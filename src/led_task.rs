//! The animation worker: replays the configured roll through the LED strip.

use std::sync::Arc;
use std::time::Duration;

use rgb::RGB8;

use crate::color::interpolate;
use crate::context::Context;
use crate::error::Error;
use crate::konst;
use crate::roll::{Roll, Transition};
use crate::strip::{StripRenderer, Ws281xRenderer};

pub struct LedTask {
    context: Arc<Context>,
    roll: Roll,
}

impl LedTask {
    pub fn new(context: Arc<Context>, roll: Roll) -> Self {
        Self { context, roll }
    }

    /// Brings up the ws281x renderer and replays the roll until shutdown.
    /// Any failure signals the sibling thread before returning.
    pub fn run(mut self) -> Result<(), Error> {
        let mut renderer = match Ws281xRenderer::init() {
            Ok(renderer) => renderer,
            Err(error) => {
                tracing::error!(%error, "LED renderer unavailable");
                self.context.signal_shutdown();
                return Err(error);
            }
        };

        tracing::info!(frames = self.roll.len(), "Starting LED roll");
        let result = drive(&self.context, &mut self.roll, &mut renderer);
        if result.is_err() {
            self.context.signal_shutdown();
        }
        result
    }
}

/// The replay loop proper, generic over the renderer so tests can observe
/// the frames.
///
/// Whatever happens inside the loop, the strip is blacked out before the
/// renderer is released; the LEDs must never stay lit after the process
/// stops.
fn drive<R: StripRenderer>(
    context: &Context,
    roll: &mut Roll,
    renderer: &mut R,
) -> Result<(), Error> {
    let step_duration = Duration::from_millis(u64::from(konst::INTERPOLATE_STEP_MS));
    let mut result = Ok(());

    'roll: while !context.is_shutting_down() {
        let (current, next) = roll.advance();

        match current.transition {
            Transition::Immediate => {
                if let Err(error) = renderer.render(&current.colors) {
                    result = Err(Error::StripRender(Box::new(error)));
                    break 'roll;
                }
                std::thread::sleep(Duration::from_millis(u64::from(current.delay_ms)));
            }
            Transition::Interpolated => {
                let steps = current.delay_ms / konst::INTERPOLATE_STEP_MS;
                for pos in 0..steps {
                    if context.is_shutting_down() {
                        break 'roll;
                    }
                    let mut colors = [RGB8::default(); konst::LED_COUNT];
                    for (slot, (from, to)) in
                        colors.iter_mut().zip(current.colors.iter().zip(&next.colors))
                    {
                        *slot = interpolate(*from, *to, pos, steps);
                    }
                    if let Err(error) = renderer.render(&colors) {
                        result = Err(Error::StripRender(Box::new(error)));
                        break 'roll;
                    }
                    std::thread::sleep(step_duration);
                }
            }
        }
    }

    tracing::info!("Blacking out LED strip");
    if let Err(error) = renderer.render(&[RGB8::default(); konst::LED_COUNT]) {
        tracing::error!(%error, "Failed to black out LED strip");
        if result.is_ok() {
            result = Err(Error::StripRender(Box::new(error)));
        }
    }

    result
}
