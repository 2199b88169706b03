//! Per-channel color arithmetic for the LED roll.

use rgb::RGB8;

/// Scales every channel by `level/100`, truncating. Applied once at config
/// parse time, never at render time.
pub(crate) fn level_adjust(color: RGB8, level: u8) -> RGB8 {
    let scale = |channel: u8| (u32::from(channel) * u32::from(level) / 100) as u8;
    RGB8::new(scale(color.r), scale(color.g), scale(color.b))
}

/// Linear interpolation between two colors, `pos` of `max` steps along.
/// `pos == 0` is exactly `current`; `pos == max` would be exactly `next`,
/// which the animation loop never reaches (the following frame's first
/// render lands there instead).
pub(crate) fn interpolate(current: RGB8, next: RGB8, pos: u32, max: u32) -> RGB8 {
    let lerp = |current: u8, next: u8| {
        ((u32::from(current) * (max - pos) + u32::from(next) * pos) / max) as u8
    };
    RGB8::new(
        lerp(current.r, next.r),
        lerp(current.g, next.g),
        lerp(current.b, next.b),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_100_is_identity() {
        let color = RGB8::new(0x12, 0xAB, 0xFF);
        assert_eq!(level_adjust(color, 100), color);
    }

    #[test]
    fn level_50_truncates_each_channel() {
        let color = RGB8::new(0xFF, 0x03, 0x00);
        // 255*50/100 = 127.5 -> 127, 3*50/100 = 1.5 -> 1
        assert_eq!(level_adjust(color, 50), RGB8::new(127, 1, 0));
    }

    #[test]
    fn level_0_is_black() {
        assert_eq!(level_adjust(RGB8::new(255, 255, 255), 0), RGB8::new(0, 0, 0));
    }

    #[test]
    fn interpolation_starts_exactly_at_current() {
        let current = RGB8::new(10, 200, 33);
        let next = RGB8::new(250, 0, 190);
        assert_eq!(interpolate(current, next, 0, 40), current);
    }

    #[test]
    fn interpolation_midpoint_is_the_mean_within_one() {
        let current = RGB8::new(0, 255, 17);
        let next = RGB8::new(255, 0, 100);
        let mid = interpolate(current, next, 20, 40);
        for (channel, a, b) in [
            (mid.r, current.r, next.r),
            (mid.g, current.g, next.g),
            (mid.b, current.b, next.b),
        ] {
            let mean = (u32::from(a) + u32::from(b)) / 2;
            assert!(u32::from(channel).abs_diff(mean) <= 1);
        }
    }

    #[test]
    fn interpolation_is_monotone_per_channel() {
        let current = RGB8::new(0, 240, 120);
        let next = RGB8::new(240, 0, 120);
        let mut previous = current;
        for pos in 1..40 {
            let step = interpolate(current, next, pos, 40);
            assert!(step.r >= previous.r);
            assert!(step.g <= previous.g);
            assert_eq!(step.b, 120);
            previous = step;
        }
    }
}
