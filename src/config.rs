//! Loader for the LED roll configuration.
//!
//! The file is JSON with one optional `system` object (global brightness
//! `level`, 0–100) and one required `roll` array of frames:
//!
//! ```json
//! {
//!   "system": { "level": 80 },
//!   "roll": [
//!     { "step": "fast", "delay": 1000,
//!       "color": ["#FF0000", "#FF0000", "0x00FF00", "00FF00",
//!                 "#0000FF", "#0000FF", "#FFFFFF", "#000000"] }
//!   ]
//! }
//! ```
//!
//! `step` and `delay` are sticky: a frame that omits them reuses the last
//! seen value. The brightness level is applied to every channel at parse
//! time, not at render time. Any structural problem rejects the whole file;
//! there is no partial-success mode.

use rgb::RGB8;

use crate::color::level_adjust;
use crate::konst;
use crate::roll::{Frame, Roll, Transition};

/// Loads the roll from `path` if given, otherwise from the first of the
/// well-known locations that opens.
pub fn load(path: Option<&camino::Utf8Path>) -> Result<Roll, ConfigError> {
    if let Some(path) = path {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadingFile {
            path: path.to_path_buf(),
            source,
        })?;
        return parse(&text);
    }

    for candidate in konst::CONFIG_PATHS {
        match std::fs::read_to_string(candidate) {
            Ok(text) => {
                tracing::debug!(path = candidate, "Reading configuration");
                return parse(&text);
            }
            Err(error) => {
                tracing::trace!(path = candidate, %error, "Skipping candidate path");
            }
        }
    }

    Err(ConfigError::NotFound)
}

/// Raw document shape before validation. Unknown keys anywhere are a
/// structural error.
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    system: Option<RawSystem>,
    roll: Option<Vec<RawFrame>>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSystem {
    level: Option<i64>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFrame {
    step: Option<RawStep>,
    delay: Option<i64>,
    color: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawStep {
    Fast,
    Slow,
}

impl From<RawStep> for Transition {
    fn from(step: RawStep) -> Self {
        match step {
            RawStep::Fast => Self::Immediate,
            RawStep::Slow => Self::Interpolated,
        }
    }
}

fn parse(text: &str) -> Result<Roll, ConfigError> {
    let document: RawDocument = serde_json::from_str(text)?;

    let level = match document.system.and_then(|system| system.level) {
        None => konst::DEFAULT_LEVEL,
        Some(level @ 0..=100) => level as u8,
        Some(level) => return Err(ConfigError::LevelOutOfRange(level)),
    };

    let raw_frames = document.roll.ok_or(ConfigError::MissingRoll)?;
    if raw_frames.is_empty() {
        return Err(ConfigError::MissingRoll);
    }

    let mut frames = Vec::with_capacity(raw_frames.len());
    let mut step = RawStep::Fast;
    let mut delay = i64::from(konst::DEFAULT_DELAY_MS);

    for (index, raw) in raw_frames.into_iter().enumerate() {
        // 1-based in messages, matching how people count frames in the file
        let record = index + 1;

        if let Some(value) = raw.step {
            step = value;
        }
        if let Some(value) = raw.delay {
            delay = value;
        }
        if delay < i64::from(konst::INTERPOLATE_STEP_MS) {
            return Err(ConfigError::DelayTooSmall { record, delay });
        }
        let delay_ms =
            u32::try_from(delay).map_err(|_| ConfigError::DelayOutOfRange { record, delay })?;

        let raw_colors = raw.color.ok_or(ConfigError::MissingColors { record })?;
        if raw_colors.len() != konst::LED_COUNT {
            return Err(ConfigError::WrongColorCount {
                record,
                count: raw_colors.len(),
            });
        }

        let mut colors = [RGB8::default(); konst::LED_COUNT];
        for (slot, value) in colors.iter_mut().zip(&raw_colors) {
            let color = parse_color(value).ok_or_else(|| ConfigError::BadColor {
                record,
                value: value.clone(),
            })?;
            *slot = level_adjust(color, level);
        }

        frames.push(Frame {
            colors,
            delay_ms,
            transition: step.into(),
        });
    }

    let roll = Roll::new(frames);
    tracing::info!(frames = roll.len(), level, "Loaded LED roll");
    Ok(roll)
}

/// Accepts `#RRGGBB`, `0xRRGGBB` or bare `RRGGBB`.
fn parse_color(value: &str) -> Option<RGB8> {
    let hex = value
        .strip_prefix('#')
        .or_else(|| value.strip_prefix("0x"))
        .unwrap_or(value);
    if hex.len() != 6 {
        return None;
    }
    let word = u32::from_str_radix(hex, 16).ok()?;
    Some(RGB8::new(
        (word >> 16) as u8,
        (word >> 8) as u8,
        word as u8,
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No configuration file found at any known location")]
    NotFound,

    #[error("Failed to read configuration file '{path}'")]
    ReadingFile {
        path: camino::Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration is not valid JSON for the expected schema")]
    ParsingConfig(#[from] serde_json::Error),

    #[error("System level {0} is out of range (0-100)")]
    LevelOutOfRange(i64),

    #[error("Configuration needs a non-empty 'roll' array")]
    MissingRoll,

    #[error("Record #{record} has no 'color' array")]
    MissingColors { record: usize },

    #[error("Record #{record} has {count} colors, expected {}", crate::konst::LED_COUNT)]
    WrongColorCount { record: usize, count: usize },

    #[error("Record #{record} color '{value}' is not an RRGGBB hex string")]
    BadColor { record: usize, value: String },

    #[error(
        "Record #{record} delay {delay}ms is too small, must be >= {}ms",
        crate::konst::INTERPOLATE_STEP_MS
    )]
    DelayTooSmall { record: usize, delay: i64 },

    #[error("Record #{record} delay {delay}ms does not fit a 32-bit millisecond count")]
    DelayOutOfRange { record: usize, delay: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eight(color: &str) -> String {
        let repeated = vec![format!("\"{color}\""); 8].join(",");
        format!("[{repeated}]")
    }

    #[test]
    fn two_fast_frames_cycle() {
        let text = format!(
            r#"{{"roll":[
                {{"step":"fast","delay":1000,"color":{red}}},
                {{"step":"fast","delay":1000,"color":{blue}}}
            ]}}"#,
            red = eight("#FF0000"),
            blue = eight("#0000FF"),
        );
        let mut roll = parse(&text).unwrap();
        assert_eq!(roll.len(), 2);

        let (current, next) = roll.advance();
        assert_eq!(current.transition, Transition::Immediate);
        assert_eq!(current.colors[0], RGB8::new(0xFF, 0, 0));
        assert_eq!(next.colors[0], RGB8::new(0, 0, 0xFF));
        let (current, next) = roll.advance();
        assert_eq!(current.colors[0], RGB8::new(0, 0, 0xFF));
        assert_eq!(next.colors[0], RGB8::new(0xFF, 0, 0));
    }

    #[test]
    fn level_scales_channels_at_parse_time() {
        let text = format!(
            r#"{{"system":{{"level":50}},"roll":[{{"delay":100,"color":{c}}}]}}"#,
            c = eight("#FF7F10"),
        );
        let mut roll = parse(&text).unwrap();
        let (frame, _) = roll.advance();
        assert_eq!(frame.colors[0], RGB8::new(127, 63, 8));
    }

    #[test]
    fn step_and_delay_are_sticky() {
        let text = format!(
            r#"{{"roll":[
                {{"step":"slow","delay":200,"color":{a}}},
                {{"color":{b}}},
                {{"step":"fast","color":{a}}}
            ]}}"#,
            a = eight("#010101"),
            b = eight("#020202"),
        );
        let mut roll = parse(&text).unwrap();
        let (first, second) = roll.advance();
        assert_eq!(first.transition, Transition::Interpolated);
        assert_eq!(first.delay_ms, 200);
        assert_eq!(second.transition, Transition::Interpolated);
        assert_eq!(second.delay_ms, 200);
        roll.advance();
        let (third, _) = roll.advance();
        assert_eq!(third.transition, Transition::Immediate);
        assert_eq!(third.delay_ms, 200);
    }

    #[test]
    fn defaults_are_fast_one_second() {
        let text = format!(r#"{{"roll":[{{"color":{c}}}]}}"#, c = eight("0xABCDEF"));
        let mut roll = parse(&text).unwrap();
        let (frame, _) = roll.advance();
        assert_eq!(frame.transition, Transition::Immediate);
        assert_eq!(frame.delay_ms, 1000);
        assert_eq!(frame.colors[7], RGB8::new(0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn bare_hex_is_accepted() {
        assert_eq!(parse_color("A0B0C0"), Some(RGB8::new(0xA0, 0xB0, 0xC0)));
        assert_eq!(parse_color("#A0B0C0"), Some(RGB8::new(0xA0, 0xB0, 0xC0)));
        assert_eq!(parse_color("0xA0B0C0"), Some(RGB8::new(0xA0, 0xB0, 0xC0)));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert_eq!(parse_color("#A0B0C"), None);
        assert_eq!(parse_color("#A0B0C0D0"), None);
        assert_eq!(parse_color("zzzzzz"), None);
        let text = format!(r#"{{"roll":[{{"color":{c}}}]}}"#, c = eight("nope"));
        assert!(matches!(
            parse(&text),
            Err(ConfigError::BadColor { record: 1, .. })
        ));
    }

    #[test]
    fn wrong_color_count_rejects_the_file() {
        let text = r##"{"roll":[{"color":["#FF0000","#00FF00"]}]}"##;
        assert!(matches!(
            parse(text),
            Err(ConfigError::WrongColorCount { record: 1, count: 2 })
        ));
    }

    #[test]
    fn missing_or_empty_roll_is_rejected() {
        assert!(matches!(parse(r#"{}"#), Err(ConfigError::MissingRoll)));
        assert!(matches!(
            parse(r#"{"roll":[]}"#),
            Err(ConfigError::MissingRoll)
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = format!(
            r#"{{"rolls":[{{"color":{c}}}]}}"#,
            c = eight("#000000")
        );
        assert!(matches!(parse(&text), Err(ConfigError::ParsingConfig(_))));

        let text = format!(
            r#"{{"system":{{"brightness":1}},"roll":[{{"color":{c}}}]}}"#,
            c = eight("#000000")
        );
        assert!(matches!(parse(&text), Err(ConfigError::ParsingConfig(_))));
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        let text = format!(
            r#"{{"system":{{"level":101}},"roll":[{{"color":{c}}}]}}"#,
            c = eight("#000000")
        );
        assert!(matches!(
            parse(&text),
            Err(ConfigError::LevelOutOfRange(101))
        ));
    }

    #[test]
    fn too_small_delay_is_rejected() {
        let text = format!(
            r#"{{"roll":[{{"delay":10,"color":{c}}}]}}"#,
            c = eight("#000000")
        );
        assert!(matches!(
            parse(&text),
            Err(ConfigError::DelayTooSmall { record: 1, delay: 10 })
        ));
    }

    #[test]
    fn bad_step_word_is_rejected() {
        let text = format!(
            r#"{{"roll":[{{"step":"medium","color":{c}}}]}}"#,
            c = eight("#000000")
        );
        assert!(matches!(parse(&text), Err(ConfigError::ParsingConfig(_))));
    }
}
