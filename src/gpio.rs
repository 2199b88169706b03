//! Register-level access to the BCM283x GPIO controller.
//!
//! The controller exposes 54 pins in two 32-bit banks (0–31 and 32–53).
//! Everything here is a single volatile register write or read; nothing can
//! fail once the block is mapped.

use memmap2::MmapMut;

use crate::error::Error;

/// The BCM2837 GPIO block is 180 bytes of registers.
const REGISTER_LEN: usize = 180;

const GPIOMEM_PATH: &str = "/dev/gpiomem";

pub(crate) const MAX_PIN: u8 = 53;

// Byte offsets into the register block.
const GPFSEL0: usize = 0x00;
const GPSET0: usize = 0x1C;
const GPSET1: usize = 0x20;
const GPCLR0: usize = 0x28;
const GPCLR1: usize = 0x2C;
const GPEDS0: usize = 0x40;
const GPEDS1: usize = 0x44;
const GPREN0: usize = 0x4C;
const GPREN1: usize = 0x50;
const GPFEN0: usize = 0x58;
const GPFEN1: usize = 0x5C;
const GPHEN0: usize = 0x64;
const GPHEN1: usize = 0x68;
const GPLEN0: usize = 0x70;
const GPLEN1: usize = 0x74;
const GPAREN0: usize = 0x7C;
const GPAREN1: usize = 0x80;
const GPAFEN0: usize = 0x88;
const GPAFEN1: usize = 0x8C;

/// Function-select encoding of a pin, a 3-bit field in GPFSEL0–5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)] // full register encoding; the clock only selects Output
pub enum PinFunction {
    Input,
    Output,
    Alt0,
    Alt1,
    Alt2,
    Alt3,
    Alt4,
    Alt5,
}

impl PinFunction {
    fn bits(self) -> u32 {
        match self {
            Self::Input => 0b000,
            Self::Output => 0b001,
            Self::Alt0 => 0b100,
            Self::Alt1 => 0b101,
            Self::Alt2 => 0b110,
            Self::Alt3 => 0b111,
            Self::Alt4 => 0b011,
            Self::Alt5 => 0b010,
        }
    }

    fn from_bits(bits: u32) -> Self {
        match bits & 0b111 {
            0b000 => Self::Input,
            0b001 => Self::Output,
            0b100 => Self::Alt0,
            0b101 => Self::Alt1,
            0b110 => Self::Alt2,
            0b111 => Self::Alt3,
            0b011 => Self::Alt4,
            _ => Self::Alt5,
        }
    }
}

/// What the event-detect machinery should watch a pin for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum EventDetect {
    Rising,
    Falling,
    Both,
    High,
    Low,
}

/// Exclusive handle over the mapped GPIO register block.
pub struct RegisterBank {
    map: MmapMut,
}

impl RegisterBank {
    /// Maps `/dev/gpiomem` read-write and shared.
    pub fn open() -> Result<Self, Error> {
        let unavailable = |source| Error::GpioUnavailable {
            path: GPIOMEM_PATH,
            source,
        };

        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(GPIOMEM_PATH)
            .map_err(unavailable)?;

        let map = unsafe {
            memmap2::MmapOptions::new()
                .len(REGISTER_LEN)
                .map_mut(&file)
        }
        .map_err(unavailable)?;

        tracing::debug!(path = GPIOMEM_PATH, "Mapped GPIO register block");
        Ok(Self { map })
    }

    pub fn set_function(&mut self, pin: u8, function: PinFunction) {
        let (offset, shift) = function_select(pin);
        let mut value = self.read_register(offset);
        value &= !(0b111 << shift);
        value |= function.bits() << shift;
        self.write_register(offset, value);
    }

    #[allow(dead_code)] // readback half of the function-select contract
    pub fn function(&self, pin: u8) -> PinFunction {
        let (offset, shift) = function_select(pin);
        PinFunction::from_bits(self.read_register(offset) >> shift)
    }

    pub fn set_output(&mut self, pin: u8) {
        let (offset, bit) = bank_register(pin, GPSET0, GPSET1);
        self.write_register(offset, bit);
    }

    pub fn clear_output(&mut self, pin: u8) {
        let (offset, bit) = bank_register(pin, GPCLR0, GPCLR1);
        self.write_register(offset, bit);
    }

    /// Arms event detection for a pin. The pending event-status bit is
    /// cleared before arming; arming over a stale status bit would trigger
    /// immediately.
    #[allow(dead_code)] // the clock board's buttons are not wired up yet
    pub fn set_event_detect(&mut self, pin: u8, detect: EventDetect, async_edge: bool) {
        let (status, bit) = bank_register(pin, GPEDS0, GPEDS1);
        self.write_register(status, bit);

        let (rising, falling) = if async_edge {
            ((GPAREN0, GPAREN1), (GPAFEN0, GPAFEN1))
        } else {
            ((GPREN0, GPREN1), (GPFEN0, GPFEN1))
        };

        if matches!(detect, EventDetect::Rising | EventDetect::Both) {
            let (offset, bit) = bank_register(pin, rising.0, rising.1);
            self.write_register(offset, bit);
        }
        if matches!(detect, EventDetect::Falling | EventDetect::Both) {
            let (offset, bit) = bank_register(pin, falling.0, falling.1);
            self.write_register(offset, bit);
        }
        if detect == EventDetect::High {
            let (offset, bit) = bank_register(pin, GPHEN0, GPHEN1);
            self.write_register(offset, bit);
        }
        if detect == EventDetect::Low {
            let (offset, bit) = bank_register(pin, GPLEN0, GPLEN1);
            self.write_register(offset, bit);
        }
    }

    fn read_register(&self, offset: usize) -> u32 {
        assert!(offset % 4 == 0 && offset + 4 <= REGISTER_LEN);
        // Volatile: these are device registers, not memory.
        unsafe { std::ptr::read_volatile(self.map.as_ptr().add(offset).cast::<u32>()) }
    }

    fn write_register(&mut self, offset: usize, value: u32) {
        assert!(offset % 4 == 0 && offset + 4 <= REGISTER_LEN);
        unsafe { std::ptr::write_volatile(self.map.as_mut_ptr().add(offset).cast::<u32>(), value) }
    }

    #[cfg(test)]
    fn anonymous() -> Self {
        Self {
            map: MmapMut::map_anon(REGISTER_LEN).expect("anonymous mapping"),
        }
    }
}

/// GPFSEL register offset and field shift for a pin.
fn function_select(pin: u8) -> (usize, u32) {
    assert!(pin <= MAX_PIN);
    let offset = GPFSEL0 + 4 * usize::from(pin / 10);
    let shift = u32::from(pin % 10) * 3;
    (offset, shift)
}

/// Low- or high-bank register and the single set bit for a pin.
fn bank_register(pin: u8, low: usize, high: usize) -> (usize, u32) {
    assert!(pin <= MAX_PIN);
    if pin >= 32 {
        (high, 1 << (pin - 32))
    } else {
        (low, 1 << pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_output_touches_only_the_low_bank() {
        let mut bank = RegisterBank::anonymous();
        bank.set_output(5);
        assert_eq!(bank.read_register(GPSET0), 1 << 5);
        assert_eq!(bank.read_register(GPSET1), 0);
        assert_eq!(bank.read_register(GPCLR0), 0);
    }

    #[test]
    fn clear_output_touches_only_the_high_bank_for_high_pins() {
        let mut bank = RegisterBank::anonymous();
        bank.clear_output(40);
        assert_eq!(bank.read_register(GPCLR1), 1 << 8);
        assert_eq!(bank.read_register(GPCLR0), 0);
        assert_eq!(bank.read_register(GPSET1), 0);
    }

    #[test]
    fn all_pins_map_to_exactly_one_bank_bit() {
        for pin in 0..=MAX_PIN {
            let (offset, bit) = bank_register(pin, GPSET0, GPSET1);
            assert_eq!(bit.count_ones(), 1);
            if pin >= 32 {
                assert_eq!(offset, GPSET1);
                assert_eq!(bit, 1 << (pin - 32));
            } else {
                assert_eq!(offset, GPSET0);
                assert_eq!(bit, 1 << pin);
            }
        }
    }

    #[test]
    fn function_select_preserves_neighboring_fields() {
        let mut bank = RegisterBank::anonymous();
        // Pins 10..20 share GPFSEL1.
        bank.set_function(11, PinFunction::Alt3);
        bank.set_function(12, PinFunction::Output);
        bank.set_function(12, PinFunction::Input);
        assert_eq!(bank.function(11), PinFunction::Alt3);
        assert_eq!(bank.function(12), PinFunction::Input);
    }

    #[test]
    fn function_select_round_trips_every_mode() {
        let modes = [
            PinFunction::Input,
            PinFunction::Output,
            PinFunction::Alt0,
            PinFunction::Alt1,
            PinFunction::Alt2,
            PinFunction::Alt3,
            PinFunction::Alt4,
            PinFunction::Alt5,
        ];
        let mut bank = RegisterBank::anonymous();
        for mode in modes {
            bank.set_function(22, mode);
            assert_eq!(bank.function(22), mode);
        }
    }

    #[test]
    fn event_detect_clears_status_and_arms_the_right_pair() {
        let mut bank = RegisterBank::anonymous();
        bank.set_event_detect(4, EventDetect::Rising, false);
        assert_eq!(bank.read_register(GPEDS0), 1 << 4);
        assert_eq!(bank.read_register(GPREN0), 1 << 4);
        assert_eq!(bank.read_register(GPAREN0), 0);

        bank.set_event_detect(33, EventDetect::Falling, true);
        assert_eq!(bank.read_register(GPEDS1), 1 << 1);
        assert_eq!(bank.read_register(GPAFEN1), 1 << 1);
        assert_eq!(bank.read_register(GPFEN1), 0);
    }

    #[test]
    fn both_edges_arm_rising_and_falling() {
        let mut bank = RegisterBank::anonymous();
        bank.set_event_detect(17, EventDetect::Both, false);
        assert_eq!(bank.read_register(GPREN0), 1 << 17);
        assert_eq!(bank.read_register(GPFEN0), 1 << 17);
        assert_eq!(bank.read_register(GPHEN0), 0);
    }

    #[test]
    fn level_detect_uses_the_level_registers() {
        let mut bank = RegisterBank::anonymous();
        bank.set_event_detect(50, EventDetect::Low, false);
        assert_eq!(bank.read_register(GPLEN1), 1 << 18);
        assert_eq!(bank.read_register(GPREN1), 0);
    }
}
