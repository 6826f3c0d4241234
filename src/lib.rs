#![no_std]

mod bus;
mod constants;
mod format;

pub use bus::{Bus, DataPin, OpenDrain};
pub use constants::*;
pub use format::{
    clamp_field, encode_digit, number_segments, time_segments, try_number_segments, Segments,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use num_traits::ToPrimitive;

pub struct TM13xx<CLK, DIO, DELAY> {
    bus: Bus<CLK, DIO, DELAY>,
    brightness_cmd: u8, // resent after every display write
    colon_digit: u8,
}

impl<CLK, DIO, DELAY, E> TM13xx<CLK, DIO, DELAY>
where
    CLK: OutputPin<Error = E>,
    DIO: DataPin<Error = E>,
    DELAY: DelayNs,
{
    pub fn new(clk: CLK, dio: DIO, delay: DELAY) -> Self {
        Self {
            bus: Bus::new(clk, dio, delay),
            brightness_cmd: brightness_command(MAX_BRIGHTNESS, true),
            colon_digit: DEFAULT_COLON_DIGIT,
        }
    }

    pub fn with_bit_delay(mut self, us: u32) -> Self {
        self.bus.set_bit_delay(us);
        self
    }

    pub fn destroy(self) -> (CLK, DIO, DELAY) {
        self.bus.destroy()
    }

    pub fn bus(&self) -> &Bus<CLK, DIO, DELAY> {
        &self.bus
    }

    /// Raw bus access, e.g. to check acknowledgments with `write_byte`.
    pub fn bus_mut(&mut self) -> &mut Bus<CLK, DIO, DELAY> {
        &mut self.bus
    }

    pub fn set_bit_delay(&mut self, us: u32) {
        self.bus.set_bit_delay(us);
    }

    /// Digit whose indicator bit `show_time` uses as the colon. Modules differ
    /// in how the colon is wired; digit 1 is the common case.
    pub fn set_colon_digit(&mut self, digit: u8) {
        self.colon_digit = digit.min(MAX_DIGITS - 1);
    }

    pub fn colon_digit(&self) -> u8 {
        self.colon_digit
    }

    pub fn init(&mut self) -> Result<(), TM13xxError<E>> {
        self.bus.idle()?;
        self.set_brightness(MAX_BRIGHTNESS, true)?;
        self.clear()?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), TM13xxError<E>> {
        self.set_segments(&[BLANK; MAX_DIGITS as usize])
    }

    /// Cached (level, on) pair.
    pub fn brightness(&self) -> (u8, bool) {
        (
            self.brightness_cmd & command::BRIGHTNESS_MASK,
            self.brightness_cmd & command::DISPLAY_ON == command::DISPLAY_ON,
        )
    }

    pub fn set_brightness(&mut self, level: u8, on: bool) -> Result<(), TM13xxError<E>> {
        self.brightness_cmd = brightness_command(level, on);
        self.bus.send_command(self.brightness_cmd)
    }

    pub fn try_set_brightness(&mut self, level: u8, on: bool) -> Result<(), TM13xxError<E>> {
        if level > MAX_BRIGHTNESS {
            return Err(TM13xxError::InvalidValue);
        }
        self.set_brightness(level, on)
    }

    pub fn set_display_on(&mut self, on: bool) -> Result<(), TM13xxError<E>> {
        let (level, _) = self.brightness();
        self.set_brightness(level, on)
    }

    /// Fixed-address mode command. Display writes use auto-increment instead.
    pub fn set_address(&mut self, address: u8) -> Result<(), TM13xxError<E>> {
        self.bus
            .send_command(command::ADDRESS | (address & command::ADDRESS_MASK))
    }

    /// Load all four digits from address 0, then reassert brightness; the
    /// chip may fall back to a previous display control state otherwise.
    pub fn set_segments(&mut self, segments: &Segments) -> Result<(), TM13xxError<E>> {
        self.bus.send_command(command::DATA_AUTO_INCREMENT)?;

        self.bus.start()?;
        self.bus.write_byte(command::ADDRESS)?;
        for &segment in segments {
            self.bus.write_byte(segment)?;
        }
        self.bus.stop()?;

        self.bus.send_command(self.brightness_cmd)
    }

    pub fn show_number<T>(
        &mut self,
        value: T,
        leading_zero: bool,
        allow_negative: bool,
    ) -> Result<(), TM13xxError<E>>
    where
        T: ToPrimitive,
    {
        self.show_number_at(value, MAX_DIGITS, 0, leading_zero, allow_negative)
    }

    pub fn show_number_at<T>(
        &mut self,
        value: T,
        length: u8,
        pos: u8,
        leading_zero: bool,
        allow_negative: bool,
    ) -> Result<(), TM13xxError<E>>
    where
        T: ToPrimitive,
    {
        let value = match value.to_i64() {
            Some(value) => value,
            None if is_negative(&value) && !allow_negative => 0,
            // anything outside i64 is far too wide for the display
            None if is_negative(&value) => i64::MIN,
            None => i64::MAX,
        };
        let segments = number_segments(value, length, pos, leading_zero, allow_negative);
        self.set_segments(&segments)
    }

    pub fn try_show_number<T>(
        &mut self,
        value: T,
        leading_zero: bool,
        allow_negative: bool,
    ) -> Result<(), TM13xxError<E>>
    where
        T: ToPrimitive,
    {
        self.try_show_number_at(value, MAX_DIGITS, 0, leading_zero, allow_negative)
    }

    pub fn try_show_number_at<T>(
        &mut self,
        value: T,
        length: u8,
        pos: u8,
        leading_zero: bool,
        allow_negative: bool,
    ) -> Result<(), TM13xxError<E>>
    where
        T: ToPrimitive,
    {
        let value = match value.to_i64() {
            Some(value) => value,
            None if is_negative(&value) && !allow_negative => {
                return Err(TM13xxError::InvalidValue)
            }
            None => return Err(TM13xxError::Overflow),
        };
        let segments = try_number_segments(value, length, pos, leading_zero, allow_negative)?;
        self.set_segments(&segments)
    }

    pub fn show_time(&mut self, hour: u8, minute: u8, colon: bool) -> Result<(), TM13xxError<E>> {
        let segments = time_segments(hour, minute, colon, self.colon_digit);
        self.set_segments(&segments)
    }

    pub fn try_show_time(
        &mut self,
        hour: u8,
        minute: u8,
        colon: bool,
    ) -> Result<(), TM13xxError<E>> {
        if hour > 23 || minute > 59 {
            return Err(TM13xxError::InvalidValue);
        }
        self.show_time(hour, minute, colon)
    }
}

fn is_negative<T: ToPrimitive>(value: &T) -> bool {
    value.to_i128().map_or(false, |v| v < 0)
}

/// Display control command: on/off in bit 3, level (clamped to 7) in bits 2:0.
pub fn brightness_command(level: u8, on: bool) -> u8 {
    let base = if on {
        command::DISPLAY_ON
    } else {
        command::DISPLAY_OFF
    };
    base | level.min(MAX_BRIGHTNESS)
}

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TM13xxError<E> {
    PinError(E),
    InvalidValue,
    InvalidLocation(u8),
    Overflow,
}

impl<E> From<E> for TM13xxError<E> {
    fn from(error: E) -> Self {
        TM13xxError::PinError(error)
    }
}
