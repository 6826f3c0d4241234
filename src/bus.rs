//! Two-wire clock/data bus used by the TM1637 family.
//!
//! The bus looks like I2C but has no device address, sends bytes LSB first,
//! and expects the peer to pull DIO low during the ninth clock as an ack.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::{TM13xxError, DEFAULT_BIT_DELAY_US};

/// Data line that can be switched between driving and reading.
pub trait DataPin: OutputPin + InputPin {
    fn set_output(&mut self) -> Result<(), Self::Error>;

    /// Release the line as an input with pull-up so the peer can drive it.
    fn set_input_pull_up(&mut self) -> Result<(), Self::Error>;
}

/// Adapter for an open-drain pin that can be read back while configured as
/// output. Releasing the line means driving it high and letting the pull-up
/// hold it there.
pub struct OpenDrain<P>(pub P);

impl<P> OpenDrain<P> {
    pub fn into_inner(self) -> P {
        self.0
    }
}

impl<P: ErrorType> ErrorType for OpenDrain<P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for OpenDrain<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }
}

impl<P: InputPin> InputPin for OpenDrain<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.0.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.0.is_low()
    }
}

impl<P: OutputPin + InputPin> DataPin for OpenDrain<P> {
    /// No-op: an open-drain line is always driven.
    fn set_output(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_input_pull_up(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }
}

pub struct Bus<CLK, DIO, DELAY> {
    clk: CLK,
    dio: DIO,
    delay: DELAY,
    bit_delay_us: u32,
}

impl<CLK, DIO, DELAY, E> Bus<CLK, DIO, DELAY>
where
    CLK: OutputPin<Error = E>,
    DIO: DataPin<Error = E>,
    DELAY: DelayNs,
{
    pub fn new(clk: CLK, dio: DIO, delay: DELAY) -> Self {
        Self {
            clk,
            dio,
            delay,
            bit_delay_us: DEFAULT_BIT_DELAY_US,
        }
    }

    pub fn destroy(self) -> (CLK, DIO, DELAY) {
        (self.clk, self.dio, self.delay)
    }

    pub fn bit_delay(&self) -> u32 {
        self.bit_delay_us
    }

    /// Settle time after every line transition. Lengthen for long or
    /// capacitive wiring.
    pub fn set_bit_delay(&mut self, us: u32) {
        self.bit_delay_us = us;
    }

    /// Drive both lines high, the idle state of the bus.
    pub fn idle(&mut self) -> Result<(), TM13xxError<E>> {
        self.dio.set_output()?;
        self.clk.set_high()?;
        self.dio.set_high()?;
        Ok(())
    }

    /// DIO falls while CLK is high.
    pub fn start(&mut self) -> Result<(), TM13xxError<E>> {
        self.dio.set_output()?;
        self.dio.set_high()?;
        self.clk.set_high()?;
        self.wait();
        self.dio.set_low()?;
        self.wait();
        self.clk.set_low()?;
        self.wait();
        Ok(())
    }

    /// DIO rises while CLK is high.
    pub fn stop(&mut self) -> Result<(), TM13xxError<E>> {
        self.dio.set_output()?;
        self.clk.set_low()?;
        self.dio.set_low()?;
        self.wait();
        self.clk.set_high()?;
        self.wait();
        self.dio.set_high()?;
        self.wait();
        Ok(())
    }

    /// Clock out one byte LSB first and sample the ack bit.
    ///
    /// Returns `Ok(true)` when the peer held DIO low during the ninth clock.
    /// DIO is left in output mode either way.
    pub fn write_byte(&mut self, byte: u8) -> Result<bool, TM13xxError<E>> {
        let mut data = byte;
        for _ in 0..8 {
            self.clk.set_low()?;
            self.wait();
            if data & 0x01 != 0 {
                self.dio.set_high()?;
            } else {
                self.dio.set_low()?;
            }
            self.wait();
            self.clk.set_high()?;
            self.wait();
            data >>= 1;
        }

        self.clk.set_low()?;
        self.dio.set_input_pull_up()?;
        self.wait();
        self.clk.set_high()?;
        self.wait();
        let ack = self.dio.is_low();
        self.clk.set_low()?;
        self.wait();
        self.dio.set_output()?;

        Ok(ack?)
    }

    /// Write a run of bytes inside one start/stop frame. Returns true only if
    /// every byte was acknowledged.
    pub fn write_frame(&mut self, bytes: &[u8]) -> Result<bool, TM13xxError<E>> {
        self.start()?;
        let mut acked = true;
        for &byte in bytes {
            acked &= self.write_byte(byte)?;
        }
        self.stop()?;
        Ok(acked)
    }

    /// Single-byte transaction. The ack is dropped.
    pub fn send_command(&mut self, cmd: u8) -> Result<(), TM13xxError<E>> {
        let acked = self.write_frame(&[cmd])?;
        if !acked {
            #[cfg(feature = "defmt")]
            defmt::trace!("tm13xx: command {=u8:#x} not acknowledged", cmd);
        }
        Ok(())
    }

    fn wait(&mut self) {
        self.delay.delay_us(self.bit_delay_us);
    }
}
