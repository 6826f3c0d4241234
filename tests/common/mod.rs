#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use tm13xx::{DataPin, TM13xx};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Clk(bool),
    Dio(bool),
    DioOutput,
    DioInput,
    DioRead,
    Delay(u32),
}

/// Shared record of everything the driver did to the two lines.
#[derive(Default)]
pub struct Wire {
    pub events: Vec<Event>,
    /// Peer pulls DIO low while CLK is high and DIO is released.
    pub acknowledge: bool,
    clk_level: bool,
    dio_input: bool,
    dio_level: bool,
}

pub type SharedWire = Rc<RefCell<Wire>>;

pub struct SimClk(pub SharedWire);
pub struct SimDio(pub SharedWire);
pub struct SimDelay(pub SharedWire);

impl ErrorType for SimClk {
    type Error = Infallible;
}

impl OutputPin for SimClk {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.0.borrow_mut();
        wire.clk_level = false;
        wire.events.push(Event::Clk(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.0.borrow_mut();
        wire.clk_level = true;
        wire.events.push(Event::Clk(true));
        Ok(())
    }
}

impl ErrorType for SimDio {
    type Error = Infallible;
}

impl OutputPin for SimDio {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.0.borrow_mut();
        wire.dio_level = false;
        wire.events.push(Event::Dio(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.0.borrow_mut();
        wire.dio_level = true;
        wire.events.push(Event::Dio(true));
        Ok(())
    }
}

impl InputPin for SimDio {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let mut wire = self.0.borrow_mut();
        wire.events.push(Event::DioRead);
        if wire.dio_input {
            Ok(!(wire.acknowledge && wire.clk_level))
        } else {
            Ok(wire.dio_level)
        }
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_high()?)
    }
}

impl DataPin for SimDio {
    fn set_output(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.0.borrow_mut();
        wire.dio_input = false;
        wire.events.push(Event::DioOutput);
        Ok(())
    }

    fn set_input_pull_up(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.0.borrow_mut();
        wire.dio_input = true;
        wire.events.push(Event::DioInput);
        Ok(())
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().events.push(Event::Delay(ns / 1000));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().events.push(Event::Delay(us));
    }
}

pub type SimDisplay = TM13xx<SimClk, SimDio, SimDelay>;

pub fn wire(acknowledge: bool) -> SharedWire {
    Rc::new(RefCell::new(Wire {
        acknowledge,
        ..Default::default()
    }))
}

pub fn display(wire: &SharedWire) -> SimDisplay {
    TM13xx::new(
        SimClk(wire.clone()),
        SimDio(wire.clone()),
        SimDelay(wire.clone()),
    )
}

pub fn clear_events(wire: &SharedWire) {
    wire.borrow_mut().events.clear();
}

/// DIO levels sampled on each rising CLK edge while DIO is driven.
pub fn sampled_bits(events: &[Event]) -> Vec<bool> {
    let mut bits = Vec::new();
    let (mut clk, mut dio, mut input) = (false, false, false);
    for event in events {
        match *event {
            Event::Clk(level) => {
                if level && !clk && !input {
                    bits.push(dio);
                }
                clk = level;
            }
            Event::Dio(level) => dio = level,
            Event::DioInput => input = true,
            Event::DioOutput => input = false,
            Event::DioRead | Event::Delay(_) => {}
        }
    }
    bits
}

/// Decode the trace into start/stop framed transactions. Bits are assembled
/// LSB first; a rising clock with DIO released closes the current byte.
pub fn transactions(events: &[Event]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    let mut bytes = Vec::new();
    let (mut clk, mut dio, mut input, mut active) = (false, false, false, false);
    let (mut bits, mut current) = (0u8, 0u8);

    for event in events {
        match *event {
            Event::Clk(level) => {
                if level && !clk && active {
                    if input {
                        bytes.push(current);
                        bits = 0;
                        current = 0;
                    } else if bits < 8 {
                        current |= u8::from(dio) << bits;
                        bits += 1;
                    }
                }
                clk = level;
            }
            Event::Dio(level) => {
                if clk && !input {
                    if dio && !level {
                        active = true;
                        bytes = Vec::new();
                        bits = 0;
                        current = 0;
                    } else if !dio && level && active {
                        active = false;
                        frames.push(std::mem::take(&mut bytes));
                    }
                }
                dio = level;
            }
            Event::DioInput => input = true,
            Event::DioOutput => input = false,
            Event::DioRead | Event::Delay(_) => {}
        }
    }
    frames
}

/// Digits written by the most recent display update.
pub fn last_segments(wire: &SharedWire) -> [u8; 4] {
    let frames = transactions(&wire.borrow().events);
    let frame = frames
        .iter()
        .rev()
        .find(|frame| frame.len() == 5)
        .expect("no display write in trace");
    [frame[1], frame[2], frame[3], frame[4]]
}
