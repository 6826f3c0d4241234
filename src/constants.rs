pub const MAX_DIGITS: u8 = 4;
pub const MAX_BRIGHTNESS: u8 = 7; // 3 bits
pub const DEFAULT_BIT_DELAY_US: u32 = 3;
pub const DEFAULT_COLON_DIGIT: u8 = 1;

pub const BLANK: u8 = 0x00;
pub const DASH: u8 = 0x40; // segment G
pub const DOT_MASK: u8 = 0x80;

// 0bPGFEDCBA
pub const NUMBERS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

pub mod command {
    pub const DATA_AUTO_INCREMENT: u8 = 0x40;
    pub const ADDRESS: u8 = 0xC0; // bits 1:0 select the digit
    pub const ADDRESS_MASK: u8 = 0x03;
    pub const DISPLAY_OFF: u8 = 0x80; // bits 2:0 brightness
    pub const DISPLAY_ON: u8 = 0x88; // bit 3 set: display enabled
    pub const BRIGHTNESS_MASK: u8 = 0x07;
}
