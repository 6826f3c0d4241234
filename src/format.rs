//! Pure conversions from values to 4-byte segment frames.

use crate::{TM13xxError, BLANK, DASH, DOT_MASK, MAX_DIGITS, NUMBERS};

/// One byte per digit, left to right.
pub type Segments = [u8; MAX_DIGITS as usize];

/// Glyph for a decimal digit, or blank for anything outside 0-9.
pub fn encode_digit<T: Into<i64>>(digit: T) -> u8 {
    match digit.into() {
        d @ 0..=9 => NUMBERS[d as usize],
        _ => BLANK,
    }
}

/// Clamp a field to the display: length at most 4, position at most 3, and
/// the field shortened so it never runs past the last digit.
pub fn clamp_field(length: u8, pos: u8) -> (usize, usize) {
    let pos = pos.min(MAX_DIGITS - 1);
    let length = length.min(MAX_DIGITS).min(MAX_DIGITS - pos);
    (length as usize, pos as usize)
}

/// Lay out `value` right-aligned in the field `[pos, pos + length)`.
///
/// Leading zeros are blanked unless `leading_zero` is set, but the ones digit
/// always shows. A value too wide for the field fills it with dashes. A
/// negative value (when allowed) puts a dash on the leftmost field digit,
/// replacing whatever digit was there; when not allowed it renders as zero.
pub fn number_segments(
    value: i64,
    length: u8,
    pos: u8,
    leading_zero: bool,
    allow_negative: bool,
) -> Segments {
    let (length, pos) = clamp_field(length, pos);
    let mut segments = [BLANK; MAX_DIGITS as usize];
    if length == 0 {
        return segments;
    }

    let negative = value < 0 && allow_negative;
    let mut magnitude = if value < 0 && !allow_negative {
        0
    } else {
        value.unsigned_abs()
    };

    let last = pos + length - 1;
    for i in (pos..=last).rev() {
        let digit = (magnitude % 10) as u8;
        magnitude /= 10;

        segments[i] = if !leading_zero && magnitude == 0 && digit == 0 && i != last {
            BLANK
        } else {
            NUMBERS[digit as usize]
        };
    }

    if magnitude > 0 {
        segments[pos..=last].fill(DASH);
    }

    if negative {
        segments[pos] = DASH;
    }

    segments
}

/// Checked counterpart of [`number_segments`]: rejects fields that would be
/// clamped, disallowed negatives, and values that do not fit with their sign.
pub fn try_number_segments<E>(
    value: i64,
    length: u8,
    pos: u8,
    leading_zero: bool,
    allow_negative: bool,
) -> Result<Segments, TM13xxError<E>> {
    if pos >= MAX_DIGITS {
        return Err(TM13xxError::InvalidLocation(pos));
    }
    if length == 0 || length > MAX_DIGITS - pos {
        return Err(TM13xxError::InvalidValue);
    }
    if value < 0 && !allow_negative {
        return Err(TM13xxError::InvalidValue);
    }

    let mut width = u8::from(value < 0);
    let mut magnitude = value.unsigned_abs();
    loop {
        width += 1;
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }
    if width > length {
        return Err(TM13xxError::Overflow);
    }

    Ok(number_segments(
        value,
        length,
        pos,
        leading_zero,
        allow_negative,
    ))
}

/// HHMM with every digit shown. `colon_digit` gets the indicator bit when
/// `colon` is set; values of 100 or more blank their tens digit.
pub fn time_segments(hour: u8, minute: u8, colon: bool, colon_digit: u8) -> Segments {
    let mut segments = [
        encode_digit(hour / 10),
        encode_digit(hour % 10),
        encode_digit(minute / 10),
        encode_digit(minute % 10),
    ];

    if colon {
        segments[colon_digit.min(MAX_DIGITS - 1) as usize] |= DOT_MASK;
    }

    segments
}
