//! Numeric conversions between the driver's packed field encodings and display values.

/// Largest value a polar direction field may report; maps to a full turn.
pub const POLAR_FULL_TURN: u32 = 32767;
static_assertions::const_assert_eq!(POLAR_FULL_TURN, i16::MAX as u32);

/// Sentinel used by duration-like 16-bit fields to mean "no limit".
pub const INFINITE_WORD: u16 = 0xFFFF;

/// Sentinel loop count meaning "loop until explicitly stopped".
pub const LOOP_UNTIL_STOPPED: u8 = 0xFF;

/// Interprets `b` as an 8-bit two's complement integer.
pub fn twos_complement_byte(b: u8) -> i32 {
	if b & 0x80 == 0 {
		b as i32
	} else {
		-(((!b) as i32) + 1)
	}
}

/// Interprets `w` as a 16-bit two's complement integer.
pub fn twos_complement_word(w: u16) -> i32 {
	if w & 0x8000 == 0 {
		w as i32
	} else {
		-(((!w) as i32) + 1)
	}
}

/// Scales a 0..=255 byte to a 0..=100 percentage, truncating.
pub fn byte_to_percent(b: u8) -> u32 {
	b as u32 * 100 / 255
}

/// Converts a polar direction value to whole degrees, truncating.
pub fn polar_to_degrees(polar: u16) -> u32 {
	polar as u32 * 360 / POLAR_FULL_TURN
}

/// Converts a 0..=255 periodic phase to tenths of a degree, truncating.
pub fn phase_to_decidegrees(phase: u16) -> u32 {
	phase as u32 * 3600 / 255
}
