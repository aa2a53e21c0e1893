use std::fmt::{Display, Write as _};

use crate::ffb::types::{RawFrame};

/// IOCTL codes the driver uses to deliver FFB frames.
pub const IOCTL_HID_SET_FEATURE: u32 = 0xB0191;
pub const IOCTL_HID_WRITE_REPORT: u32 = 0xB000F;

/// Size of the frame header (size and command) the driver counts into a frame's size.
const FRAME_HEADER_SIZE: usize = 8;

/// Hex dump of a raw FFB frame, in the layout the vJoy tooling prints.
pub struct FrameDump<'a>(pub RawFrame<'a>);

impl Display for FrameDump<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let RawFrame { command, data } = self.0;
		let report_id = data.first().copied().unwrap_or(0);

		let mut bytes = String::with_capacity(data.len() * 3);
		for b in data {
			let _ = write!(bytes, " {:02X}", b);
		}

		write!(f, "FFB Size {} Cmd:{:08X} ID:{:02X} Size:{:02} -{}",
			data.len() + FRAME_HEADER_SIZE, command, report_id, data.len(), bytes)
	}
}
