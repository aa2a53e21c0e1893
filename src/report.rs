use std::collections::{BTreeSet};
use std::ops::{RangeInclusive};

use crate::{DeviceId};

/// Number of buttons a physical state record and a vJoy report can carry.
pub const NUM_BUTTONS: usize = 128;

/// Buttons per report word.
const BANK_SIZE: usize = 32;

/// Hat value meaning "centered" for both continuous and discrete hats.
pub const HAT_NEUTRAL: u32 = 0xFFFF_FFFF;

/// Largest axis value a vJoy device accepts.
pub const VJOY_AXIS_MAX: i32 = 0x7FFF;

/// Largest axis value of a physical state record.
pub const PHYSICAL_AXIS_MAX: i32 = 0xFFFF;

/// Polled state of a physical joystick, in the fixed layout of the physical input library.
///
/// Axes span `0..=65535`. POVs hold hundredths of a degree, or `-1` when centered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PhysicalState {
	pub x: i32,
	pub y: i32,
	pub z: i32,
	pub rotation_x: i32,
	pub rotation_y: i32,
	pub rotation_z: i32,
	pub sliders: [i32; 2],
	pub povs: [i32; 4],
	pub buttons: [bool; NUM_BUTTONS],
}

impl Default for PhysicalState {
	fn default() -> Self {
		PhysicalState {
			x: 0,
			y: 0,
			z: 0,
			rotation_x: 0,
			rotation_y: 0,
			rotation_z: 0,
			sliders: [0; 2],
			povs: [-1; 4],
			buttons: [false; NUM_BUTTONS],
		}
	}
}

/// The eight axes a physical state record and a vJoy report have in common.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum Axis {
	X,
	Y,
	Z,
	RX,
	RY,
	RZ,
	Slider,
	Dial,
}

impl Axis {
	pub fn all() -> impl Iterator<Item = Axis> + DoubleEndedIterator + ExactSizeIterator {
		[
			Axis::X,
			Axis::Y,
			Axis::Z,
			Axis::RX,
			Axis::RY,
			Axis::RZ,
			Axis::Slider,
			Axis::Dial,
		].into_iter()
	}

	pub fn name(&self) -> &'static str {
		match self {
			Axis::X => "X",
			Axis::Y => "Y",
			Axis::Z => "Z",
			Axis::RX => "Rx",
			Axis::RY => "Ry",
			Axis::RZ => "Rz",
			Axis::Slider => "SL0",
			Axis::Dial => "SL1",
		}
	}
}

impl PhysicalState {
	pub fn axis(&self, axis: Axis) -> i32 {
		match axis {
			Axis::X => self.x,
			Axis::Y => self.y,
			Axis::Z => self.z,
			Axis::RX => self.rotation_x,
			Axis::RY => self.rotation_y,
			Axis::RZ => self.rotation_z,
			Axis::Slider => self.sliders[0],
			Axis::Dial => self.sliders[1],
		}
	}

	pub fn trigger(&self) -> bool {
		self.buttons[0]
	}
}

/// A full vJoy position report, submitted to the driver in one call.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Report {
	pub device: u8,
	pub axes: [i32; 8],
	pub buttons: [u32; 4],
	pub hats: [u32; 4],
}

impl Report {
	pub fn new(device: DeviceId) -> Report {
		Report {
			device: device.to_raw(),
			axes: [0; 8],
			buttons: [0; 4],
			hats: [HAT_NEUTRAL; 4],
		}
	}

	pub fn axis(&self, axis: Axis) -> i32 {
		self.axes[axis as usize]
	}

	pub fn set_axis(&mut self, axis: Axis, value: i32) {
		self.axes[axis as usize] = value;
	}

	/// Button state by zero-based index, or `None` past the last button.
	pub fn button(&self, index: usize) -> Option<bool> {
		let word = self.buttons.get(index / BANK_SIZE)?;
		Some(word & (1 << (index % BANK_SIZE)) != 0)
	}
}

/// Packs up to 32 button states into a word; bit `i` is set iff `buttons[i]` is pressed.
pub fn pack_buttons(buttons: &[bool]) -> u32 {
	buttons.iter()
		.take(BANK_SIZE)
		.enumerate()
		.filter(|&(_, &pressed)| pressed)
		.fold(0, |word, (i, _)| word | (1 << i))
}

/// Physical buttons that are never forwarded.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ButtonMask(BTreeSet<usize>);

impl ButtonMask {
	pub fn new(buttons: impl IntoIterator<Item = usize>) -> ButtonMask {
		ButtonMask(buttons.into_iter().collect())
	}

	pub fn is_masked(&self, index: usize) -> bool {
		self.0.contains(&index)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Output range of each vJoy axis, as configured in the driver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AxisLimits([RangeInclusive<i32>; 8]);

impl AxisLimits {
	pub fn range(&self, axis: Axis) -> &RangeInclusive<i32> {
		&self.0[axis as usize]
	}

	pub fn set(&mut self, axis: Axis, range: RangeInclusive<i32>) {
		self.0[axis as usize] = range;
	}

	/// Maps a physical axis value (`0..=65535`) linearly onto the axis's output range, clamping
	/// values outside the physical range.
	pub fn scale(&self, axis: Axis, value: i32) -> i32 {
		let range = self.range(axis);
		let (min, max) = (*range.start() as i64, *range.end() as i64);
		if max < min {
			return min as i32;
		}

		let value = (value as i64).clamp(0, PHYSICAL_AXIS_MAX as i64);
		(min + value * (max - min + 1) / (PHYSICAL_AXIS_MAX as i64 + 1)) as i32
	}
}

impl Default for AxisLimits {
	/// The range every axis of a stock vJoy device has.
	fn default() -> Self {
		AxisLimits(std::array::from_fn(|_| 0..=VJOY_AXIS_MAX))
	}
}

/// Builds the report for `device` from a polled physical state.
///
/// Axes are scaled onto `limits`. Buttons are split into four banks of 32 with masked
/// buttons cleared. The first POV is forwarded as a continuous hat; the others stay centered.
pub fn translate(state: &PhysicalState, mask: &ButtonMask, limits: &AxisLimits, device: DeviceId) -> Report {
	let mut report = Report::new(device);

	for axis in Axis::all() {
		report.set_axis(axis, limits.scale(axis, state.axis(axis)));
	}

	let mut buttons = state.buttons;
	for (i, pressed) in buttons.iter_mut().enumerate() {
		if mask.is_masked(i) {
			*pressed = false;
		}
	}

	for (word, bank) in report.buttons.iter_mut().zip(buttons.chunks(BANK_SIZE)) {
		*word = pack_buttons(bank);
	}

	report.hats[0] = state.povs[0] as u32;
	report
}

#[cfg(test)]
mod tests {
	use super::*;

	fn device() -> DeviceId {
		DeviceId::from_raw(1).unwrap()
	}

	#[test]
	fn packs_low_bits_first() {
		assert_eq!(pack_buttons(&[]), 0);
		assert_eq!(pack_buttons(&[true]), 1);
		assert_eq!(pack_buttons(&[false, true, false, true]), 0b1010);
		assert_eq!(pack_buttons(&[true; 40]), u32::MAX);
	}

	fn translate(state: &PhysicalState, mask: &ButtonMask, device: DeviceId) -> Report {
		super::translate(state, mask, &AxisLimits::default(), device)
	}

	#[test]
	fn axes_are_halved_and_clamped() {
		let state = PhysicalState { x: 65535, y: 0, z: 32768, sliders: [100, 70000], ..Default::default() };
		let report = translate(&state, &ButtonMask::default(), device());

		assert_eq!(report.axis(Axis::X), 32767);
		assert_eq!(report.axis(Axis::Y), 0);
		assert_eq!(report.axis(Axis::Z), 16384);
		assert_eq!(report.axis(Axis::Slider), 50);
		assert_eq!(report.axis(Axis::Dial), VJOY_AXIS_MAX);
	}

	#[test]
	fn axes_follow_driver_limits() {
		let mut limits = AxisLimits::default();
		limits.set(Axis::X, 0..=1023);
		limits.set(Axis::Y, 100..=199);

		let state = PhysicalState { x: 65535, y: 32768, z: 65535, ..Default::default() };
		let report = super::translate(&state, &ButtonMask::default(), &limits, device());

		assert_eq!(report.axis(Axis::X), 1023);
		assert_eq!(report.axis(Axis::Y), 150);
		assert_eq!(report.axis(Axis::Z), VJOY_AXIS_MAX);
		assert_eq!(limits.scale(Axis::X, 0), 0);
		assert_eq!(limits.scale(Axis::X, -5), 0);
	}

	#[test]
	fn every_bank_is_forwarded() {
		let mut state = PhysicalState::default();
		for i in [0, 31, 32, 64, 127] {
			state.buttons[i] = true;
		}

		let report = translate(&state, &ButtonMask::default(), device());
		assert_eq!(report.buttons, [0x8000_0001, 0x1, 0x1, 0x8000_0000]);
		assert_eq!(report.button(127), Some(true));
		assert_eq!(report.button(126), Some(false));
		assert_eq!(report.button(128), None);
	}

	#[test]
	fn masked_buttons_are_cleared() {
		let mut state = PhysicalState::default();
		state.buttons[9] = true;
		state.buttons[12] = true;
		state.buttons[13] = true;

		let report = translate(&state, &ButtonMask::new([9, 12]), device());
		assert_eq!(report.buttons[0], 1 << 13);
	}

	#[test]
	fn first_pov_becomes_continuous_hat() {
		let state = PhysicalState { povs: [9000, 0, 0, 0], ..Default::default() };
		let report = translate(&state, &ButtonMask::default(), device());
		assert_eq!(report.hats, [9000, HAT_NEUTRAL, HAT_NEUTRAL, HAT_NEUTRAL]);

		let report = translate(&PhysicalState::default(), &ButtonMask::default(), device());
		assert_eq!(report.hats[0], HAT_NEUTRAL);
	}
}
