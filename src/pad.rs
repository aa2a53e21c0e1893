use crate::report::{PhysicalState, NUM_BUTTONS, PHYSICAL_AXIS_MAX};

/// One poll of a gamepad-style controller, in the conventions of the controller library.
///
/// Sticks span `-1.0..=1.0` with up and right positive; triggers span `0.0..=1.0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PadReading {
	/// Left X, left Y, left Z, right X, right Y, right Z.
	pub sticks: [f32; 6],

	/// Analog left and right triggers.
	pub triggers: [f32; 2],

	/// Up, right, down, left.
	pub dpad: [bool; 4],

	/// Digital buttons; the first is treated as the trigger.
	pub buttons: Vec<bool>,
}

impl PadReading {
	/// Converts the reading into the physical state layout, with Y axes flipped so that down is
	/// the larger value.
	pub fn to_state(&self) -> PhysicalState {
		let mut state = PhysicalState::default();
		let [lx, ly, lz, rx, ry, rz] = self.sticks;

		state.x = stick_to_axis(lx);
		state.y = stick_to_axis(-ly);
		state.z = stick_to_axis(lz);
		state.rotation_x = stick_to_axis(rx);
		state.rotation_y = stick_to_axis(-ry);
		state.rotation_z = stick_to_axis(rz);
		state.sliders = self.triggers.map(trigger_to_axis);
		state.povs[0] = dpad_to_pov(self.dpad);

		for (slot, &pressed) in state.buttons.iter_mut().zip(self.buttons.iter().take(NUM_BUTTONS)) {
			*slot = pressed;
		}

		state
	}
}

/// Maps a stick value in `-1.0..=1.0` onto `0..=65535`. Out-of-range values are clamped and NaN
/// rests at the center.
pub fn stick_to_axis(value: f32) -> i32 {
	let value = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
	((value + 1.0) * 0.5 * PHYSICAL_AXIS_MAX as f32).round() as i32
}

/// Maps a trigger value in `0.0..=1.0` onto `0..=65535`.
pub fn trigger_to_axis(value: f32) -> i32 {
	let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
	(value * PHYSICAL_AXIS_MAX as f32).round() as i32
}

/// Folds d-pad buttons (up, right, down, left) into a POV angle in hundredths of a degree, or
/// `-1` when centered. Opposing directions cancel out.
pub fn dpad_to_pov([up, right, down, left]: [bool; 4]) -> i32 {
	let x = right as i32 - left as i32;
	let y = up as i32 - down as i32;

	match (x, y) {
		(0, 1) => 0,
		(1, 1) => 4500,
		(1, 0) => 9000,
		(1, -1) => 13500,
		(0, -1) => 18000,
		(-1, -1) => 22500,
		(-1, 0) => 27000,
		(-1, 1) => 31500,
		_ => -1,
	}
}
