use std::convert::{Infallible};
use std::time::{Instant};

use vjoy_feeder::{PhysicalJoystick, PhysicalState, NUM_BUTTONS};

/// Stand-in physical joystick whose axes sweep sine waves and whose buttons blink, each a little
/// slower than the last.
#[derive(Debug)]
pub struct SyntheticJoystick {
	start: Instant,
	buttons: usize,
}

impl SyntheticJoystick {
	pub fn new(buttons: usize) -> SyntheticJoystick {
		SyntheticJoystick {
			start: Instant::now(),
			buttons: buttons.min(NUM_BUTTONS),
		}
	}

	/// State `t` seconds after start.
	pub fn state_at(&self, t: f64) -> PhysicalState {
		let mut state = PhysicalState::default();

		let mut speed = 0.5 * std::f64::consts::TAU;
		let mut next_axis = || {
			let value = 0.5 * f64::sin(speed * t) + 0.5;
			speed /= 1.2;
			(value * 65535.0).round() as i32
		};

		state.x = next_axis();
		state.y = next_axis();
		state.z = next_axis();
		state.rotation_x = next_axis();
		state.rotation_y = next_axis();
		state.rotation_z = next_axis();
		state.sliders = [next_axis(), next_axis()];

		let mut interval = 0.1;
		for pressed in &mut state.buttons[..self.buttons] {
			*pressed = f64::fract(t / interval) < 0.5;
			interval *= 1.1;
		}

		// One full POV revolution every eight seconds.
		state.povs[0] = (f64::fract(t / 8.0) * 36000.0) as i32;
		state
	}
}

impl PhysicalJoystick for SyntheticJoystick {
	type Error = Infallible;

	fn poll(&mut self) -> Result<PhysicalState, Infallible> {
		Ok(self.state_at(self.start.elapsed().as_secs_f64()))
	}
}
