use gilrs::{Axis as PadAxis, Button, Gamepad, GamepadId, Gilrs};

use crate::{PadReading, PhysicalJoystick, PhysicalState};

const STICKS: [PadAxis; 6] = [
	PadAxis::LeftStickX,
	PadAxis::LeftStickY,
	PadAxis::LeftZ,
	PadAxis::RightStickX,
	PadAxis::RightStickY,
	PadAxis::RightZ,
];

/// Order in which buttons are forwarded. `South` comes first so that it acts as the trigger.
const BUTTONS: [Button; 15] = [
	Button::South,
	Button::East,
	Button::West,
	Button::North,
	Button::LeftTrigger,
	Button::RightTrigger,
	Button::LeftTrigger2,
	Button::RightTrigger2,
	Button::Select,
	Button::Start,
	Button::Mode,
	Button::LeftThumb,
	Button::RightThumb,
	Button::C,
	Button::Z,
];

const DPAD: [Button; 4] = [Button::DPadUp, Button::DPadRight, Button::DPadDown, Button::DPadLeft];

/// A connected controller as listed for the operator. `number` is 1-based.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GamepadInfo {
	pub number: usize,
	pub name: String,
}

/// The controllers the system currently knows of.
pub struct Gamepads {
	gilrs: Gilrs,
}

impl Gamepads {
	pub fn new() -> Result<Gamepads, GamepadError> {
		let gilrs = Gilrs::new().map_err(|e| GamepadError::Init(e.to_string()))?;
		Ok(Gamepads { gilrs })
	}

	pub fn list(&self) -> Vec<GamepadInfo> {
		self.gilrs.gamepads()
			.enumerate()
			.map(|(i, (_, pad))| GamepadInfo { number: i + 1, name: pad.name().to_owned() })
			.collect()
	}

	/// Opens controller `number` from [`Gamepads::list`], or the first one if `None`.
	pub fn open(self, number: Option<usize>) -> Result<GamepadJoystick, GamepadError> {
		let count = self.gilrs.gamepads().count();
		let index = match number {
			Some(n) if n == 0 || n > count => return Err(GamepadError::NoSuchGamepad { number: n, count }),
			Some(n) => n - 1,
			None if count == 0 => return Err(GamepadError::NotFound),
			None => 0,
		};

		let (id, name) = self.gilrs.gamepads()
			.nth(index)
			.map(|(id, pad)| (id, pad.name().to_owned()))
			.ok_or(GamepadError::NotFound)?;

		log::info!("Using physical controller #{} ({}).", index + 1, name);
		Ok(GamepadJoystick { gilrs: self.gilrs, id, name })
	}
}

impl std::fmt::Debug for Gamepads {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.list()).finish()
	}
}

/// A physical controller polled through gilrs.
pub struct GamepadJoystick {
	gilrs: Gilrs,
	id: GamepadId,
	name: String,
}

impl GamepadJoystick {
	pub fn name(&self) -> &str {
		&self.name
	}
}

impl std::fmt::Debug for GamepadJoystick {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GamepadJoystick").field("id", &self.id).field("name", &self.name).finish()
	}
}

fn read(pad: &Gamepad<'_>) -> PadReading {
	let axis = |a: PadAxis| pad.axis_data(a).map_or(0.0, |d| d.value());
	let analog = |b: Button| pad.button_data(b).map_or(0.0, |d| d.value());

	// Some controllers report the d-pad as a pair of axes instead of buttons.
	let (dx, dy) = (axis(PadAxis::DPadX), axis(PadAxis::DPadY));
	let [up, right, down, left] = DPAD.map(|b| pad.is_pressed(b));

	PadReading {
		sticks: STICKS.map(axis),
		triggers: [analog(Button::LeftTrigger2), analog(Button::RightTrigger2)],
		dpad: [up || dy > 0.5, right || dx > 0.5, down || dy < -0.5, left || dx < -0.5],
		buttons: BUTTONS.iter().map(|&b| pad.is_pressed(b)).collect(),
	}
}

impl PhysicalJoystick for GamepadJoystick {
	type Error = GamepadError;

	fn poll(&mut self) -> Result<PhysicalState, GamepadError> {
		// gilrs only updates its cached state while events are drained.
		while self.gilrs.next_event().is_some() {}

		let pad = self.gilrs.connected_gamepad(self.id)
			.ok_or_else(|| GamepadError::Disconnected(self.name.clone()))?;

		Ok(read(&pad).to_state())
	}
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, thiserror::Error)]
pub enum GamepadError {
	#[error("Failed to initialize controller input: {0}")]
	Init(String),

	#[error("No joystick/Gamepad found.")]
	NotFound,

	#[error("There is no controller #{number}; {count} found.")]
	NoSuchGamepad {
		number: usize,
		count: usize,
	},

	#[error("Controller {0} was disconnected.")]
	Disconnected(String),
}
