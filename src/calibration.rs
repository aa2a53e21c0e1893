use crate::report::{Axis, PhysicalState, VJOY_AXIS_MAX};

/// Observed travel of one physical axis.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AxisRange {
	pub min: i32,
	pub max: i32,
	pub center: i32,
}

impl AxisRange {
	/// A range that has not observed anything yet; the first sample sets every bound.
	pub const EMPTY: AxisRange = AxisRange { min: i32::MAX, max: i32::MIN, center: 0 };

	pub fn is_empty(&self) -> bool {
		self.min > self.max
	}

	fn observe(&mut self, value: i32) {
		self.min = self.min.min(value);
		self.max = self.max.max(value);
		self.center = value;
	}

	/// Maps `value` from the observed range onto `0..=VJOY_AXIS_MAX`, clamping values outside it.
	///
	/// When the center lies strictly inside the range, each side of it is scaled separately so
	/// that the resting position lands on the middle of the output.
	pub fn normalize(&self, value: i32) -> i32 {
		if self.is_empty() || self.min == self.max {
			return VJOY_AXIS_MAX / 2;
		}

		let (min, max, center) = (self.min as i64, self.max as i64, self.center as i64);
		let full = VJOY_AXIS_MAX as i64;
		let mid = full / 2;
		let value = (value as i64).clamp(min, max);

		let scaled = if center <= min || center >= max {
			(value - min) * full / (max - min)
		} else if value <= center {
			(value - min) * mid / (center - min)
		} else {
			mid + (value - center) * (full - mid) / (max - center)
		};

		scaled as i32
	}
}

impl Default for AxisRange {
	fn default() -> Self {
		AxisRange::EMPTY
	}
}

/// Records each axis's extremes while the user sweeps the stick, until the trigger is pressed.
///
/// The last observed value of each axis is kept as its center, since the user is expected to
/// release the stick before pulling the trigger.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Calibration {
	ranges: [AxisRange; 8],
	samples: usize,
	finished: bool,
}

impl Calibration {
	pub fn new() -> Calibration {
		Calibration::default()
	}

	/// Feeds one polled state. Returns `true` once calibration is finished.
	pub fn observe(&mut self, state: &PhysicalState) -> bool {
		if self.finished {
			return true;
		}

		for axis in Axis::all() {
			self.ranges[axis as usize].observe(state.axis(axis));
		}

		self.samples += 1;
		self.finished = state.trigger();

		if self.finished {
			log::info!("Calibration finished after {} samples.", self.samples);
		}

		self.finished
	}

	pub fn is_finished(&self) -> bool {
		self.finished
	}

	pub fn range(&self, axis: Axis) -> &AxisRange {
		&self.ranges[axis as usize]
	}

	pub fn samples(&self) -> usize {
		self.samples
	}

	/// Rescales every axis of `state` in place from its observed range onto the physical
	/// `0..=65535` range, so that the regular translation can follow.
	pub fn apply(&self, state: &mut PhysicalState) {
		for axis in Axis::all() {
			let scaled = self.range(axis).normalize(state.axis(axis)) * 2;

			let slot = match axis {
				Axis::X => &mut state.x,
				Axis::Y => &mut state.y,
				Axis::Z => &mut state.z,
				Axis::RX => &mut state.rotation_x,
				Axis::RY => &mut state.rotation_y,
				Axis::RZ => &mut state.rotation_z,
				Axis::Slider => &mut state.sliders[0],
				Axis::Dial => &mut state.sliders[1],
			};

			*slot = scaled;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn state(x: i32, trigger: bool) -> PhysicalState {
		let mut s = PhysicalState { x, ..Default::default() };
		s.buttons[0] = trigger;
		s
	}

	#[test]
	fn tracks_extremes_until_trigger() {
		let mut cal = Calibration::new();

		assert!(!cal.observe(&state(1000, false)));
		assert!(!cal.observe(&state(60000, false)));
		assert!(cal.observe(&state(30000, true)));

		let x = cal.range(Axis::X);
		assert_eq!((x.min, x.max, x.center), (1000, 60000, 30000));

		// Ignored once finished.
		assert!(cal.observe(&state(0, false)));
		assert_eq!(cal.range(Axis::X).min, 1000);
		assert_eq!(cal.samples(), 3);
	}

	#[test]
	fn normalize_spans_vjoy_range() {
		let range = AxisRange { min: 1000, max: 61000, center: 31000 };
		assert_eq!(range.normalize(1000), 0);
		assert_eq!(range.normalize(61000), VJOY_AXIS_MAX);
		assert_eq!(range.normalize(0), 0);
		assert_eq!(range.normalize(65535), VJOY_AXIS_MAX);
		assert_eq!(range.normalize(31000), VJOY_AXIS_MAX / 2);
	}

	#[test]
	fn off_center_rest_maps_to_middle() {
		let range = AxisRange { min: 0, max: 60000, center: 20000 };
		assert_eq!(range.normalize(20000), VJOY_AXIS_MAX / 2);
		assert_eq!(range.normalize(10000), VJOY_AXIS_MAX / 4);
		assert_eq!(range.normalize(40000), 24575);
		assert_eq!(range.normalize(60000), VJOY_AXIS_MAX);

		// A center on the edge of the range falls back to a straight line.
		let edge = AxisRange { min: 0, max: 60000, center: 60000 };
		assert_eq!(edge.normalize(30000), VJOY_AXIS_MAX / 2);
	}

	#[test]
	fn degenerate_range_centers() {
		assert_eq!(AxisRange::EMPTY.normalize(123), VJOY_AXIS_MAX / 2);
		let flat = AxisRange { min: 5, max: 5, center: 5 };
		assert_eq!(flat.normalize(5), VJOY_AXIS_MAX / 2);
	}

	#[test]
	fn apply_rescales_into_physical_range() {
		let mut cal = Calibration::new();
		cal.observe(&state(1000, false));
		cal.observe(&state(61000, true));

		let mut s = state(61000, false);
		cal.apply(&mut s);
		assert_eq!(s.x, VJOY_AXIS_MAX * 2);
	}
}
