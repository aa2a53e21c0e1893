use std::time::{Duration, Instant};

use crate::{DeviceId};
use crate::calibration::{Calibration};
use crate::report::{self, AxisLimits, ButtonMask, PhysicalState, Report};

/// A physical input device that can be polled for its current state.
pub trait PhysicalJoystick {
	type Error: std::error::Error + Send + Sync + 'static;

	fn poll(&mut self) -> Result<PhysicalState, Self::Error>;
}

/// Something that accepts complete vJoy reports, normally an acquired vJoy device.
pub trait ReportSink {
	fn submit(&mut self, report: &Report) -> Result<(), ApplyError>;

	/// Tries to regain the device after a failed submit. Returns whether it succeeded.
	fn reacquire(&mut self) -> bool {
		false
	}
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
	fn submit(&mut self, report: &Report) -> Result<(), ApplyError> {
		(**self).submit(report)
	}

	fn reacquire(&mut self) -> bool {
		(**self).reacquire()
	}
}

/// Polls a physical joystick and forwards its state to a vJoy device at a fixed rate.
#[derive(Debug)]
pub struct Feeder<J, S> {
	joystick: J,
	sink: S,
	device: DeviceId,
	mask: ButtonMask,
	limits: AxisLimits,
	calibration: Option<Calibration>,
	updates: u64,
	failures: u64,
}

impl<J: PhysicalJoystick, S: ReportSink> Feeder<J, S> {
	pub fn new(joystick: J, sink: S, device: DeviceId) -> Feeder<J, S> {
		Feeder {
			joystick,
			sink,
			device,
			mask: ButtonMask::default(),
			limits: AxisLimits::default(),
			calibration: None,
			updates: 0,
			failures: 0,
		}
	}

	pub fn with_mask(mut self, mask: ButtonMask) -> Feeder<J, S> {
		self.mask = mask;
		self
	}

	/// Scales axes onto the ranges the vJoy device was configured with.
	pub fn with_limits(mut self, limits: AxisLimits) -> Feeder<J, S> {
		self.limits = limits;
		self
	}

	pub fn with_calibration(mut self, calibration: Calibration) -> Feeder<J, S> {
		self.calibration = Some(calibration);
		self
	}

	pub fn calibration(&self) -> Option<&Calibration> {
		self.calibration.as_ref()
	}

	pub fn sink(&self) -> &S {
		&self.sink
	}

	pub fn updates(&self) -> u64 {
		self.updates
	}

	pub fn failures(&self) -> u64 {
		self.failures
	}

	/// Polls until the trigger is pressed, recording axis ranges. `progress` sees the calibration
	/// after every sample.
	pub fn calibrate(&mut self, period: Duration, mut progress: impl FnMut(&Calibration)) -> Result<(), FeedError<J::Error>> {
		let calibration = self.calibration.get_or_insert_with(Calibration::new);
		let mut next = Instant::now();

		while !calibration.is_finished() {
			let state = self.joystick.poll().map_err(FeedError::Poll)?;
			calibration.observe(&state);
			progress(calibration);

			next += period;
			if let Some(pause) = next.checked_duration_since(Instant::now()) {
				std::thread::sleep(pause);
			}
		}

		Ok(())
	}

	/// Polls once, translates, and submits. On a failed submit the sink is asked to reacquire its
	/// device once before the failure is reported.
	pub fn step(&mut self) -> Result<Report, FeedError<J::Error>> {
		let mut state = self.joystick.poll().map_err(FeedError::Poll)?;

		if let Some(calibration) = self.calibration.as_ref().filter(|c| c.is_finished()) {
			calibration.apply(&mut state);
		}

		let report = report::translate(&state, &self.mask, &self.limits, self.device);
		if let Err(source) = self.sink.submit(&report) {
			self.failures += 1;
			let reacquired = self.sink.reacquire();
			return Err(FeedError::Update { device: self.device, source, reacquired });
		}

		self.updates += 1;
		Ok(report)
	}

	/// Runs [`Feeder::step`] every `period` until `stop` returns `true` or polling fails.
	///
	/// Failed submits are logged and feeding continues.
	pub fn run(&mut self, period: Duration, mut stop: impl FnMut(&Self) -> bool) -> Result<(), FeedError<J::Error>> {
		let mut next = Instant::now();
		let mut time_total = Duration::ZERO;
		let mut time_samples = 0u32;
		let report_every = (Duration::from_secs(15).as_nanos() / period.as_nanos().max(1)).max(1) as u32;

		while !stop(self) {
			let before = Instant::now();

			match self.step() {
				Ok(_) => {},
				Err(e @ FeedError::Update { .. }) => log::warn!("{}", e),
				Err(e) => return Err(e),
			}

			time_total += before.elapsed();
			time_samples += 1;

			if time_samples % report_every == 0 {
				log::debug!("Average update time over {} samples: {:?}", time_samples, time_total / time_samples);
			}

			next += period;
			if let Some(pause) = next.checked_duration_since(Instant::now()) {
				std::thread::sleep(pause);
			}
		}

		Ok(())
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum ApplyError {
	#[error("The vJoy interface returned an error in sending the updated device state.")]
	Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError<E: std::error::Error + 'static> {
	#[error("Failed to poll the physical joystick: {0}")]
	Poll(#[source] E),

	#[error("Feeding vJoy device #{device} failed (reacquired: {reacquired})")]
	Update {
		device: DeviceId,
		#[source]
		source: ApplyError,
		reacquired: bool,
	},
}
