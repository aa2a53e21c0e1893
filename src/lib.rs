//! Feeds a vJoy virtual joystick from a physical one, and decodes the force-feedback packets the
//! vJoy driver generates for the device.
//!
//! The report translation, controller mapping, calibration, feeding loop and FFB decoding are
//! platform-neutral and work against the [`PhysicalJoystick`], [`ReportSink`] and
//! [`ffb::FfbSource`] traits. The vJoy bindings and the gilrs controller backend are only
//! available on Windows.

mod calibration;
#[cfg(windows)]
mod device;
pub mod ffb;
mod feeder;
#[cfg(windows)]
mod gamepad;
mod id;
#[cfg(windows)]
mod interface;
#[cfg(windows)]
mod lock;
mod pad;
mod report;
#[cfg(windows)]
mod version;

#[cfg(windows)]
pub use vjoy_sys as sys;
pub use crate::calibration::*;
#[cfg(windows)]
pub use crate::device::*;
pub use crate::feeder::*;
#[cfg(windows)]
pub use crate::gamepad::*;
pub use crate::id::*;
#[cfg(windows)]
pub use crate::interface::*;
pub use crate::pad::*;
pub use crate::report::*;
#[cfg(windows)]
pub use crate::version::*;

#[cfg(windows)]
use crate::lock::{VJoyLock};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
#[error(transparent)]
pub enum Error {
	Apply(#[from] ApplyError),
	DeviceIdFromIndex(#[from] DeviceIdFromIndexError),
	DeviceIdFromRaw(#[from] DeviceIdFromRawError),
	ParseDeviceId(#[from] ParseDeviceIdError),
	UnknownCode(#[from] ffb::UnknownCode),

	#[cfg(windows)]
	AxisRange(#[from] AxisRangeError),
	#[cfg(windows)]
	Capability(#[from] CapabilityError),
	#[cfg(windows)]
	DeviceSlot(#[from] DeviceSlotError),
	#[cfg(windows)]
	NewInterface(#[from] NewInterfaceError),
	#[cfg(windows)]
	NumSlots(#[from] NumSlotsError),
	#[cfg(windows)]
	DriverVersion(#[from] DriverVersionError),
	#[cfg(windows)]
	InterfaceVersion(#[from] InterfaceVersionError),
}
