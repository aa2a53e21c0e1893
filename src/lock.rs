use std::rc::{Rc};
use std::sync::atomic::{AtomicBool, Ordering};

/// `VJoyLock` confines vJoy device access to a single thread.
///
/// The vJoyInterface library keeps static mutable state behind its device functions, so at most
/// one thread may use them at a time. A lock can only be created while no other lock exists
/// (tracked by `LOCKED`); further handles are clones sharing one `Rc`. Because `Rc` is neither
/// `Send` nor `Sync`, every live handle is on the creating thread, and `LOCKED` is released when
/// the last of them is dropped.
///
/// The FFB accessor functions only read the packet they are given and are exempt; they run on the
/// driver's callback thread without a lock.
#[derive(Clone, Debug)]
pub struct VJoyLock(Rc<Release>);

static_assertions::assert_not_impl_any!(VJoyLock: Send, Sync);

#[derive(Debug)]
struct Release;

impl Drop for Release {
	fn drop(&mut self) {
		LOCKED.store(false, Ordering::Release);
	}
}

impl VJoyLock {
	pub fn new() -> Option<VJoyLock> {
		LOCKED.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
			.ok()
			.map(|_| VJoyLock(Rc::new(Release)))
	}

	/// Number of live handles sharing this lock.
	pub fn handles(&self) -> usize {
		Rc::strong_count(&self.0)
	}
}

static LOCKED: AtomicBool = AtomicBool::new(false);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exclusive_until_last_handle_drops() {
		let lock = VJoyLock::new().unwrap();
		assert!(VJoyLock::new().is_none());

		let clone = lock.clone();
		assert_eq!(clone.handles(), 2);
		drop(lock);
		assert!(VJoyLock::new().is_none());

		drop(clone);
		assert!(VJoyLock::new().is_some());
	}
}
