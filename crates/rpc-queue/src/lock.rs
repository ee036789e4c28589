use std::sync::atomic::{AtomicU32, Ordering};

/// Unlocked: the worker has published `result` and the producer may read it.
pub const UNLOCKED: u32 = 0;
/// Locked, no one is parked on it yet — the producer is still spinning.
pub const LOCKED_NO_WAITERS: u32 = 1;
/// Locked, and the producer has (or is about to) descend into the host-side futex wait.
pub const LOCKED_WITH_WAITERS: u32 = 2;

/// The three-state descriptor lock from "Mutex 2" of *Futexes are Tricky*: it is not a mutex
/// protecting a critical section, it is a one-shot completion signal between exactly one
/// producer (the enclave thread waiting on this OCALL) and exactly one worker (whichever
/// untrusted thread dequeues the descriptor).
///
/// Only the worker ever stores `UNLOCKED`; only the producer ever stores `LOCKED_WITH_WAITERS`.
/// Both sides only ever read-modify-write via CAS or a plain load, never a plain store that could
/// clobber the other side's transition.
pub struct DescriptorLock {
	state: AtomicU32,
}

impl DescriptorLock {
	/// A freshly allocated descriptor is locked before it is ever enqueued — the producer must
	/// publish this state (and the rest of the descriptor) before the enqueue-release.
	pub fn new_locked() -> Self {
		DescriptorLock { state: AtomicU32::new(LOCKED_NO_WAITERS) }
	}

	/// Producer-side: attempt to observe `UNLOCKED`, returning `true` without perturbing any
	/// other state. Used both by the spin phase and, after a futex wake, by the terminal check.
	pub fn is_unlocked(&self, ordering: Ordering) -> bool {
		self.state.load(ordering) == UNLOCKED
	}

	pub fn load(&self, ordering: Ordering) -> u32 {
		self.state.load(ordering)
	}

	/// Raw pointer to the underlying word, for handing to the host as the futex-wait address.
	pub fn state_ptr(&self) -> *mut u32 {
		self.state.as_ptr()
	}

	/// Producer-side CAS used both to announce waiting (`NO_WAITERS -> WITH_WAITERS`) and, after
	/// a futex return, to retry that same transition if a spurious wake brought us back here.
	/// Returns the previous value on failure, mirroring the pseudocode's `c`.
	pub fn cas_to_with_waiters(&self, expected: u32) -> Result<(), u32> {
		self.state
			.compare_exchange(expected, LOCKED_WITH_WAITERS, Ordering::AcqRel, Ordering::Acquire)
			.map(|_| ())
	}

	/// Worker-side: publish completion. Must happen only after every write to the descriptor's
	/// `result` field, so the producer's corresponding acquire load is guaranteed to observe
	/// them. Returns the previous state, which tells the worker whether a futex-wake OCALL is
	/// owed.
	pub fn release(&self) -> u32 {
		self.state.swap(UNLOCKED, Ordering::Release)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_locked_no_waiters() {
		let lock = DescriptorLock::new_locked();
		assert_eq!(lock.load(Ordering::Acquire), LOCKED_NO_WAITERS);
		assert!(!lock.is_unlocked(Ordering::Acquire));
	}

	#[test]
	fn worker_release_wins_race_with_waiters_cas() {
		let lock = DescriptorLock::new_locked();
		// Worker finishes first.
		let prev = lock.release();
		assert_eq!(prev, LOCKED_NO_WAITERS);
		// Producer's CAS to WITH_WAITERS now fails, observing UNLOCKED.
		let result = lock.cas_to_with_waiters(LOCKED_NO_WAITERS);
		assert_eq!(result, Err(UNLOCKED));
	}

	#[test]
	fn producer_wins_and_then_worker_releases() {
		let lock = DescriptorLock::new_locked();
		assert!(lock.cas_to_with_waiters(LOCKED_NO_WAITERS).is_ok());
		assert_eq!(lock.load(Ordering::Acquire), LOCKED_WITH_WAITERS);
		let prev = lock.release();
		assert_eq!(prev, LOCKED_WITH_WAITERS);
		assert!(lock.is_unlocked(Ordering::Acquire));
	}
}
