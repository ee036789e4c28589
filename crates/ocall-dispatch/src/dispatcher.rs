use std::sync::atomic::Ordering;
use std::sync::OnceLock;

use enclave_boundary::ScratchAllocator;
use ocall_types::{errno, MsOcallFutex, OcallCode};
use rpc_queue::{RequestDescriptor, RpcQueue, LOCKED_NO_WAITERS, LOCKED_WITH_WAITERS, UNLOCKED};

use crate::backstop::Backstop;
use crate::config::BridgeConfig;

/// Process-wide optional RPC queue pointer. Absent means every OCALL takes the synchronous
/// Backstop path. Initialized once at bring-up via [`install_queue`] and never reassigned.
static RPC_QUEUE: OnceLock<RpcQueue> = OnceLock::new();

/// Install the process-wide RPC queue. Idempotent: a second call is a no-op, matching the
/// "initialize once at bring-up, never reassign" invariant.
pub fn install_queue(capacity: usize) {
	let _ = RPC_QUEUE.set(RpcQueue::new(capacity));
}

pub fn queue() -> Option<&'static RpcQueue> {
	RPC_QUEUE.get()
}

/// Drives the Exitless Dispatcher's enqueue/spin/wait protocol for a single OCALL, falling back
/// to the synchronous Backstop whenever the exitless path is unavailable.
pub struct ExitlessDispatcher<'a> {
	backstop: &'a dyn Backstop,
	config: BridgeConfig,
}

impl<'a> ExitlessDispatcher<'a> {
	pub fn new(backstop: &'a dyn Backstop, config: BridgeConfig) -> Self {
		ExitlessDispatcher { backstop, config }
	}

	/// Bypass the RPC queue entirely and call the Backstop directly. Used for the handful of
	/// OCALLs (`sleep`) that must never be deferred, per §4.6: there is no reason to pay for
	/// exitless machinery on a call that is going to suspend the thread either way.
	pub fn dispatch_direct(&self, code: OcallCode, msg: *mut u8) -> i32 {
		self.backstop.ocall(code, msg)
	}

	/// Dispatch `code` with prepared message `msg`, returning the host-provided integer result
	/// (or a negative errno on a bridge-internal failure).
	///
	/// `scratch` must have room for one [`RequestDescriptor`] if the exitless path is taken; the
	/// caller is expected to have reserved it alongside the message itself.
	pub fn dispatch(&self, code: OcallCode, msg: *mut u8, scratch: &ScratchAllocator) -> i32 {
		let queue = match queue() {
			Some(q) => q,
			None => return self.backstop.ocall(code, msg),
		};

		let desc_slot = match scratch.alloc_for::<RequestDescriptor>() {
			Some(p) => p,
			None => {
				log::debug!("scratch exhausted allocating a descriptor for {:?}, falling back to the Backstop", code);
				return self.backstop.ocall(code, msg);
			}
		};
		// SAFETY: `desc_slot` was just carved out of scratch for exactly this purpose and is
		// not aliased.
		unsafe {
			desc_slot.write(RequestDescriptor::new(code, msg));
		}
		let desc: &RequestDescriptor = unsafe { &*desc_slot };

		if queue.enqueue(desc_slot).is_none() {
			log::debug!("RPC queue full, dispatching {:?} directly through the Backstop", code);
			return self.backstop.ocall(code, msg);
		}

		// Phase 1: spin, hoping the worker finishes before we'd ever need a kernel wait.
		log::trace!("{:?}: entering spin phase, budget {}", code, self.config.t_spin);
		for _ in 0..self.config.t_spin {
			if desc.lock.is_unlocked(Ordering::Acquire) {
				return desc.result();
			}
			std::hint::spin_loop();
		}

		// Phase 2: CAS to WITH_WAITERS and fall back to a futex-backed kernel wait, absorbing
		// spurious wakes, until the worker's release wins.
		log::trace!("{:?}: spin exhausted, entering futex wait", code);
		loop {
			// Announce ourselves as waiting, unless the worker's release already won the race.
			let observed = match desc.lock.cas_to_with_waiters(LOCKED_NO_WAITERS) {
				Ok(()) => LOCKED_WITH_WAITERS,
				Err(prev) => prev,
			};
			if observed == UNLOCKED {
				return desc.result();
			}

			let mut futex_msg = MsOcallFutex {
				futex: desc.lock.state_ptr(),
				op: 0,
				val: LOCKED_WITH_WAITERS,
				timeout_us: -1,
			};
			let r = self
				.backstop
				.ocall(OcallCode::Futex, &mut futex_msg as *mut MsOcallFutex as *mut u8);
			if r < 0 && r != -errno::EAGAIN {
				log::warn!("futex wait for {:?} failed with {}", code, r);
				return -errno::EPERM;
			}
			// Real or spurious wake: loop back around and recheck.
			log::trace!("{:?}: woken, rechecking descriptor state", code);
		}
	}
}

/// `ocall_exit` must never return: a malicious host may attempt to resume the enclave after a
/// requested termination, so the exit OCALL is re-issued in an unbounded loop.
pub fn ocall_exit(backstop: &dyn Backstop, msg: *mut u8) -> ! {
	log::warn!("enclave exiting, re-issuing the exit OCALL until the host honors it");
	loop {
		backstop.ocall(OcallCode::Exit, msg);
	}
}
