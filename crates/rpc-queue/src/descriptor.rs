use std::sync::atomic::{AtomicI32, Ordering};

use ocall_types::OcallCode;

use crate::lock::DescriptorLock;

/// Per-OCALL record carried through the RPC queue. Lives in scratch, owned by the producer until
/// enqueued, owned by the worker from dequeue until it releases `lock`.
pub struct RequestDescriptor {
	pub ocall_index: OcallCode,
	/// Pointer to the per-OCALL message struct (e.g. `MsOcallRead`), itself in scratch or an
	/// oversize host mapping. Opaque to the queue and the dispatcher; only `ocall-codec` and the
	/// worker interpret it, keyed by `ocall_index`.
	pub buffer: *mut u8,
	pub lock: DescriptorLock,
	result: AtomicI32,
}

impl RequestDescriptor {
	/// Construct a descriptor already `LOCKED_NO_WAITERS`, per the producer's obligation to
	/// publish that state before enqueueing it.
	pub fn new(ocall_index: OcallCode, buffer: *mut u8) -> Self {
		RequestDescriptor {
			ocall_index,
			buffer,
			lock: DescriptorLock::new_locked(),
			result: AtomicI32::new(0),
		}
	}

	/// Worker-side: record the host syscall's integer result. Must happen-before the subsequent
	/// `lock.release()`.
	pub fn set_result(&self, value: i32) {
		self.result.store(value, Ordering::Relaxed);
	}

	/// Producer-side: read the result. Only valid after observing `lock` as `UNLOCKED` via an
	/// acquire load — that load is what makes this read see the worker's prior store.
    pub fn result(&self) -> i32 {
		self.result.load(Ordering::Relaxed)
	}
}

// A descriptor is deliberately handed across the enclave/host boundary: the producer thread
// builds it, a worker thread on the host side consumes it.
unsafe impl Send for RequestDescriptor {}
unsafe impl Sync for RequestDescriptor {}
