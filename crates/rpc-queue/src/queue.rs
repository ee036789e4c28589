use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::descriptor::RequestDescriptor;

/// Bounded MPMC ring of pointers to [`RequestDescriptor`]s. Capacity is fixed at construction;
/// there is no growth and no allocation on the hot path.
///
/// `enqueue` is wait-free for the producer: a single CAS on `tail`. `dequeue` is the consumer's
/// analogous CAS on `head`. A full queue is not an error condition at this layer — the caller
/// (`ocall-dispatch`) treats a failed enqueue as "fall back to the synchronous Backstop".
pub struct RpcQueue {
	slots: Box<[AtomicUsize]>,
	capacity: usize,
	head: AtomicUsize,
	tail: AtomicUsize,
	/// Set by a worker about to block waiting for work, cleared when it wakes. Consulted by the
	/// producer only to decide whether an OCALL worker needs an explicit host-side wake after
	/// enqueue; the wake mechanism itself lives entirely on the untrusted side and is out of
	/// scope here.
	waiting_workers: AtomicBool,
}

const EMPTY: usize = 0;

impl RpcQueue {
	pub fn new(capacity: usize) -> Self {
		assert!(capacity > 0, "RPC queue capacity must be nonzero");
		let slots = (0..capacity).map(|_| AtomicUsize::new(EMPTY)).collect::<Vec<_>>().into_boxed_slice();
		RpcQueue {
			slots,
			capacity,
			head: AtomicUsize::new(0),
			tail: AtomicUsize::new(0),
			waiting_workers: AtomicBool::new(false),
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	fn slot(&self, index: usize) -> &AtomicUsize {
		&self.slots[index % self.capacity]
	}

	/// Publish `desc` into the ring. Returns the same pointer back on success (kept for symmetry
	/// with an alternate queue implementation that might need to report a different owning
	/// pointer), or `None` if the queue is full.
	///
	/// The producer must have finished writing every field of `*desc` — including setting
	/// `lock` to `LOCKED_NO_WAITERS` — before calling this; the release ordering here is what
	/// makes those writes visible to whichever worker later dequeues this pointer.
	pub fn enqueue(&self, desc: *mut RequestDescriptor) -> Option<*mut RequestDescriptor> {
		debug_assert!(!desc.is_null());
		let tail = self.tail.load(Ordering::Relaxed);
		if tail.wrapping_sub(self.head.load(Ordering::Acquire)) >= self.capacity {
			return None;
		}
		let slot = self.slot(tail);
		if slot.load(Ordering::Relaxed) != EMPTY {
			// Lost a race with another producer for this slot; treat as transiently full rather
			// than spin — the caller's fallback path is cheap and always correct.
			return None;
		}
		if self
			.tail
			.compare_exchange(tail, tail.wrapping_add(1), Ordering::AcqRel, Ordering::Relaxed)
			.is_err()
		{
			return None;
		}
		slot.store(desc as usize, Ordering::Release);
		Some(desc)
	}

	/// Consumer-side: take the next descriptor, or `None` if empty.
	pub fn dequeue(&self) -> Option<*mut RequestDescriptor> {
		loop {
			let head = self.head.load(Ordering::Relaxed);
			if head == self.tail.load(Ordering::Acquire) {
				return None;
			}
			let slot = self.slot(head);
			let raw = slot.load(Ordering::Acquire);
			if raw == EMPTY {
				// Producer has reserved this slot (advanced `tail`) but not yet stored into it;
				// spin briefly rather than report empty.
				continue;
			}
			if self
				.head
				.compare_exchange(head, head.wrapping_add(1), Ordering::AcqRel, Ordering::Relaxed)
				.is_err()
			{
				continue;
			}
			slot.store(EMPTY, Ordering::Release);
			return Some(raw as *mut RequestDescriptor);
		}
	}

	pub fn mark_worker_waiting(&self) {
		self.waiting_workers.store(true, Ordering::Release);
	}

	pub fn clear_worker_waiting(&self) {
		self.waiting_workers.store(false, Ordering::Release);
	}

	pub fn has_waiting_worker(&self) -> bool {
		self.waiting_workers.load(Ordering::Acquire)
	}
}

// Slots hold raw pointers to descriptors that are themselves `Send + Sync`; the queue's own
// state is all atomics.
unsafe impl Send for RpcQueue {}
unsafe impl Sync for RpcQueue {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::descriptor::RequestDescriptor;
	use ocall_types::OcallCode;

	#[test]
	fn enqueue_dequeue_round_trips() {
		let queue = RpcQueue::new(4);
		let mut desc = RequestDescriptor::new(OcallCode::Read, core::ptr::null_mut());
		let ptr = &mut desc as *mut RequestDescriptor;
		assert!(queue.enqueue(ptr).is_some());
		let dequeued = queue.dequeue().unwrap();
		assert_eq!(dequeued, ptr);
		assert!(queue.dequeue().is_none());
	}

	#[test]
	fn queue_full_returns_none_not_error() {
		let queue = RpcQueue::new(2);
		let mut a = RequestDescriptor::new(OcallCode::Read, core::ptr::null_mut());
		let mut b = RequestDescriptor::new(OcallCode::Write, core::ptr::null_mut());
		let mut c = RequestDescriptor::new(OcallCode::Close, core::ptr::null_mut());
		assert!(queue.enqueue(&mut a as *mut _).is_some());
		assert!(queue.enqueue(&mut b as *mut _).is_some());
		assert!(queue.enqueue(&mut c as *mut _).is_none());
	}

	#[test]
	fn queue_full_behaves_identically_to_empty_for_a_single_ocall() {
		// Mirrors the "queue-full transparency" property: whether or not the queue has room, a
		// caller that falls back to the synchronous path observes the same dispatch outcome at
		// this layer (a `None` from `enqueue`), never a panic or partial state.
		let queue = RpcQueue::new(1);
		let mut a = RequestDescriptor::new(OcallCode::Read, core::ptr::null_mut());
		let mut b = RequestDescriptor::new(OcallCode::Read, core::ptr::null_mut());
		assert!(queue.enqueue(&mut a as *mut _).is_some());
		assert!(queue.enqueue(&mut b as *mut _).is_none());
		assert!(queue.dequeue().is_some());
		assert!(queue.enqueue(&mut b as *mut _).is_some());
	}

	#[test]
	fn worker_waiting_flag_round_trips() {
		let queue = RpcQueue::new(1);
		assert!(!queue.has_waiting_worker());
		queue.mark_worker_waiting();
		assert!(queue.has_waiting_worker());
		queue.clear_worker_waiting();
		assert!(!queue.has_waiting_worker());
	}
}
