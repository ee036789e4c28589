use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use enclave_boundary::sim::SimPartition;
use enclave_boundary::{Boundary, ScratchAllocator};
use ocall_dispatch::sim::SimBackstop;
use ocall_dispatch::{BridgeConfig, ExitlessDispatcher};
use ocall_types::{errno, MsOcallGettime, MsOcallMmapUntrusted, MsOcallRead, MsOcallWrite, OcallCode};

use crate::context::Call;

const SCRATCH_CAP: usize = 64 * 1024;
/// Host arena big enough to hold scratch plus a simulated oversize mmap region.
const HOST_ARENA: usize = 4 * 1024 * 1024;
const ENCLAVE_ARENA: usize = 2 * 1024 * 1024;

struct Fixture {
	sim: SimPartition,
	scratch: ScratchAllocator,
}

impl Fixture {
	fn new() -> Self {
		let sim = SimPartition::new(ENCLAVE_ARENA, HOST_ARENA);
		// SAFETY: the first SCRATCH_CAP bytes of the host arena are reserved for scratch and
		// touched by nothing else in this fixture; the remainder is free for a simulated mmap.
		let scratch = unsafe { ScratchAllocator::new(sim.host_ptr(), SCRATCH_CAP) };
		Fixture { sim, scratch }
	}

	fn boundary(&self) -> Boundary<'_, SimPartition> {
		Boundary::new(&self.sim)
	}

	/// A region past the scratch slab, within the same host arena, standing in for an
	/// `mmap_untrusted` allocation.
	fn mmap_region(&self) -> *mut u8 {
		unsafe { self.sim.host_ptr().add(SCRATCH_CAP) }
	}

	fn enclave_buf(&self, len: usize) -> *mut u8 {
		assert!(len <= self.sim.enclave_len());
		self.sim.enclave_ptr()
	}
}

#[test]
fn read_128_bytes_round_trips_pattern() {
	let fixture = Fixture::new();
	let backstop = SimBackstop::new(|code, msg| {
		assert_eq!(code, OcallCode::Read);
		let msg = msg as *mut MsOcallRead;
		let count = unsafe { (*msg).count } as usize;
		let buf = unsafe { (*msg).buf };
		let pattern: Vec<u8> = (0u8..count as u8).collect();
		unsafe {
			core::ptr::copy_nonoverlapping(pattern.as_ptr(), buf, count);
		}
		count as i32
	});
	let dispatcher = ExitlessDispatcher::new(&backstop, BridgeConfig::default());
	let call = Call::new(fixture.boundary(), &fixture.scratch, &dispatcher);

	let dest = fixture.enclave_buf(128);
	let mark = fixture.scratch.mark();
	let n = crate::fs::read(&call, 3, dest, 128);
	assert_eq!(n, 128);
	let out = unsafe { core::slice::from_raw_parts(dest, 128) };
	let expected: Vec<u8> = (0u8..128).collect();
	assert_eq!(out, expected.as_slice());
	assert_eq!(fixture.scratch.used(), mark, "scratch not restored after read");
}

#[test]
fn write_1mib_uses_oversize_mapping_and_releases_it() {
	let fixture = Fixture::new();
	let mmap_region = fixture.mmap_region() as usize;
	let unmapped = Arc::new(AtomicUsize::new(0));
	let unmapped_clone = unmapped.clone();
	let received: Arc<std::sync::Mutex<Vec<u8>>> = Arc::new(std::sync::Mutex::new(Vec::new()));
	let received_clone = received.clone();

	let backstop = SimBackstop::new(move |code, msg| match code {
		OcallCode::MmapUntrusted => {
			let msg = msg as *mut MsOcallMmapUntrusted;
			unsafe {
				(*msg).mem = mmap_region as *mut u8;
			}
			0
		}
		OcallCode::Write => {
			let msg = msg as *mut MsOcallWrite;
			let count = unsafe { (*msg).count } as usize;
			let buf = unsafe { (*msg).buf };
			let bytes = unsafe { core::slice::from_raw_parts(buf, count) };
			*received_clone.lock().unwrap() = bytes.to_vec();
			count as i32
		}
		OcallCode::MunmapUntrusted => {
			unmapped_clone.fetch_add(1, Ordering::SeqCst);
			0
		}
		_ => -errno::EINVAL,
	});

	let dispatcher = ExitlessDispatcher::new(&backstop, BridgeConfig::default());
	let call = Call::new(fixture.boundary(), &fixture.scratch, &dispatcher);

	let one_mib = 1024 * 1024;
	let src = fixture.enclave_buf(one_mib);
	unsafe {
		core::ptr::write_bytes(src, 0xAB, one_mib);
	}
	let mark = fixture.scratch.mark();
	let n = crate::fs::write(&call, 4, src, one_mib);
	assert_eq!(n, one_mib as i32);
	assert_eq!(received.lock().unwrap().len(), one_mib);
	assert!(received.lock().unwrap().iter().all(|&b| b == 0xAB));
	assert_eq!(unmapped.load(Ordering::SeqCst), 1, "oversize mapping must be released exactly once");
	assert_eq!(fixture.scratch.used(), mark, "scratch not restored after write");
}

#[test]
fn send_with_straddling_buffer_is_rejected_without_dispatch() {
	let fixture = Fixture::new();
	let dispatched = Arc::new(AtomicUsize::new(0));
	let dispatched_clone = dispatched.clone();
	let backstop = SimBackstop::new(move |_code, _msg| {
		dispatched_clone.fetch_add(1, Ordering::SeqCst);
		0
	});
	let dispatcher = ExitlessDispatcher::new(&backstop, BridgeConfig::default());
	let call = Call::new(fixture.boundary(), &fixture.scratch, &dispatcher);

	// A pointer that starts inside the enclave arena but whose length runs past its end lands
	// outside both regions entirely under the sim model — exactly the straddling case the
	// Arbiter must refuse without ever reaching the dispatcher.
	let near_end = unsafe { fixture.sim.enclave_ptr().add(fixture.sim.enclave_len() - 4) };
	let mark = fixture.scratch.mark();
	let r = crate::net::send(&call, 5, near_end, 64, core::ptr::null(), 0, core::ptr::null(), 0);
	assert_eq!(r, -errno::EPERM);
	assert_eq!(dispatched.load(Ordering::SeqCst), 0, "straddling buffer must not reach dispatch");
	assert_eq!(fixture.scratch.used(), mark);
}

#[test]
fn gettime_retries_past_two_eintr_then_succeeds() {
	let fixture = Fixture::new();
	let attempt = Arc::new(AtomicUsize::new(0));
	let attempt_clone = attempt.clone();
	let backstop = SimBackstop::new(move |code, msg| {
		assert_eq!(code, OcallCode::Gettime);
		let n = attempt_clone.fetch_add(1, Ordering::SeqCst);
		if n < 2 {
			return -errno::EINTR;
		}
		let msg = msg as *mut MsOcallGettime;
		unsafe {
			(*msg).microsec = 123_456;
		}
		0
	});
	let dispatcher = ExitlessDispatcher::new(&backstop, BridgeConfig::default());
	let call = Call::new(fixture.boundary(), &fixture.scratch, &dispatcher);

	let mark = fixture.scratch.mark();
	let result = crate::time::gettime(&call);
	assert_eq!(result, Ok(123_456));
	assert_eq!(attempt.load(Ordering::SeqCst), 3);
	assert_eq!(fixture.scratch.used(), mark);
}
