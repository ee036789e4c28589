//! A simulated enclave/host memory layout for tests and for the `host-sim` embedding.
//!
//! Real hardware gives you one address space split into an enclave region and a host region;
//! here we model that with two disjoint heap arenas instead of deriving it from SGX metadata.
//! Everything above [`MemoryPartition`] (the arbiter, scratch, codec, dispatch) cannot tell the
//! difference.

use crate::arbiter::MemoryPartition;

/// Two disjoint byte arenas standing in for the enclave (E) and host (H) address ranges.
pub struct SimPartition {
	enclave: Box<[u8]>,
	host: Box<[u8]>,
}

impl SimPartition {
	pub fn new(enclave_size: usize, host_size: usize) -> Self {
		SimPartition {
			enclave: vec![0u8; enclave_size].into_boxed_slice(),
			host: vec![0u8; host_size].into_boxed_slice(),
		}
	}

	pub fn enclave_ptr(&self) -> *mut u8 {
		self.enclave.as_ptr() as *mut u8
	}

	pub fn enclave_len(&self) -> usize {
		self.enclave.len()
	}

	pub fn host_ptr(&self) -> *mut u8 {
		self.host.as_ptr() as *mut u8
	}

	pub fn host_len(&self) -> usize {
		self.host.len()
	}

	fn range_within(base: *const u8, len: usize, p: *const u8, n: usize) -> bool {
		if n == 0 {
			return true;
		}
		let base = base as usize;
		let p = p as usize;
		match p.checked_sub(base) {
			Some(offset) => match offset.checked_add(n) {
				Some(end) => end <= len,
				None => false,
			},
			None => false,
		}
	}
}

impl MemoryPartition for SimPartition {
	fn is_fully_inside_enclave(&self, p: *const u8, n: usize) -> bool {
		Self::range_within(self.enclave.as_ptr(), self.enclave.len(), p, n)
	}

	fn is_fully_inside_host(&self, p: *const u8, n: usize) -> bool {
		Self::range_within(self.host.as_ptr(), self.host.len(), p, n)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::arbiter::Boundary;

	#[test]
	fn containment_is_exclusive() {
		let sim = SimPartition::new(64, 64);
		let e = sim.enclave_ptr();
		let h = sim.host_ptr();
		assert!(sim.is_fully_inside_enclave(e, 64));
		assert!(!sim.is_fully_inside_host(e, 64));
		assert!(sim.is_fully_inside_host(h, 64));
		assert!(!sim.is_fully_inside_enclave(h, 64));
	}

	#[test]
	fn out_of_range_is_refused() {
		let sim = SimPartition::new(64, 64);
		let e = sim.enclave_ptr();
		assert!(!sim.is_fully_inside_enclave(e, 65));
		// A pointer one byte past the end, zero length: still not inside (offset == len is ok,
		// but starting past the base entirely with nonzero requested length is not).
		let past = unsafe { e.add(64) };
		assert!(!sim.is_fully_inside_enclave(past, 1));
	}

	#[test]
	fn straddling_buffer_is_rejected() {
		let sim = SimPartition::new(64, 64);
		// No arena is adjacent to the other by construction (two independent allocations), so a
		// pointer near the end of enclave with a length running past it already lands outside
		// both ranges rather than spanning into host — exercise that refusal path directly.
		let e = sim.enclave_ptr();
		let near_end = unsafe { e.add(60) };
		assert!(sim.straddles(near_end, 8));
	}

	#[test]
	fn copy_round_trips_through_host_scratch() {
		let sim = SimPartition::new(64, 64);
		let boundary = Boundary::new(&sim);
		let payload = [1u8, 2, 3, 4];
		let host_buf = sim.host_ptr();
		assert!(boundary.copy_to_host(host_buf, payload.as_ptr(), payload.len()));
		let enclave_buf = sim.enclave_ptr();
		let copied = boundary.copy_to_enclave(enclave_buf, 64, host_buf, payload.len());
		assert_eq!(copied, payload.len());
		let out = unsafe { core::slice::from_raw_parts(enclave_buf, payload.len()) };
		assert_eq!(out, &payload);
	}
}
