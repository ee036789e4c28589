use core::ptr;

/// Answers the only two questions the bridge is allowed to trust: is this address range wholly
/// inside the enclave (E), or wholly inside the host (H)?
///
/// Production code implements this against the platform's actual enclave image bounds (the
/// analogue of `sgx_trts`'s `rsgx_is_within_enclave`/`is_within_host`). Tests implement it
/// against two disjoint arenas standing in for E and H — see [`crate::sim`].
pub trait MemoryPartition {
	fn is_fully_inside_enclave(&self, p: *const u8, n: usize) -> bool;
	fn is_fully_inside_host(&self, p: *const u8, n: usize) -> bool;

	/// Neither fully enclave nor fully host: a straddling buffer, always a caller programming
	/// error (see §4.3's send/recv rule) and never dispatched.
	fn straddles(&self, p: *const u8, n: usize) -> bool {
		!self.is_fully_inside_enclave(p, n) && !self.is_fully_inside_host(p, n)
	}
}

/// The Boundary Memory Arbiter: containment checks plus the only two copy primitives allowed to
/// move bytes across the trust boundary.
pub struct Boundary<'a, M: MemoryPartition> {
	partition: &'a M,
}

impl<'a, M: MemoryPartition> Boundary<'a, M> {
	pub fn new(partition: &'a M) -> Self {
		Boundary { partition }
	}

	pub fn is_fully_inside_enclave(&self, p: *const u8, n: usize) -> bool {
		self.partition.is_fully_inside_enclave(p, n)
	}

	pub fn is_fully_outside_enclave(&self, p: *const u8, n: usize) -> bool {
		self.partition.is_fully_inside_host(p, n)
	}

	/// Copy `n` bytes from a host-resident `src` into an enclave-resident `dst` of capacity
	/// `dst_cap`. Returns the number of bytes copied, or `0` on any containment refusal — the
	/// caller (`ocall-codec`) treats `0` as "surface a `PERM` error", matching the source
	/// contract where a failed `sgx_copy_to_enclave` returns `0`/false.
	///
	/// `n` must already be a value the caller trusts (re-bounded against its own expectation,
	/// not re-read from the message after this call) — this function does not re-derive `n`
	/// from anything host-controlled, so it cannot be used to launder a TOCTOU size.
	pub fn copy_to_enclave(&self, dst: *mut u8, dst_cap: usize, src: *const u8, n: usize) -> usize {
		if n > dst_cap {
			log::warn!("copy_to_enclave refused: {} bytes would overflow a {}-byte destination", n, dst_cap);
			return 0;
		}
		if !self.partition.is_fully_inside_enclave(dst as *const u8, dst_cap) {
			log::warn!("copy_to_enclave refused: destination is not fully enclave-resident");
			return 0;
		}
		if !self.partition.is_fully_inside_host(src, n) {
			log::warn!("copy_to_enclave refused: source is not fully host-resident");
			return 0;
		}
		if n == 0 {
			return 0;
		}
		// SAFETY: both ranges were just checked for containment and do not overlap by
		// construction (one lies wholly in E, the other wholly in H).
		unsafe {
			ptr::copy_nonoverlapping(src, dst, n);
		}
		n
	}

	/// Copy `n` bytes from an enclave-resident `src` into a host-resident `dst`. Returns `false`
	/// on any containment refusal.
	pub fn copy_to_host(&self, dst: *mut u8, src: *const u8, n: usize) -> bool {
		if n == 0 {
			return true;
		}
		if !self.partition.is_fully_inside_host(dst as *const u8, n) {
			log::warn!("copy_to_host refused: destination is not fully host-resident");
			return false;
		}
		if !self.partition.is_fully_inside_enclave(src, n) {
			log::warn!("copy_to_host refused: source is not fully enclave-resident");
			return false;
		}
		// SAFETY: as above.
		unsafe {
			ptr::copy_nonoverlapping(src, dst, n);
		}
		true
	}

	/// Copy `n` bytes from a host-resident `src` into `dst`, a buffer the bridge itself just
	/// allocated as enclave-owned (as opposed to a caller-supplied destination). Unlike
	/// [`Boundary::copy_to_enclave`] this does not re-validate `dst` against E: there is nothing
	/// to check — the caller allocated it moments ago and it is not attacker-influenced — only the
	/// host side of a copy can be. Returns `false` if `src` is not fully host-resident.
	pub fn copy_host_into_owned(&self, dst: *mut u8, src: *const u8, n: usize) -> bool {
		if n == 0 {
			return true;
		}
		if !self.partition.is_fully_inside_host(src, n) {
			log::warn!("copy_host_into_owned refused: source is not fully host-resident");
			return false;
		}
		// SAFETY: `src` was just checked to lie wholly in H; `dst` is a fresh, uniquely-owned
		// allocation at least `n` bytes long by the caller's contract.
		unsafe {
			ptr::copy_nonoverlapping(src, dst, n);
		}
		true
	}

	/// Hand ownership of a host mapping to the enclave without copying its contents: validate
	/// `[host_ptr, host_ptr + n)` lies wholly in H, then store it into an enclave-resident output
	/// slot. Used by `ocall_mmap_untrusted` to return the mapping address itself.
	pub fn copy_ptr_to_enclave(&self, out_ptr: &mut *mut u8, host_ptr: *mut u8, n: usize) -> bool {
		if !self.partition.is_fully_inside_host(host_ptr as *const u8, n) {
			log::warn!("copy_ptr_to_enclave refused: {}-byte mapping is not fully host-resident", n);
			return false;
		}
		*out_ptr = host_ptr;
		true
	}
}
