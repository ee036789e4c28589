use enclave_boundary::{Boundary, MemoryPartition, ScratchAllocator};
use ocall_dispatch::ExitlessDispatcher;
use ocall_types::{BridgeError, OcallCode};

/// Everything one marshaller/unmarshaller needs: the Arbiter, the per-call scratch allocator and
/// the dispatcher it hands a prepared message to. Built fresh by the facade for every OCALL —
/// there is no state here that outlives a single call.
pub struct Call<'a, M: MemoryPartition> {
	pub boundary: Boundary<'a, M>,
	pub scratch: &'a ScratchAllocator,
	pub dispatcher: &'a ExitlessDispatcher<'a>,
}

impl<'a, M: MemoryPartition> Call<'a, M> {
	pub fn new(
		boundary: Boundary<'a, M>,
		scratch: &'a ScratchAllocator,
		dispatcher: &'a ExitlessDispatcher<'a>,
	) -> Self {
		Call { boundary, scratch, dispatcher }
	}

	/// Allocate a typed message in scratch, returning `PERM` if the frame is exhausted.
	pub fn alloc_msg<T>(&self) -> Result<*mut T, i32> {
		self.scratch.alloc_for::<T>().ok_or_else(|| BridgeError::ScratchExhausted.as_errno())
	}

	/// Copy an enclave-resident input buffer into scratch. `None` length means "nullable and
	/// absent" and yields a null pointer without touching the Arbiter.
	pub fn copy_in_opt(&self, src: Option<(*const u8, usize)>) -> Result<*mut u8, i32> {
		match src {
			None => Ok(core::ptr::null_mut()),
			Some((ptr, len)) => {
				if len == 0 {
					return Ok(core::ptr::null_mut());
				}
				self.scratch
					.copy_in(&self.boundary, ptr, len)
					.ok_or_else(|| BridgeError::Containment.as_errno())
			}
		}
	}

	/// Dispatch a prepared message for `code`, forwarding the host's raw integer result.
	pub fn dispatch(&self, code: OcallCode, msg: *mut u8) -> i32 {
		self.dispatcher.dispatch(code, msg, self.scratch)
	}

	/// Bypass the exitless path entirely, going straight to the Backstop. Used by OCALLs that
	/// must never be deferred (`sleep`).
	pub fn dispatch_direct(&self, code: OcallCode, msg: *mut u8) -> i32 {
		self.dispatcher.dispatch_direct(code, msg)
	}

	/// Copy `n` bytes from a host-resident pointer back into an enclave-resident destination.
	/// Returns `PERM` on any containment refusal.
	pub fn copy_out(&self, dst: *mut u8, dst_cap: usize, src: *const u8, n: usize) -> Result<(), i32> {
		if n == 0 {
			return Ok(());
		}
		let copied = self.boundary.copy_to_enclave(dst, dst_cap, src, n);
		if copied != n {
			return Err(BridgeError::Containment.as_errno());
		}
		Ok(())
	}
}
