use enclave_boundary::MemoryPartition;
use ocall_types::{errno, MsOcallMmapUntrusted, MsOcallMunmapUntrusted, OcallCode};

use crate::context::Call;

/// Page size assumed for the "aligned up" rounding the large-buffer policy calls for. Matches
/// the host's page granularity on every platform this bridge targets.
const PAGE_SIZE: u64 = 4096;

fn align_up(n: u64, align: u64) -> u64 {
	(n + align - 1) & !(align - 1)
}

/// Obtain an anonymous host mapping of at least `size` bytes via a recursive `mmap_untrusted`
/// OCALL, for payloads that would overflow the scratch budget. Returns the host-resident pointer
/// and the (page-rounded) size actually mapped.
pub fn mmap_untrusted<M: MemoryPartition>(
	call: &Call<'_, M>,
	fd: i32,
	offset: u64,
	size: u64,
	prot: u16,
) -> Result<(*mut u8, u64), i32> {
	let _guard = call.scratch.guard();
	let rounded = align_up(size, PAGE_SIZE);
	let msg_ptr = call.alloc_msg::<MsOcallMmapUntrusted>()?;
	// SAFETY: `msg_ptr` was just carved out of scratch for this call alone.
	unsafe {
		msg_ptr.write(MsOcallMmapUntrusted { fd, offset, size: rounded, prot, mem: core::ptr::null_mut() });
	}
	let r = call.dispatch(OcallCode::MmapUntrusted, msg_ptr as *mut u8);
	if r < 0 {
		return Err(r);
	}
	// SAFETY: the worker only ever writes `mem` before releasing the descriptor lock, which the
	// dispatcher has already observed by the time `dispatch` returns.
	let host_mem = unsafe { (*msg_ptr).mem };
	let mut mem = core::ptr::null_mut();
	if !call.boundary.copy_ptr_to_enclave(&mut mem, host_mem, rounded as usize) {
		return Err(-errno::EPERM);
	}
	Ok((mem, rounded))
}

pub fn munmap_untrusted<M: MemoryPartition>(call: &Call<'_, M>, mem: *mut u8, size: u64) -> Result<(), i32> {
	let _guard = call.scratch.guard();
	let msg_ptr = call.alloc_msg::<MsOcallMunmapUntrusted>()?;
	unsafe {
		msg_ptr.write(MsOcallMunmapUntrusted { mem, size });
	}
	let r = call.dispatch(OcallCode::MunmapUntrusted, msg_ptr as *mut u8);
	if r < 0 {
		return Err(r);
	}
	Ok(())
}

pub fn cpuid<M: MemoryPartition>(call: &Call<'_, M>, leaf: u32, subleaf: u32) -> Result<[u32; 4], i32> {
	use ocall_types::MsOcallCpuid;
	let _guard = call.scratch.guard();
	let msg_ptr = call.alloc_msg::<MsOcallCpuid>()?;
	unsafe {
		msg_ptr.write(MsOcallCpuid { leaf, subleaf, values: [0; 4] });
	}
	let r = call.dispatch(OcallCode::Cpuid, msg_ptr as *mut u8);
	if r < 0 {
		return Err(r);
	}
	Ok(unsafe { (*msg_ptr).values })
}
