use enclave_boundary::MemoryPartition;
use ocall_types::{errno, MsOcallGettime, MsOcallPoll, MsOcallSleep, OcallCode};

use crate::context::Call;

/// `gettime(&mut microsec)`. Retries on `EINTR` only — per the preserved (documented) invariant
/// that this is the one time OCALL where a transient interrupt implies "try again", not "report
/// it to the caller". See the design notes: this asymmetry with `sleep` is deliberate to
/// preserve, not to generalize away.
pub fn gettime<M: MemoryPartition>(call: &Call<'_, M>) -> Result<u64, i32> {
	let _guard = call.scratch.guard();
	loop {
		let msg_ptr = call.alloc_msg::<MsOcallGettime>()?;
		unsafe {
			msg_ptr.write(MsOcallGettime { microsec: 0 });
		}
		let r = call.dispatch(OcallCode::Gettime, msg_ptr as *mut u8);
		if r == -errno::EINTR {
			continue;
		}
		if r < 0 {
			return Err(r);
		}
		return Ok(unsafe { (*msg_ptr).microsec });
	}
}

/// `sleep(&mut microsec)`. Not retried: on `EINTR` the remaining microseconds are reported back
/// through `microsec` and the interruption is surfaced to the caller, unlike `gettime`.
pub fn sleep<M: MemoryPartition>(call: &Call<'_, M>, microsec: &mut u64) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallSleep>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallSleep { microsec: *microsec });
	}
	// Never deferred to the exitless path: the thread is suspending regardless, so the exitless
	// machinery (enqueue, spin, futex wait) would only add overhead.
	let r = call.dispatch_direct(OcallCode::Sleep, msg_ptr as *mut u8);
	if r == 0 {
		*microsec = 0;
	} else if r == -errno::EINTR {
		*microsec = unsafe { (*msg_ptr).microsec };
	}
	r
}

pub fn poll<M: MemoryPartition>(call: &Call<'_, M>, fds: *mut u8, fds_len: usize, nfds: i32, timeout_us: i64) -> i32 {
	let _guard = call.scratch.guard();
	let fds_host = match call.copy_in_opt(Some((fds as *const u8, fds_len))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallPoll>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallPoll { nfds, timeout_us, fds: fds_host, fds_len });
	}
	let r = call.dispatch(OcallCode::Poll, msg_ptr as *mut u8);
	if r < 0 {
		return r;
	}
	match call.copy_out(fds, fds_len, fds_host, fds_len) {
		Ok(()) => r,
		Err(e) => e,
	}
}
