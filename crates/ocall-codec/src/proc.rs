use enclave_boundary::MemoryPartition;
use ocall_types::{MsOcallCreateProcess, MsOcallEventfd, OcallCode};

use crate::context::Call;

/// `resume_thread(tcs)`. No message struct: the TCS pointer itself is the payload, matching the
/// source ocall which passes it through unwrapped.
pub fn resume_thread<M: MemoryPartition>(call: &Call<'_, M>, tcs: *mut u8) -> i32 {
	let _guard = call.scratch.guard();
	call.dispatch(OcallCode::ResumeThread, tcs)
}

/// `clone_thread()`. Takes no payload at all.
pub fn clone_thread<M: MemoryPartition>(call: &Call<'_, M>) -> i32 {
	let _guard = call.scratch.guard();
	call.dispatch(OcallCode::CloneThread, core::ptr::null_mut())
}

/// `load_debug(command)`. No message struct: the copied-in, NUL-terminated command string
/// pointer is itself the payload.
pub fn load_debug<M: MemoryPartition>(call: &Call<'_, M>, command: *const u8, command_len: usize) -> i32 {
	let _guard = call.scratch.guard();
	let host_cmd = match call.copy_in_opt(Some((command, command_len))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	call.dispatch(OcallCode::LoadDebug, host_cmd)
}

pub fn eventfd<M: MemoryPartition>(call: &Call<'_, M>, initval: u32, flags: i32) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallEventfd>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallEventfd { initval, flags });
	}
	call.dispatch(OcallCode::Eventfd, msg_ptr as *mut u8)
}

/// `create_process(uri, args, out pid, out proc_fds)`. `args` is an enclave-resident array of
/// enclave-resident NUL-terminated strings; each is individually copied into scratch, then the
/// array of resulting host pointers is itself copied into scratch.
pub fn create_process<M: MemoryPartition>(
	call: &Call<'_, M>,
	uri: *const u8,
	uri_len: usize,
	args: &[(*const u8, usize)],
) -> Result<(u32, [i32; 3]), i32> {
	let _guard = call.scratch.guard();
	let uri_host = call.copy_in_opt(Some((uri, uri_len)))?;

	let mut host_arg_ptrs: Vec<*const u8> = Vec::with_capacity(args.len());
	for &(ptr, len) in args {
		let host_ptr = call.copy_in_opt(Some((ptr, len)))?;
		host_arg_ptrs.push(host_ptr as *const u8);
	}
	let args_host = if host_arg_ptrs.is_empty() {
		core::ptr::null()
	} else {
		let slot = call
			.scratch
			.alloc(host_arg_ptrs.len() * core::mem::size_of::<*const u8>(), core::mem::align_of::<*const u8>())
			.ok_or(-ocall_types::errno::EPERM)? as *mut *const u8;
		for (i, p) in host_arg_ptrs.iter().enumerate() {
			unsafe {
				slot.add(i).write(*p);
			}
		}
		slot as *const *const u8
	};

	let msg_ptr = call.alloc_msg::<MsOcallCreateProcess>()?;
	unsafe {
		msg_ptr.write(MsOcallCreateProcess {
			uri: uri_host,
			uri_len,
			nargs: args.len() as i32,
			args: args_host,
			pid: 0,
			proc_fds: [-1, -1, -1],
		});
	}
	let r = call.dispatch(OcallCode::CreateProcess, msg_ptr as *mut u8);
	if r < 0 {
		return Err(r);
	}
	let pid = unsafe { (*msg_ptr).pid };
	let proc_fds = unsafe { (*msg_ptr).proc_fds };
	Ok((pid, proc_fds))
}
