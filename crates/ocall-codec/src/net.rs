use enclave_boundary::MemoryPartition;
use ocall_types::{
	errno, MsOcallAccept, MsOcallConnect, MsOcallListen, MsOcallRecv, MsOcallSend,
	MsOcallSetsockopt, MsOcallShutdown, MsOcallSocketpair, OcallCode, SockOpt,
};

use crate::context::Call;

pub fn socketpair<M: MemoryPartition>(call: &Call<'_, M>, domain: i32, ty: i32, protocol: i32) -> Result<[i32; 2], i32> {
	let _guard = call.scratch.guard();
	let msg_ptr = call.alloc_msg::<MsOcallSocketpair>()?;
	unsafe {
		msg_ptr.write(MsOcallSocketpair { domain, ty, protocol, sockfds: [-1, -1] });
	}
	let r = call.dispatch(OcallCode::Socketpair, msg_ptr as *mut u8);
	if r < 0 {
		return Err(r);
	}
	Ok(unsafe { (*msg_ptr).sockfds })
}

pub fn listen<M: MemoryPartition>(
	call: &Call<'_, M>,
	domain: i32,
	ty: i32,
	protocol: i32,
	addr: *mut u8,
	addrlen: u32,
	sockopt: SockOpt,
) -> i32 {
	let _guard = call.scratch.guard();
	let addr_host = match call.copy_in_opt(Some((addr as *const u8, addrlen as usize))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallListen>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallListen { domain, ty, protocol, addrlen, addr: addr_host, sockopt });
	}
	let r = call.dispatch(OcallCode::Listen, msg_ptr as *mut u8);
	if r < 0 {
		return r;
	}
	match call.copy_out(addr, addrlen as usize, addr_host, addrlen as usize) {
		Ok(()) => r,
		Err(e) => e,
	}
}

pub fn accept<M: MemoryPartition>(call: &Call<'_, M>, sockfd: i32, addr: *mut u8, addrlen: u32, sockopt: SockOpt) -> i32 {
	let _guard = call.scratch.guard();
	let addr_host = match call.copy_in_opt(Some((addr as *const u8, addrlen as usize))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallAccept>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallAccept { sockfd, addrlen, addr: addr_host, sockopt });
	}
	let r = call.dispatch(OcallCode::Accept, msg_ptr as *mut u8);
	if r < 0 {
		return r;
	}
	match call.copy_out(addr, addrlen as usize, addr_host, addrlen as usize) {
		Ok(()) => r,
		Err(e) => e,
	}
}

#[allow(clippy::too_many_arguments)]
pub fn connect<M: MemoryPartition>(
	call: &Call<'_, M>,
	domain: i32,
	ty: i32,
	protocol: i32,
	addr: *const u8,
	addrlen: u32,
	bind_addr: *mut u8,
	bind_addrlen: u32,
	sockopt: SockOpt,
) -> i32 {
	let _guard = call.scratch.guard();
	let addr_host = match call.copy_in_opt(Some((addr, addrlen as usize))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let bind_addr_host = match call.copy_in_opt(Some((bind_addr as *const u8, bind_addrlen as usize))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallConnect>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallConnect {
			domain,
			ty,
			protocol,
			addrlen,
			bind_addrlen,
			addr: addr_host,
			bind_addr: bind_addr_host,
			sockopt,
		});
	}
	let r = call.dispatch(OcallCode::Connect, msg_ptr as *mut u8);
	if r < 0 {
		return r;
	}
	match call.copy_out(bind_addr, bind_addrlen as usize, bind_addr_host, bind_addrlen as usize) {
		Ok(()) => r,
		Err(e) => e,
	}
}

/// A `send`/`recv` buffer that is neither wholly in E nor wholly in H is a caller programming
/// error: reject before any scratch allocation or dispatch, per the straddling-buffer rule.
fn reject_if_straddling<M: MemoryPartition>(call: &Call<'_, M>, ptr: *const u8, len: usize) -> Result<(), i32> {
	if len == 0 {
		return Ok(());
	}
	if call.boundary.is_fully_inside_enclave(ptr, len) || call.boundary.is_fully_outside_enclave(ptr, len) {
		Ok(())
	} else {
		Err(-errno::EPERM)
	}
}

#[allow(clippy::too_many_arguments)]
pub fn recv<M: MemoryPartition>(
	call: &Call<'_, M>,
	sockfd: i32,
	buf: *mut u8,
	count: usize,
	addr: *mut u8,
	addrlen: u32,
	control: *mut u8,
	controllen: u64,
) -> i32 {
	let _guard = call.scratch.guard();
	if let Err(e) = reject_if_straddling(call, buf as *const u8, count) {
		return e;
	}
	let buf_host = match call.scratch.alloc(count.max(1), 1) {
		Some(p) => p,
		None => return -errno::EPERM,
	};
	let addr_host = match call.copy_in_opt(Some((addr as *const u8, addrlen as usize))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let control_host = match call.copy_in_opt(Some((control as *const u8, controllen as usize))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallRecv>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallRecv {
			sockfd,
			count: count as u32,
			addrlen,
			controllen,
			buf: buf_host,
			addr: addr_host,
			control: control_host,
		});
	}
	let r = call.dispatch(OcallCode::Recv, msg_ptr as *mut u8);
	if r < 0 {
		return r;
	}
	if let Err(e) = call.copy_out(buf, count, buf_host, r as usize) {
		return e;
	}
	if let Err(e) = call.copy_out(addr, addrlen as usize, addr_host, addrlen as usize) {
		return e;
	}
	if let Err(e) = call.copy_out(control, controllen as usize, control_host, controllen as usize) {
		return e;
	}
	r
}

#[allow(clippy::too_many_arguments)]
pub fn send<M: MemoryPartition>(
	call: &Call<'_, M>,
	sockfd: i32,
	buf: *const u8,
	count: usize,
	addr: *const u8,
	addrlen: u32,
	control: *const u8,
	controllen: u64,
) -> i32 {
	let _guard = call.scratch.guard();
	if let Err(e) = reject_if_straddling(call, buf, count) {
		return e;
	}
	let buf_host = if call.boundary.is_fully_outside_enclave(buf, count) {
		buf
	} else {
		match call.copy_in_opt(Some((buf, count))) {
			Ok(p) => p as *const u8,
			Err(e) => return e,
		}
	};
	let addr_host = match call.copy_in_opt(Some((addr, addrlen as usize))) {
		Ok(p) => p as *const u8,
		Err(e) => return e,
	};
	let control_host = match call.copy_in_opt(Some((control, controllen as usize))) {
		Ok(p) => p as *const u8,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallSend>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallSend {
			sockfd,
			count: count as u32,
			addrlen,
			controllen,
			buf: buf_host,
			addr: addr_host,
			control: control_host,
		});
	}
	call.dispatch(OcallCode::Send, msg_ptr as *mut u8)
}

pub fn setsockopt<M: MemoryPartition>(
	call: &Call<'_, M>,
	sockfd: i32,
	level: i32,
	optname: i32,
	optval: *const u8,
	optlen: u32,
) -> i32 {
	let _guard = call.scratch.guard();
	let optval_host = match call.copy_in_opt(Some((optval, optlen as usize))) {
		Ok(p) => p as *const u8,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallSetsockopt>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallSetsockopt { sockfd, level, optname, optlen, optval: optval_host });
	}
	call.dispatch(OcallCode::Setsockopt, msg_ptr as *mut u8)
}

pub fn shutdown<M: MemoryPartition>(call: &Call<'_, M>, sockfd: i32, how: i32) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallShutdown>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallShutdown { sockfd, how });
	}
	call.dispatch(OcallCode::Shutdown, msg_ptr as *mut u8)
}
