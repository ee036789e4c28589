use enclave_boundary::MemoryPartition;
use ocall_types::{
	errno, FileStat, MsOcallClose, MsOcallDelete, MsOcallFchmod, MsOcallFionread,
	MsOcallFsetnonblock, MsOcallFstat, MsOcallFsync, MsOcallFtruncate, MsOcallGetdents,
	MsOcallLseek, MsOcallMkdir, MsOcallOpen, MsOcallRead, MsOcallRename, MsOcallWrite, OcallCode,
};

use crate::context::Call;
use crate::mem::{mmap_untrusted, munmap_untrusted};

const PROT_READ_WRITE: u16 = 0b11;

/// `open(pathname, flags, mode)`. `pathname` is enclave-resident, NUL-terminated or not —
/// `pathname_len` is the caller-trusted length, never re-derived from the host.
pub fn open<M: MemoryPartition>(
	call: &Call<'_, M>,
	pathname: *const u8,
	pathname_len: usize,
	flags: i32,
	mode: u16,
) -> i32 {
	let _guard = call.scratch.guard();
	let path_host = match call.copy_in_opt(Some((pathname, pathname_len))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallOpen>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallOpen { flags, mode, pathname: path_host, pathname_len });
	}
	call.dispatch(OcallCode::Open, msg_ptr as *mut u8)
}

pub fn close<M: MemoryPartition>(call: &Call<'_, M>, fd: i32) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallClose>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallClose { fd });
	}
	call.dispatch(OcallCode::Close, msg_ptr as *mut u8)
}

/// `read(fd, buf, count)`. `buf` is enclave-resident, of capacity `count`. Returns the number of
/// bytes read, or a negative errno.
pub fn read<M: MemoryPartition>(call: &Call<'_, M>, fd: i32, buf: *mut u8, count: usize) -> i32 {
	let _guard = call.scratch.guard();
	if count as u64 > call.scratch.capacity() as u64 {
		return read_oversize(call, fd, buf, count);
	}
	let host_buf = match call.scratch.alloc(count.max(1), 1) {
		Some(p) => p,
		None => return -errno::EPERM,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallRead>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallRead { fd, count: count as u32, buf: host_buf });
	}
	let r = call.dispatch(OcallCode::Read, msg_ptr as *mut u8);
	if r < 0 {
		return r;
	}
	match call.copy_out(buf, count, host_buf, r as usize) {
		Ok(()) => r,
		Err(e) => e,
	}
}

fn read_oversize<M: MemoryPartition>(call: &Call<'_, M>, fd: i32, buf: *mut u8, count: usize) -> i32 {
	let (mem, rounded) = match mmap_untrusted(call, -1, 0, count as u64, PROT_READ_WRITE) {
		Ok(v) => v,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallRead>() {
		Ok(p) => p,
		Err(e) => {
			let _ = munmap_untrusted(call, mem, rounded);
			return e;
		}
	};
	unsafe {
		msg_ptr.write(MsOcallRead { fd, count: count as u32, buf: mem });
	}
	let r = call.dispatch(OcallCode::Read, msg_ptr as *mut u8);
	let outcome = if r < 0 {
		Err(r)
	} else {
		call.copy_out(buf, count, mem, r as usize).map(|()| r)
	};
	let _ = munmap_untrusted(call, mem, rounded);
	match outcome {
		Ok(n) => n,
		Err(e) => e,
	}
}

/// `write(fd, buf, count)`. `buf` may be enclave-resident (copied to scratch or an oversize
/// mapping) or already host-resident (e.g. an mmap-backed file), forwarded by pointer with no
/// copy in that case.
pub fn write<M: MemoryPartition>(call: &Call<'_, M>, fd: i32, buf: *const u8, count: usize) -> i32 {
	let _guard = call.scratch.guard();
	if call.boundary.is_fully_outside_enclave(buf, count) {
		// Already host-resident: forward by pointer, no copy.
		let msg_ptr = match call.alloc_msg::<MsOcallWrite>() {
			Ok(p) => p,
			Err(e) => return e,
		};
		unsafe {
			msg_ptr.write(MsOcallWrite { fd, count: count as u32, buf });
		}
		return call.dispatch(OcallCode::Write, msg_ptr as *mut u8);
	}

	if count as u64 > call.scratch.capacity() as u64 {
		return write_oversize(call, fd, buf, count);
	}

	let host_buf = match call.copy_in_opt(Some((buf, count))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallWrite>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallWrite { fd, count: count as u32, buf: host_buf });
	}
	call.dispatch(OcallCode::Write, msg_ptr as *mut u8)
}

fn write_oversize<M: MemoryPartition>(call: &Call<'_, M>, fd: i32, buf: *const u8, count: usize) -> i32 {
	let (mem, rounded) = match mmap_untrusted(call, -1, 0, count as u64, PROT_READ_WRITE) {
		Ok(v) => v,
		Err(e) => return e,
	};
	if !call.boundary.copy_to_host(mem, buf, count) {
		let _ = munmap_untrusted(call, mem, rounded);
		return -errno::EPERM;
	}
	let msg_ptr = match call.alloc_msg::<MsOcallWrite>() {
		Ok(p) => p,
		Err(e) => {
			let _ = munmap_untrusted(call, mem, rounded);
			return e;
		}
	};
	unsafe {
		msg_ptr.write(MsOcallWrite { fd, count: count as u32, buf: mem });
	}
	let r = call.dispatch(OcallCode::Write, msg_ptr as *mut u8);
	let _ = munmap_untrusted(call, mem, rounded);
	r
}

pub fn fstat<M: MemoryPartition>(call: &Call<'_, M>, fd: i32) -> Result<FileStat, i32> {
	let _guard = call.scratch.guard();
	let msg_ptr = call.alloc_msg::<MsOcallFstat>()?;
	unsafe {
		msg_ptr.write(MsOcallFstat { fd, stat: FileStat::default() });
	}
	let r = call.dispatch(OcallCode::Fstat, msg_ptr as *mut u8);
	if r < 0 {
		return Err(r);
	}
	Ok(unsafe { (*msg_ptr).stat })
}

pub fn fionread<M: MemoryPartition>(call: &Call<'_, M>, fd: i32) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallFionread>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallFionread { fd });
	}
	call.dispatch(OcallCode::Fionread, msg_ptr as *mut u8)
}

pub fn fsetnonblock<M: MemoryPartition>(call: &Call<'_, M>, fd: i32, nonblocking: bool) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallFsetnonblock>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallFsetnonblock { fd, nonblocking: nonblocking as i32 });
	}
	call.dispatch(OcallCode::Fsetnonblock, msg_ptr as *mut u8)
}

pub fn fchmod<M: MemoryPartition>(call: &Call<'_, M>, fd: i32, mode: u16) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallFchmod>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallFchmod { fd, mode });
	}
	call.dispatch(OcallCode::Fchmod, msg_ptr as *mut u8)
}

pub fn fsync<M: MemoryPartition>(call: &Call<'_, M>, fd: i32) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallFsync>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallFsync { fd });
	}
	call.dispatch(OcallCode::Fsync, msg_ptr as *mut u8)
}

pub fn ftruncate<M: MemoryPartition>(call: &Call<'_, M>, fd: i32, length: u64) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallFtruncate>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallFtruncate { fd, length });
	}
	call.dispatch(OcallCode::Ftruncate, msg_ptr as *mut u8)
}

pub fn lseek<M: MemoryPartition>(call: &Call<'_, M>, fd: i32, offset: u64, whence: i32) -> i32 {
	let _guard = call.scratch.guard();
	let msg_ptr = match call.alloc_msg::<MsOcallLseek>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallLseek { fd, offset, whence });
	}
	call.dispatch(OcallCode::Lseek, msg_ptr as *mut u8)
}

pub fn mkdir<M: MemoryPartition>(call: &Call<'_, M>, pathname: *const u8, pathname_len: usize, mode: u16) -> i32 {
	let _guard = call.scratch.guard();
	let path_host = match call.copy_in_opt(Some((pathname, pathname_len))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallMkdir>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallMkdir { mode, pathname: path_host, pathname_len });
	}
	call.dispatch(OcallCode::Mkdir, msg_ptr as *mut u8)
}

/// `getdents(fd, dirp, size)`. `dirp` is enclave-resident; the large-buffer policy applies the
/// same way it does to `read`.
pub fn getdents<M: MemoryPartition>(call: &Call<'_, M>, fd: i32, dirp: *mut u8, size: usize) -> i32 {
	let _guard = call.scratch.guard();
	if size as u64 > call.scratch.capacity() as u64 {
		let (mem, rounded) = match mmap_untrusted(call, -1, 0, size as u64, PROT_READ_WRITE) {
			Ok(v) => v,
			Err(e) => return e,
		};
		let msg_ptr = match call.alloc_msg::<MsOcallGetdents>() {
			Ok(p) => p,
			Err(e) => {
				let _ = munmap_untrusted(call, mem, rounded);
				return e;
			}
		};
		unsafe {
			msg_ptr.write(MsOcallGetdents { fd, size: size as u32, dirp: mem });
		}
		let r = call.dispatch(OcallCode::Getdents, msg_ptr as *mut u8);
		let outcome = if r < 0 { Err(r) } else { call.copy_out(dirp, size, mem, r as usize).map(|()| r) };
		let _ = munmap_untrusted(call, mem, rounded);
		return match outcome {
			Ok(n) => n,
			Err(e) => e,
		};
	}
	let host_buf = match call.scratch.alloc(size.max(1), 1) {
		Some(p) => p,
		None => return -errno::EPERM,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallGetdents>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallGetdents { fd, size: size as u32, dirp: host_buf });
	}
	let r = call.dispatch(OcallCode::Getdents, msg_ptr as *mut u8);
	if r < 0 {
		return r;
	}
	match call.copy_out(dirp, size, host_buf, r as usize) {
		Ok(()) => r,
		Err(e) => e,
	}
}

pub fn rename<M: MemoryPartition>(
	call: &Call<'_, M>,
	oldpath: *const u8,
	oldpath_len: usize,
	newpath: *const u8,
	newpath_len: usize,
) -> i32 {
	let _guard = call.scratch.guard();
	let old_host = match call.copy_in_opt(Some((oldpath, oldpath_len))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let new_host = match call.copy_in_opt(Some((newpath, newpath_len))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallRename>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallRename { oldpath: old_host, oldpath_len, newpath: new_host, newpath_len });
	}
	call.dispatch(OcallCode::Rename, msg_ptr as *mut u8)
}

pub fn delete<M: MemoryPartition>(call: &Call<'_, M>, pathname: *const u8, pathname_len: usize) -> i32 {
	let _guard = call.scratch.guard();
	let path_host = match call.copy_in_opt(Some((pathname, pathname_len))) {
		Ok(p) => p,
		Err(e) => return e,
	};
	let msg_ptr = match call.alloc_msg::<MsOcallDelete>() {
		Ok(p) => p,
		Err(e) => return e,
	};
	unsafe {
		msg_ptr.write(MsOcallDelete { pathname: path_host, pathname_len });
	}
	call.dispatch(OcallCode::Delete, msg_ptr as *mut u8)
}
