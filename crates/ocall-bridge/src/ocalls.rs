//! Public OCALL wrappers. Each collapses to the negated-errno `i32` contract the enclave-side
//! caller expects — no `Result`, no panics, matching the original bridge's plain `int`-returning
//! functions.

use enclave_boundary::{MemoryPartition, ScratchAllocator};
use ocall_dispatch::Backstop;
use ocall_types::{EnclaveAttestation, FileStat, SockOpt};

use crate::bridge::OcallBridge;

macro_rules! bridge_fn {
	($name:ident ( $( $arg:ident : $ty:ty ),* $(,)? ) -> $ret:ty => |$call:ident| $body:expr) => {
		pub fn $name<M: MemoryPartition, B: Backstop>(
			bridge: &OcallBridge<M, B>,
			scratch: &ScratchAllocator,
			$( $arg: $ty ),*
		) -> $ret {
			bridge.with_call(scratch, |$call| $body)
		}
	};
}

bridge_fn!(open(pathname: *const u8, pathname_len: usize, flags: i32, mode: u16) -> i32 =>
	|call| ocall_codec::fs::open(call, pathname, pathname_len, flags, mode));

bridge_fn!(close(fd: i32) -> i32 => |call| ocall_codec::fs::close(call, fd));

bridge_fn!(read(fd: i32, buf: *mut u8, count: usize) -> i32 =>
	|call| ocall_codec::fs::read(call, fd, buf, count));

bridge_fn!(write(fd: i32, buf: *const u8, count: usize) -> i32 =>
	|call| ocall_codec::fs::write(call, fd, buf, count));

bridge_fn!(fstat(fd: i32) -> Result<FileStat, i32> => |call| ocall_codec::fs::fstat(call, fd));

bridge_fn!(fionread(fd: i32) -> i32 => |call| ocall_codec::fs::fionread(call, fd));

bridge_fn!(fsetnonblock(fd: i32, nonblocking: bool) -> i32 =>
	|call| ocall_codec::fs::fsetnonblock(call, fd, nonblocking));

bridge_fn!(fchmod(fd: i32, mode: u16) -> i32 => |call| ocall_codec::fs::fchmod(call, fd, mode));

bridge_fn!(fsync(fd: i32) -> i32 => |call| ocall_codec::fs::fsync(call, fd));

bridge_fn!(ftruncate(fd: i32, length: u64) -> i32 => |call| ocall_codec::fs::ftruncate(call, fd, length));

bridge_fn!(lseek(fd: i32, offset: u64, whence: i32) -> i32 =>
	|call| ocall_codec::fs::lseek(call, fd, offset, whence));

bridge_fn!(mkdir(pathname: *const u8, pathname_len: usize, mode: u16) -> i32 =>
	|call| ocall_codec::fs::mkdir(call, pathname, pathname_len, mode));

bridge_fn!(getdents(fd: i32, dirp: *mut u8, size: usize) -> i32 =>
	|call| ocall_codec::fs::getdents(call, fd, dirp, size));

bridge_fn!(rename(oldpath: *const u8, oldpath_len: usize, newpath: *const u8, newpath_len: usize) -> i32 =>
	|call| ocall_codec::fs::rename(call, oldpath, oldpath_len, newpath, newpath_len));

bridge_fn!(delete(pathname: *const u8, pathname_len: usize) -> i32 =>
	|call| ocall_codec::fs::delete(call, pathname, pathname_len));

bridge_fn!(socketpair(domain: i32, ty: i32, protocol: i32) -> Result<[i32; 2], i32> =>
	|call| ocall_codec::net::socketpair(call, domain, ty, protocol));

bridge_fn!(listen(domain: i32, ty: i32, protocol: i32, addr: *mut u8, addrlen: u32, sockopt: SockOpt) -> i32 =>
	|call| ocall_codec::net::listen(call, domain, ty, protocol, addr, addrlen, sockopt));

bridge_fn!(accept(sockfd: i32, addr: *mut u8, addrlen: u32, sockopt: SockOpt) -> i32 =>
	|call| ocall_codec::net::accept(call, sockfd, addr, addrlen, sockopt));

pub fn connect<M: MemoryPartition, B: Backstop>(
	bridge: &OcallBridge<M, B>,
	scratch: &ScratchAllocator,
	domain: i32,
	ty: i32,
	protocol: i32,
	addr: *const u8,
	addrlen: u32,
	bind_addr: *mut u8,
	bind_addrlen: u32,
	sockopt: SockOpt,
) -> i32 {
	bridge.with_call(scratch, |call| {
		ocall_codec::net::connect(call, domain, ty, protocol, addr, addrlen, bind_addr, bind_addrlen, sockopt)
	})
}

pub fn recv<M: MemoryPartition, B: Backstop>(
	bridge: &OcallBridge<M, B>,
	scratch: &ScratchAllocator,
	sockfd: i32,
	buf: *mut u8,
	count: usize,
	addr: *mut u8,
	addrlen: u32,
	control: *mut u8,
	controllen: u64,
) -> i32 {
	bridge.with_call(scratch, |call| {
		ocall_codec::net::recv(call, sockfd, buf, count, addr, addrlen, control, controllen)
	})
}

pub fn send<M: MemoryPartition, B: Backstop>(
	bridge: &OcallBridge<M, B>,
	scratch: &ScratchAllocator,
	sockfd: i32,
	buf: *const u8,
	count: usize,
	addr: *const u8,
	addrlen: u32,
	control: *const u8,
	controllen: u64,
) -> i32 {
	bridge.with_call(scratch, |call| {
		ocall_codec::net::send(call, sockfd, buf, count, addr, addrlen, control, controllen)
	})
}

bridge_fn!(setsockopt(sockfd: i32, level: i32, optname: i32, optval: *const u8, optlen: u32) -> i32 =>
	|call| ocall_codec::net::setsockopt(call, sockfd, level, optname, optval, optlen));

bridge_fn!(shutdown(sockfd: i32, how: i32) -> i32 => |call| ocall_codec::net::shutdown(call, sockfd, how));

bridge_fn!(gettime() -> Result<u64, i32> => |call| ocall_codec::time::gettime(call));

pub fn sleep<M: MemoryPartition, B: Backstop>(
	bridge: &OcallBridge<M, B>,
	scratch: &ScratchAllocator,
	microsec: &mut u64,
) -> i32 {
	bridge.with_call(scratch, |call| ocall_codec::time::sleep(call, microsec))
}

bridge_fn!(poll(fds: *mut u8, fds_len: usize, nfds: i32, timeout_us: i64) -> i32 =>
	|call| ocall_codec::time::poll(call, fds, fds_len, nfds, timeout_us));

bridge_fn!(resume_thread(tcs: *mut u8) -> i32 => |call| ocall_codec::proc::resume_thread(call, tcs));

bridge_fn!(clone_thread() -> i32 => |call| ocall_codec::proc::clone_thread(call));

bridge_fn!(load_debug(command: *const u8, command_len: usize) -> i32 =>
	|call| ocall_codec::proc::load_debug(call, command, command_len));

bridge_fn!(eventfd(initval: u32, flags: i32) -> i32 => |call| ocall_codec::proc::eventfd(call, initval, flags));

bridge_fn!(cpuid(leaf: u32, subleaf: u32) -> Result<[u32; 4], i32> =>
	|call| ocall_codec::cpuid(call, leaf, subleaf));

pub fn create_process<M: MemoryPartition, B: Backstop>(
	bridge: &OcallBridge<M, B>,
	scratch: &ScratchAllocator,
	uri: *const u8,
	uri_len: usize,
	args: &[(*const u8, usize)],
) -> Result<(u32, [i32; 3]), i32> {
	bridge.with_call(scratch, |call| ocall_codec::proc::create_process(call, uri, uri_len, args))
}

#[allow(clippy::too_many_arguments)]
pub fn get_attestation<M: MemoryPartition, B: Backstop>(
	bridge: &OcallBridge<M, B>,
	scratch: &ScratchAllocator,
	spid: [u8; 16],
	subkey: *const u8,
	subkey_len: usize,
	linkable: bool,
	nonce: [u8; 16],
) -> Result<EnclaveAttestation, i32> {
	bridge.with_call(scratch, |call| {
		attestation_marshaller::get_attestation(call, spid, subkey, subkey_len, linkable, nonce)
	})
}

/// `exit(exitcode, is_exitgroup)`. Always the Backstop directly (never deferred, per §4.6), and
/// re-issued in an unbounded loop — this function therefore never returns.
pub fn exit<M: MemoryPartition, B: Backstop>(bridge: &OcallBridge<M, B>, exitcode: i32, is_exitgroup: bool) -> ! {
	let mut msg = ocall_types::MsOcallExit { exitcode, is_exitgroup: is_exitgroup as i32 };
	ocall_dispatch::ocall_exit(bridge.backstop_ref(), &mut msg as *mut _ as *mut u8)
}
