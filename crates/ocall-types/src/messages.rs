//! Per-OCALL message layouts.
//!
//! Each of these mirrors one `ms_ocall_*_t` struct of the original C bridge: scalar inputs by
//! value, buffer inputs/outputs by raw pointer into untrusted scratch (or an oversize host
//! mapping), and host-writeable return fields. They are plain `#[repr(C)]` data — nothing here
//! decides anything; `ocall-codec` is the only crate that constructs, populates and reads them.
//!
//! Pointer fields always point into the host region H once populated; see `enclave-boundary`
//! for the containment checks that must hold before a pointer field may be trusted.

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallMmapUntrusted {
	pub fd: i32,
	pub offset: u64,
	pub size: u64,
	pub prot: u16,
	pub mem: *mut u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallMunmapUntrusted {
	pub mem: *mut u8,
	pub size: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MsOcallCpuid {
	pub leaf: u32,
	pub subleaf: u32,
	pub values: [u32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallOpen {
	pub flags: i32,
	pub mode: u16,
	pub pathname: *const u8,
	pub pathname_len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallClose {
	pub fd: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallRead {
	pub fd: i32,
	pub count: u32,
	pub buf: *mut u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallWrite {
	pub fd: i32,
	pub count: u32,
	pub buf: *const u8,
}

/// Deliberately not the full POSIX `struct stat`: only the fields any OCALL consumer in this
/// repository needs. Real embeddings can widen this without touching the marshalling discipline.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
	pub size: u64,
	pub mode: u32,
	pub mtime_secs: i64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallFstat {
	pub fd: i32,
	pub stat: FileStat,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallFionread {
	pub fd: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallFsetnonblock {
	pub fd: i32,
	pub nonblocking: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallFchmod {
	pub fd: i32,
	pub mode: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallFsync {
	pub fd: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallFtruncate {
	pub fd: i32,
	pub length: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallLseek {
	pub fd: i32,
	pub offset: u64,
	pub whence: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallMkdir {
	pub mode: u16,
	pub pathname: *const u8,
	pub pathname_len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallGetdents {
	pub fd: i32,
	pub size: u32,
	pub dirp: *mut u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallCreateProcess {
	pub uri: *const u8,
	pub uri_len: usize,
	pub nargs: i32,
	/// Pointer to `nargs` `*const u8` entries, each itself pointing into scratch.
	pub args: *const *const u8,
	pub pid: u32,
	pub proc_fds: [i32; 3],
}

/// The futex request itself crosses via the Backstop, not the exitless queue — see
/// `ocall-dispatch::ExitlessDispatcher`, which constructs this directly rather than going
/// through `ocall-codec`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallFutex {
	pub futex: *mut u32,
	pub op: i32,
	pub val: u32,
	pub timeout_us: i64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MsOcallSocketpair {
	pub domain: i32,
	pub ty: i32,
	pub protocol: i32,
	pub sockfds: [i32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SockOpt {
	pub bits: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallListen {
	pub domain: i32,
	pub ty: i32,
	pub protocol: i32,
	pub addrlen: u32,
	pub addr: *mut u8,
	pub sockopt: SockOpt,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallAccept {
	pub sockfd: i32,
	pub addrlen: u32,
	pub addr: *mut u8,
	pub sockopt: SockOpt,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallConnect {
	pub domain: i32,
	pub ty: i32,
	pub protocol: i32,
	pub addrlen: u32,
	pub bind_addrlen: u32,
	pub addr: *const u8,
	pub bind_addr: *mut u8,
	pub sockopt: SockOpt,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallRecv {
	pub sockfd: i32,
	pub count: u32,
	pub addrlen: u32,
	pub controllen: u64,
	pub buf: *mut u8,
	pub addr: *mut u8,
	pub control: *mut u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallSend {
	pub sockfd: i32,
	pub count: u32,
	pub addrlen: u32,
	pub controllen: u64,
	pub buf: *const u8,
	pub addr: *const u8,
	pub control: *const u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallSetsockopt {
	pub sockfd: i32,
	pub level: i32,
	pub optname: i32,
	pub optlen: u32,
	pub optval: *const u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallShutdown {
	pub sockfd: i32,
	pub how: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MsOcallGettime {
	pub microsec: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MsOcallSleep {
	pub microsec: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallPoll {
	pub nfds: i32,
	pub timeout_us: i64,
	pub fds: *mut u8,
	pub fds_len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallRename {
	pub oldpath: *const u8,
	pub oldpath_len: usize,
	pub newpath: *const u8,
	pub newpath_len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallDelete {
	pub pathname: *const u8,
	pub pathname_len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallEventfd {
	pub initval: u32,
	pub flags: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallExit {
	pub exitcode: i32,
	pub is_exitgroup: i32,
}

/// Fixed-size part of the attestation result: everything but the four variable-length buffers
/// handled separately by `attestation-marshaller`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotingEnclaveReport {
	pub bytes: [u8; 432],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AttestationResult {
	pub qe_report: QuotingEnclaveReport,
	pub quote: *mut u8,
	pub quote_len: usize,
	pub ias_report: *mut u8,
	pub ias_report_len: usize,
	pub ias_sig: *mut u8,
	pub ias_sig_len: usize,
	pub ias_certs: *mut u8,
	pub ias_certs_len: usize,
}

impl Default for AttestationResult {
	fn default() -> Self {
		AttestationResult {
			qe_report: QuotingEnclaveReport::default(),
			quote: core::ptr::null_mut(),
			quote_len: 0,
			ias_report: core::ptr::null_mut(),
			ias_report_len: 0,
			ias_sig: core::ptr::null_mut(),
			ias_sig_len: 0,
			ias_certs: core::ptr::null_mut(),
			ias_certs_len: 0,
		}
	}
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsOcallGetAttestation {
	pub spid: [u8; 16],
	pub subkey: *const u8,
	pub subkey_len: usize,
	pub linkable: bool,
	pub report: [u8; 432],
	pub nonce: [u8; 16],
	pub attestation: AttestationResult,
}

/// Enclave-resident counterpart of [`AttestationResult`] returned to application code: every
/// pointer, once `attestation-marshaller` is done, points into E, not H.
#[derive(Debug)]
pub struct EnclaveAttestation {
	pub qe_report: QuotingEnclaveReport,
	pub quote: Option<Vec<u8>>,
	pub ias_report: Option<Vec<u8>>,
	pub ias_sig: Option<Vec<u8>>,
	pub ias_certs: Option<Vec<u8>>,
}
