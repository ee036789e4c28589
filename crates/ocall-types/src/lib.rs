/*
	Copyright 2021 Integritee AG and Supercomputing Systems AG

	Licensed under the Apache License, Version 2.0 (the "License");
	you may not use this file except in compliance with the License.
	You may obtain a copy of the License at

		http://www.apache.org/licenses/LICENSE-2.0

	Unless required by applicable law or agreed to in writing, software
	distributed under the License is distributed on an "AS IS" BASIS,
	WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
	See the License for the specific language governing permissions and
	limitations under the License.

*/

//! Shared vocabulary for the trusted-side OCALL bridge.
//!
//! This crate defines nothing that can make a decision on its own: the [`OcallCode`]
//! enumeration, the per-kind message structs that travel through untrusted scratch memory,
//! and [`BridgeError`], the taxonomy every fallible operation in the bridge reports through.
//! The unsafe boundary-crossing logic lives in `enclave-boundary`, `rpc-queue`,
//! `ocall-dispatch` and `ocall-codec`.

#![cfg_attr(not(test), allow(dead_code))]

pub mod errno;
mod messages;

pub use messages::*;

use core::fmt;

/// Flat enumeration of every OCALL this bridge can dispatch.
///
/// Kept as a fieldless `#[repr(u16)]` enum so it round-trips through the `ocall_index` field of
/// a [`crate::RequestDescriptor`] (see `rpc-queue`) with no encoding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum OcallCode {
	Exit = 0,
	MmapUntrusted,
	MunmapUntrusted,
	Cpuid,
	Open,
	Close,
	Read,
	Write,
	Fstat,
	Fionread,
	Fsetnonblock,
	Fchmod,
	Fsync,
	Ftruncate,
	Lseek,
	Mkdir,
	Getdents,
	ResumeThread,
	CloneThread,
	CreateProcess,
	Futex,
	Socketpair,
	Listen,
	Accept,
	Connect,
	Recv,
	Send,
	Setsockopt,
	Shutdown,
	Gettime,
	Sleep,
	Poll,
	Rename,
	Delete,
	LoadDebug,
	GetAttestation,
	Eventfd,
}

impl fmt::Display for OcallCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

/// Why an OCALL failed before, during, or after crossing the trust boundary.
///
/// This is the bridge's *internal* fallible-operation type. Public OCALL wrappers never return
/// it directly: they collapse it to the negated-errno `i32` contract consumers expect (see
/// [`BridgeError::as_errno`]), matching how the original enclave OCALL wrappers are just
/// `int`-returning functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
	/// A caller-supplied pointer/length pair failed an Arbiter containment check.
	Containment,
	/// A buffer was neither fully inside the enclave nor fully inside the host.
	StraddlingBuffer,
	/// The untrusted scratch frame has no room left for this allocation.
	ScratchExhausted,
	/// The RPC queue had no free slot; callers should fall back to the synchronous Backstop.
	/// Never surfaced past the dispatcher — see §7 of the design: queue-full is not an error.
	QueueFull,
	/// The host-side worker (or the Backstop trampoline) reported a negative result.
	HostError(i32),
	/// The underlying operation was interrupted (`EINTR`) and may be retried by the caller.
	Interrupted,
	/// A dispatcher-internal wait primitive returned something other than success or `EAGAIN`.
	Unrecoverable,
}

impl BridgeError {
	/// Collapse to the negated-errno contract every public OCALL wrapper returns.
	pub fn as_errno(self) -> i32 {
		match self {
			BridgeError::Containment => -errno::EPERM,
			BridgeError::StraddlingBuffer => -errno::EPERM,
			BridgeError::ScratchExhausted => -errno::EPERM,
			BridgeError::QueueFull => -errno::EPERM, // unreachable in practice; dispatcher handles it
			BridgeError::HostError(e) => -e.unsigned_abs() as i32,
			BridgeError::Interrupted => -errno::EINTR,
			BridgeError::Unrecoverable => -errno::EPERM,
		}
	}
}

impl fmt::Display for BridgeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BridgeError::Containment => write!(f, "pointer/length failed containment check"),
			BridgeError::StraddlingBuffer => write!(f, "buffer straddles the enclave/host boundary"),
			BridgeError::ScratchExhausted => write!(f, "untrusted scratch frame exhausted"),
			BridgeError::QueueFull => write!(f, "RPC queue full"),
			BridgeError::HostError(e) => write!(f, "host reported error {e}"),
			BridgeError::Interrupted => write!(f, "interrupted (EINTR)"),
			BridgeError::Unrecoverable => write!(f, "unrecoverable dispatcher state"),
		}
	}
}

impl std::error::Error for BridgeError {}
