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

//! Marshalling for the remote-attestation OCALL: a fixed-size quoting-enclave report plus up to
//! four variable-length host-owned buffers (quote, IAS report, IAS signature, IAS certificate
//! chain).
//!
//! Deliberately preserves one quirk of the bridge this is modeled on, documented rather than
//! "fixed": if an individual field copy fails partway through, the remaining fields are still
//! copied (or attempted), and only at the end are all enclave-side allocations so far released
//! and the call reported failed. The final error code is therefore whichever field failed last,
//! not the first.

use enclave_boundary::MemoryPartition;
use ocall_codec::{munmap_untrusted, Call};
use ocall_types::{errno, EnclaveAttestation, MsOcallGetAttestation, OcallCode, QuotingEnclaveReport};

/// One of the four variable-length fields of the attestation result.
struct VarField {
	host_ptr: *mut u8,
	host_len: usize,
	/// `true` for the two text fields (IAS report, IAS certs), which get NUL-terminated and an
	/// extra byte of enclave-side allocation for it.
	is_text: bool,
}

/// Request remote attestation and marshal the composite result back into enclave-owned memory.
///
/// On any per-field copy failure, all enclave-side buffers allocated during this call are freed
/// and `Err(-EACCES)` is returned, per the preserved invariant above — even though later fields
/// were still attempted after the first failure.
pub fn get_attestation<M: MemoryPartition>(
	call: &Call<'_, M>,
	spid: [u8; 16],
	subkey: *const u8,
	subkey_len: usize,
	linkable: bool,
	nonce: [u8; 16],
) -> Result<EnclaveAttestation, i32> {
	let _guard = call.scratch.guard();
	let subkey_host = call.copy_in_opt(Some((subkey, subkey_len)))?;
	let msg_ptr = call.alloc_msg::<MsOcallGetAttestation>()?;
	unsafe {
		msg_ptr.write(MsOcallGetAttestation {
			spid,
			subkey: subkey_host,
			subkey_len,
			linkable,
			report: [0; 432],
			nonce,
			attestation: ocall_types::AttestationResult::default(),
		});
	}
	let r = call.dispatch(OcallCode::GetAttestation, msg_ptr as *mut u8);
	if r < 0 {
		return Err(r);
	}

	// Step 1: copy the fixed header.
	let attestation = unsafe { (*msg_ptr).attestation };
	let mut qe_report = QuotingEnclaveReport::default();
	let qe_report_host = unsafe { (*msg_ptr).report };
	qe_report.bytes.copy_from_slice(&qe_report_host);

	// Step 2: scratch holding the fixed message is no longer needed for the variable buffers,
	// which live in host heap, not scratch — nothing to reset here beyond the caller's own
	// scratch-guard discipline around this whole call.

	let fields = [
		VarField { host_ptr: attestation.quote, host_len: attestation.quote_len, is_text: false },
		VarField { host_ptr: attestation.ias_report, host_len: attestation.ias_report_len, is_text: true },
		VarField { host_ptr: attestation.ias_sig, host_len: attestation.ias_sig_len, is_text: false },
		VarField { host_ptr: attestation.ias_certs, host_len: attestation.ias_certs_len, is_text: true },
	];

	let mut out: [Option<Vec<u8>>; 4] = [None, None, None, None];
	let mut failed = false;

	for (i, field) in fields.iter().enumerate() {
		if field.host_len == 0 {
			continue;
		}
		let alloc_len = if field.is_text { field.host_len + 1 } else { field.host_len };
		let mut buf = vec![0u8; alloc_len];
		let copied = call.boundary.copy_host_into_owned(buf.as_mut_ptr(), field.host_ptr, field.host_len);
		if !copied {
			failed = true;
		} else {
			if field.is_text {
				buf[field.host_len] = 0;
			}
			out[i] = Some(buf);
		}
		// Per the preserved invariant, attempt every field's host mapping release regardless of
		// this field's outcome.
		let _ = munmap_untrusted(call, field.host_ptr, field.host_len as u64);
	}

	if failed {
		// Free every enclave-side buffer allocated so far; `out`'s `Vec`s drop here.
		drop(out);
		return Err(-errno::EACCES);
	}

	let [quote, ias_report, ias_sig, ias_certs] = out;
	Ok(EnclaveAttestation { qe_report, quote, ias_report, ias_sig, ias_certs })
}

#[cfg(test)]
mod tests {
	use super::*;
	use enclave_boundary::sim::SimPartition;
	use enclave_boundary::{Boundary, ScratchAllocator};
	use ocall_dispatch::sim::SimBackstop;
	use ocall_dispatch::{BridgeConfig, ExitlessDispatcher};
	use ocall_types::AttestationResult;

	const SCRATCH_CAP: usize = 16 * 1024;
	const HOST_ARENA: usize = 256 * 1024;
	const ENCLAVE_ARENA: usize = 64 * 1024;

	struct Fixture {
		sim: SimPartition,
		scratch: ScratchAllocator,
	}

	impl Fixture {
		fn new() -> Self {
			let sim = SimPartition::new(ENCLAVE_ARENA, HOST_ARENA);
			let scratch = unsafe { ScratchAllocator::new(sim.host_ptr(), SCRATCH_CAP) };
			Fixture { sim, scratch }
		}

		fn boundary(&self) -> Boundary<'_, SimPartition> {
			Boundary::new(&self.sim)
		}

		fn host_region(&self, offset: usize) -> *mut u8 {
			unsafe { self.sim.host_ptr().add(SCRATCH_CAP + offset) }
		}
	}

	#[test]
	fn get_attestation_returns_enclave_owned_nul_terminated_buffers() {
		let fixture = Fixture::new();

		let quote = vec![0x11u8; 64];
		let ias_report = vec![b'r'; 256];
		let ias_sig = vec![0x22u8; 128];
		let ias_certs = vec![b'c'; 512];

		let quote_host = fixture.host_region(0);
		let ias_report_host = fixture.host_region(4096);
		let ias_sig_host = fixture.host_region(8192);
		let ias_certs_host = fixture.host_region(12288);
		unsafe {
			core::ptr::copy_nonoverlapping(quote.as_ptr(), quote_host, quote.len());
			core::ptr::copy_nonoverlapping(ias_report.as_ptr(), ias_report_host, ias_report.len());
			core::ptr::copy_nonoverlapping(ias_sig.as_ptr(), ias_sig_host, ias_sig.len());
			core::ptr::copy_nonoverlapping(ias_certs.as_ptr(), ias_certs_host, ias_certs.len());
		}

		let backstop = SimBackstop::new(move |code, msg| match code {
			ocall_types::OcallCode::GetAttestation => {
				let msg = msg as *mut MsOcallGetAttestation;
				unsafe {
					(*msg).attestation = AttestationResult {
						qe_report: ocall_types::QuotingEnclaveReport::default(),
						quote: quote_host,
						quote_len: 64,
						ias_report: ias_report_host,
						ias_report_len: 256,
						ias_sig: ias_sig_host,
						ias_sig_len: 128,
						ias_certs: ias_certs_host,
						ias_certs_len: 512,
					};
				}
				0
			}
			ocall_types::OcallCode::MunmapUntrusted => 0,
			_ => -errno::EINVAL,
		});

		let dispatcher = ExitlessDispatcher::new(&backstop, BridgeConfig::default());
		let call = Call::new(fixture.boundary(), &fixture.scratch, &dispatcher);

		let mark = fixture.scratch.mark();
		let result = get_attestation(&call, [0u8; 16], core::ptr::null(), 0, false, [0u8; 16]).unwrap();

		assert_eq!(result.quote.as_ref().unwrap().len(), 64);
		let report = result.ias_report.unwrap();
		assert_eq!(report.len(), 257);
		assert_eq!(*report.last().unwrap(), 0);
		assert_eq!(result.ias_sig.as_ref().unwrap().len(), 128);
		let certs = result.ias_certs.unwrap();
		assert_eq!(certs.len(), 513);
		assert_eq!(*certs.last().unwrap(), 0);
		assert_eq!(fixture.scratch.used(), mark);
	}
}
