use ocall_types::OcallCode;

/// The Synchronous OCALL Backstop: a privileged enclave exit that hands `(code, msg)` to a
/// host-side trampoline and returns the integer result on re-entry.
///
/// This is the only trait in the bridge that is allowed to trust the platform's exit/entry
/// mechanism. Production code implements it against the real SGX `EEXIT`/`EENTER` sequence (see
/// [`sgx_ffi::SgxBackstop`] behind the `sgx` feature); tests and non-hardware embeddings implement
/// it in-process (see [`sim::SimBackstop`]).
pub trait Backstop: Send + Sync {
	/// `msg` points to the per-OCALL message struct already marshalled into scratch or an
	/// oversize host mapping. Always suspends the calling thread until the host replies.
	fn ocall(&self, code: OcallCode, msg: *mut u8) -> i32;
}

#[cfg(feature = "sgx")]
pub mod sgx_ffi {
	use super::Backstop;
	use ocall_types::OcallCode;
	use sgx_types::sgx_status_t;

	extern "C" {
		/// The real enclave-exit primitive. Declared `extern "C"` because it is provided by the
		/// enclave runtime's edge routines, not implemented in Rust.
		fn sgx_ocall(code: u32, msg: *mut u8) -> sgx_status_t;
	}

	/// Backstop backed by a genuine SGX enclave exit.
	pub struct SgxBackstop;

	impl Backstop for SgxBackstop {
		fn ocall(&self, code: OcallCode, msg: *mut u8) -> i32 {
			// SAFETY: `msg` is caller-provided and already validated by the marshaller; the
			// edge routine's calling convention is fixed by the enclave runtime.
			let status = unsafe { sgx_ocall(code as u32, msg) };
			if status == sgx_status_t::SGX_SUCCESS {
				0
			} else {
				-1
			}
		}
	}
}

pub mod sim {
	use super::Backstop;
	use ocall_types::OcallCode;
	use std::sync::Mutex;

	/// In-process stand-in for the Backstop, used by tests and the `host-sim` embedding. Each
	/// OCALL code is serviced by a boxed closure supplied by the test, so a "faked host that
	/// echoes" can be assembled without any real enclave hardware.
	pub struct SimBackstop {
		handler: Mutex<Box<dyn FnMut(OcallCode, *mut u8) -> i32 + Send>>,
	}

	impl SimBackstop {
		pub fn new<F>(handler: F) -> Self
		where
			F: FnMut(OcallCode, *mut u8) -> i32 + Send + 'static,
		{
			SimBackstop { handler: Mutex::new(Box::new(handler)) }
		}
	}

	impl Backstop for SimBackstop {
		fn ocall(&self, code: OcallCode, msg: *mut u8) -> i32 {
			let mut handler = self.handler.lock().expect("sim backstop poisoned");
			(handler)(code, msg)
		}
	}
}
