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

//! The Synchronous OCALL Backstop and the Exitless Dispatcher that sits on top of it.

mod backstop;
mod config;
mod dispatcher;

pub use backstop::sim;
#[cfg(feature = "sgx")]
pub use backstop::sgx_ffi;
pub use backstop::Backstop;
pub use config::BridgeConfig;
pub use dispatcher::{install_queue, ocall_exit, queue, ExitlessDispatcher};

#[cfg(test)]
mod tests {
	use super::*;
	use enclave_boundary::ScratchAllocator;
	use ocall_types::OcallCode;
	use std::sync::atomic::{AtomicI32, Ordering};
	use std::sync::Arc;

	fn scratch(capacity: usize) -> (Vec<u8>, ScratchAllocator) {
		let mut storage = vec![0u8; capacity];
		let alloc = unsafe { ScratchAllocator::new(storage.as_mut_ptr(), storage.len()) };
		(storage, alloc)
	}

	#[test]
	fn falls_back_to_backstop_when_no_queue_installed() {
		let calls = Arc::new(AtomicI32::new(0));
		let calls_clone = calls.clone();
		let backstop = sim::SimBackstop::new(move |_code, _msg| {
			calls_clone.fetch_add(1, Ordering::SeqCst);
			42
		});
		let dispatcher = ExitlessDispatcher::new(&backstop, BridgeConfig::default());
		let (_storage, alloc) = scratch(256);
		let mut payload = 0u8;
		let r = dispatcher.dispatch(OcallCode::Close, &mut payload as *mut u8, &alloc);
		assert_eq!(r, 42);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn ocall_exit_never_returns_is_not_directly_testable_but_backstop_is_reissued() {
		// `ocall_exit` itself loops forever by construction (`-> !`), so it cannot be called in a
		// test without hanging. We instead confirm the Backstop it drives is invoked exactly the
		// way `ocall_exit` would invoke it, for each of several calls, proving re-issuance would
		// keep working rather than panicking or short-circuiting after the first call.
		let calls = Arc::new(AtomicI32::new(0));
		let calls_clone = calls.clone();
		let backstop = sim::SimBackstop::new(move |code, _msg| {
			assert_eq!(code, OcallCode::Exit);
			calls_clone.fetch_add(1, Ordering::SeqCst);
			0
		});
		let mut payload = 0u8;
		for _ in 0..3 {
			backstop.ocall(OcallCode::Exit, &mut payload as *mut u8);
		}
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}
}
