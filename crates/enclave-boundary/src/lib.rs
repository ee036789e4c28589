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

//! The boundary memory arbiter and the per-call untrusted scratch allocator.
//!
//! These two pieces are the only place in the bridge that touches raw pointers crossing the
//! enclave/host trust boundary. Everything above them (`ocall-codec`) is expressed in terms of
//! [`Boundary::copy_to_host`]/[`Boundary::copy_to_enclave`] and [`ScratchAllocator::alloc`], never
//! in terms of `ptr::copy_nonoverlapping` directly.

mod arbiter;
mod scratch;
pub mod sim;

pub use arbiter::{Boundary, MemoryPartition};
pub use scratch::{ScratchAllocator, ScratchGuard};

/// Per-call budget for untrusted stack scratch: 1/4 of the worker thread stack size, matching
/// the native bridge's `MAX_UNTRUSTED_STACK_BUF` (`THREAD_STACK_SIZE / 4`, THREAD_STACK_SIZE =
/// 2 MiB). Payloads past this move to an oversize host mapping (see `ocall-codec`).
pub const MAX_SCRATCH: usize = 512 * 1024;
