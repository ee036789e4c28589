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

//! The trusted-side OCALL bridge: the facade that wires the Boundary Memory Arbiter, the
//! Untrusted Scratch Allocator, the RPC Queue, the Exitless Dispatcher, the Request Codec and
//! the Attestation Marshaller into one thing an enclave runtime can call OCALLs through.
//!
//! Nothing below the facade is re-exported unsafely: every function in [`ocalls`] takes plain
//! scalars and raw pointers already believed by the caller to be correctly scoped (enclave- or
//! host-resident as documented per parameter) and returns the same negated-errno `i32` contract
//! as the rest of this bridge.

mod bridge;
pub mod ocalls;

pub use bridge::OcallBridge;
pub use enclave_boundary::{MemoryPartition, ScratchAllocator, MAX_SCRATCH};
pub use ocall_dispatch::{Backstop, BridgeConfig};

#[cfg(test)]
mod tests;
