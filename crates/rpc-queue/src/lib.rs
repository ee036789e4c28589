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

//! The lock-free multi-producer multi-consumer queue and the three-state descriptor lock that
//! together let an enclave thread hand an OCALL to an untrusted worker without exiting.
//!
//! This crate knows nothing about OCALL semantics — it moves opaque `(ocall_index, buffer)`
//! pairs around. `ocall-dispatch` is the crate that gives those fields meaning.

mod descriptor;
mod lock;
mod queue;

pub use descriptor::RequestDescriptor;
pub use lock::{DescriptorLock, LOCKED_NO_WAITERS, LOCKED_WITH_WAITERS, UNLOCKED};
pub use queue::RpcQueue;
