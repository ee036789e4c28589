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

//! The Request Codec: one marshaller/unmarshaller per OCALL kind, built entirely on top of
//! [`enclave_boundary`]'s Arbiter/scratch and [`ocall_dispatch`]'s Exitless Dispatcher.
//!
//! Nothing in this crate touches a raw pointer without going through [`context::Call`] — that is
//! what makes the per-OCALL functions below readable as marshalling logic instead of pointer
//! arithmetic.

mod context;
pub mod fs;
mod mem;
pub mod net;
pub mod proc;
pub mod time;

#[cfg(test)]
mod tests;

pub use context::Call;
pub use mem::{cpuid, mmap_untrusted, munmap_untrusted};
