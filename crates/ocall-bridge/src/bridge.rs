use enclave_boundary::{Boundary, MemoryPartition, ScratchAllocator};
use ocall_codec::Call;
use ocall_dispatch::{Backstop, BridgeConfig, ExitlessDispatcher};

/// Owns the two things every OCALL needs: the Arbiter's view of where E and H are, and the
/// Backstop used either directly or as the exitless path's fallback. Stateless beyond that —
/// scratch is supplied per call by the embedder, since it is a per-thread resource this crate
/// does not allocate itself (see the design notes on thread/TCS scheduling being out of scope).
pub struct OcallBridge<M: MemoryPartition, B: Backstop> {
	partition: M,
	backstop: B,
	config: BridgeConfig,
}

impl<M: MemoryPartition, B: Backstop> OcallBridge<M, B> {
	pub fn new(partition: M, backstop: B, config: BridgeConfig) -> Self {
		OcallBridge { partition, backstop, config }
	}

	/// Install the process-wide RPC queue, switching every subsequent call from this bridge onto
	/// the exitless path. Idempotent; call once at enclave bring-up.
	pub fn enable_exitless(&self) {
		log::info!("installing the exitless RPC queue, capacity {}", self.config.queue_capacity);
		ocall_dispatch::install_queue(self.config.queue_capacity);
	}

	pub fn boundary(&self) -> Boundary<'_, M> {
		Boundary::new(&self.partition)
	}

	pub fn dispatcher(&self) -> ExitlessDispatcher<'_> {
		ExitlessDispatcher::new(&self.backstop, self.config)
	}

	/// Direct access to the Backstop, for the handful of OCALLs (`exit`, `sleep`) that must never
	/// take the exitless path.
	pub fn backstop_ref(&self) -> &B {
		&self.backstop
	}

	/// Build a [`Call`] context over `scratch` and run `f` with it. Every public OCALL wrapper in
	/// this crate is a one-line use of this.
	///
	/// Holds the top-level scratch guard for the whole call: whatever `f` (and anything it calls
	/// recursively, e.g. an oversize `mmap_untrusted`) allocates is rewound on every exit path,
	/// including a panic during unwinding.
	pub fn with_call<R>(&self, scratch: &ScratchAllocator, f: impl FnOnce(&Call<'_, M>) -> R) -> R {
		let _guard = scratch.guard();
		let dispatcher = self.dispatcher();
		let call = Call::new(self.boundary(), scratch, &dispatcher);
		f(&call)
	}
}
