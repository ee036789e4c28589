/// Tunables for the bridge, fixed once at construction. No files, environment variables, or CLI
/// parsing — this is an in-process mechanism, not a standalone service.
#[derive(Debug, Clone, Copy)]
pub struct BridgeConfig {
	/// Per-call scratch budget; payloads whose total size would exceed this move to an oversize
	/// host mapping instead. Defaults to `enclave_boundary::MAX_SCRATCH`.
	pub max_scratch: usize,
	/// Spin budget, in iterations, before the producer gives up phase 1 and moves to the
	/// CAS-to-waiters / futex-wait phase of the Exitless Dispatcher.
	pub t_spin: u32,
	/// Ring capacity of the RPC queue. Irrelevant when no queue is installed (always
	/// synchronous).
	pub queue_capacity: usize,
}

/// Matches the spin budget used by comparable exitless designs for a single cache-line CAS loop:
/// enough iterations to absorb a worker that is already mid-syscall without paying for a kernel
/// wait, not so many that a genuinely synchronous-bound caller stalls needlessly.
const DEFAULT_T_SPIN: u32 = 4096;

const DEFAULT_QUEUE_CAPACITY: usize = 256;

impl Default for BridgeConfig {
	fn default() -> Self {
		BridgeConfig {
			max_scratch: enclave_boundary::MAX_SCRATCH,
			t_spin: DEFAULT_T_SPIN,
			queue_capacity: DEFAULT_QUEUE_CAPACITY,
		}
	}
}

impl BridgeConfig {
	pub fn new(max_scratch: usize, t_spin: u32, queue_capacity: usize) -> Self {
		BridgeConfig { max_scratch, t_spin, queue_capacity }
	}
}
