//! The small slice of the errno space this bridge passes through verbatim.
//!
//! The bridge never invents error codes of its own beyond what §7 of the design calls for; it
//! either passes through whatever the host reported or, for its own containment failures, picks
//! one of these.

pub const EPERM: i32 = 1;
pub const EINTR: i32 = 4;
pub const EAGAIN: i32 = 11;
pub const EINVAL: i32 = 22;
pub const EACCES: i32 = 13;
