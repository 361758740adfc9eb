//! Grows the native stack for deep user recursion, so the call-depth
//! limit is what stops a runaway program.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 256 * 1024;

/// Size of each newly allocated segment.
const STACK_PER_CALL: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_CALL, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
