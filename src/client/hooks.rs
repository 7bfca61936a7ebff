//! Post-request hook.

/// Invoked once after every request, whatever its outcome.
///
/// Embedders use it to trim allocator caches or similar bookkeeping once a
/// large body has been dropped. The default does nothing.
pub trait MemoryHook: Send + Sync {
    fn after_request(&self);
}

/// Hook that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl MemoryHook for NoopHook {
    fn after_request(&self) {}
}

impl<F> MemoryHook for F
where
    F: Fn() + Send + Sync,
{
    fn after_request(&self) {
        self()
    }
}
