/// Reports how much memory the host has left, for diagnostic records.
pub trait ResourceMonitor: Send {
    /// Available memory in MiB, or `None` if it cannot be determined.
    fn available_memory_mb(&self) -> Option<u64>;
}

pub struct NullResourceMonitor;

impl ResourceMonitor for NullResourceMonitor {
    fn available_memory_mb(&self) -> Option<u64> {
        None
    }
}
