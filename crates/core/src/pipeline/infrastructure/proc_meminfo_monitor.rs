use std::fs;
use std::path::PathBuf;

use crate::pipeline::resource_monitor::ResourceMonitor;

const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";

/// Reads `MemAvailable` from a Linux `/proc/meminfo`-format file.
///
/// On other platforms the file does not exist and every query returns `None`.
pub struct ProcMeminfoMonitor {
    path: PathBuf,
}

impl ProcMeminfoMonitor {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_MEMINFO_PATH)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcMeminfoMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceMonitor for ProcMeminfoMonitor {
    fn available_memory_mb(&self) -> Option<u64> {
        let contents = fs::read_to_string(&self.path).ok()?;
        parse_mem_available_kb(&contents).map(|kb| kb / 1024)
    }
}

fn parse_mem_available_kb(contents: &str) -> Option<u64> {
    contents.lines().find_map(|line| {
        let rest = line.strip_prefix("MemAvailable:")?;
        rest.split_whitespace().next()?.parse().ok()
    })
}
