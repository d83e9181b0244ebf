//! Raw kernel counter readers. Linux reads procfs; other platforms report
//! the class as unavailable and the collector degrades gracefully.

use crate::metrics::collector::SourceError;

/// Cumulative scheduler ticks for one core, split into busy and idle time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTicks {
    pub core_id: usize,
    pub busy: u64,
    pub idle: u64,
}

/// Cumulative I/O counters for one whole-disk device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskIoCounters {
    pub device: String,
    pub reads: u64,
    pub writes: u64,
    pub read_bytes: u64,
    pub written_bytes: u64,
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod fallback;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use fallback as platform_impl;

pub fn cpu_ticks() -> Result<Vec<CpuTicks>, SourceError> {
    platform_impl::cpu_ticks()
}

pub fn disk_counters() -> Result<Vec<DiskIoCounters>, SourceError> {
    platform_impl::disk_counters()
}
