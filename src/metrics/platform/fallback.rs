use super::{CpuTicks, DiskIoCounters};
use crate::metrics::collector::SourceError;

pub fn cpu_ticks() -> Result<Vec<CpuTicks>, SourceError> {
    Err(SourceError::Unsupported("cpu"))
}

pub fn disk_counters() -> Result<Vec<DiskIoCounters>, SourceError> {
    Err(SourceError::Unsupported("disk"))
}
