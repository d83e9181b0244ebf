use std::collections::HashSet;

use thiserror::Error;
use tracing::{info, warn};

use crate::metrics::rate::{RateCalculator, RatePoint, ResetPolicy};
use crate::metrics::registry::{Channel, EntityClass};

/// A counter read that failed for one resource class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("reading {context} counters: {message}")]
    Read {
        context: &'static str,
        message: String,
    },
    #[error("{0} counters are not available on this platform")]
    Unsupported(&'static str),
}

impl SourceError {
    pub fn read(context: &'static str, err: &std::io::Error) -> Self {
        SourceError::Read {
            context,
            message: err.to_string(),
        }
    }

    /// Stable key for once-per-onset warn logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Read { context, .. } => context,
            SourceError::Unsupported(context) => context,
        }
    }
}

/// Raw cumulative counters for one CPU core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuCounters {
    pub core_id: usize,
    pub busy_ticks: u64,
    pub idle_ticks: u64,
}

/// Raw cumulative counters for one disk device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskCounters {
    pub device: String,
    pub read_ops: u64,
    pub write_ops: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Raw cumulative counters for one network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetCounters {
    pub interface: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCounters {
    pub total: u64,
    pub used: u64,
}

/// Everything one sampling tick read from the OS. Classes fail
/// independently so a dead disk read cannot take the CPU chart with it.
#[derive(Debug)]
pub struct CounterBatch {
    pub at_secs: f64,
    pub cpus: Result<Vec<CpuCounters>, SourceError>,
    pub disks: Result<Vec<DiskCounters>, SourceError>,
    pub networks: Result<Vec<NetCounters>, SourceError>,
    pub memory: Option<MemoryCounters>,
}

/// Boundary to the OS: produces one snapshot of raw counters per call.
pub trait CounterSource: Send {
    fn sample(&mut self) -> CounterBatch;
}

/// One rate ready to append to a registry buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledRate {
    pub entity: String,
    pub class: EntityClass,
    pub channel: Channel,
    pub point: RatePoint,
}

/// The output of one sampling tick, sent to the registry owner.
#[derive(Debug, Default)]
pub struct TickSummary {
    pub at_secs: f64,
    /// Every instance observed this tick, whether or not it produced a
    /// rate yet. Registration must happen before any append.
    pub seen: Vec<(String, EntityClass)>,
    pub rates: Vec<SampledRate>,
    pub memory: Option<MemoryCounters>,
    /// Cumulative byte totals across all disks, for the status bar.
    pub disk_read_total: u64,
    pub disk_write_total: u64,
}

/// Drives the rate pipeline: reads a counter batch from the source, turns
/// counters into rates and packages the result for the registry owner.
///
/// A failed class read degrades to "those entities stop advancing"; it is
/// logged at warn once when the failure starts, then muted until the class
/// recovers.
pub struct SampleCollector {
    source: Box<dyn CounterSource>,
    rates: RateCalculator,
    failing: HashSet<&'static str>,
}

impl SampleCollector {
    pub fn new(source: Box<dyn CounterSource>, policy: ResetPolicy) -> Self {
        Self {
            source,
            rates: RateCalculator::new(policy),
            failing: HashSet::new(),
        }
    }

    pub fn tick(&mut self) -> TickSummary {
        let batch = self.source.sample();
        let at = batch.at_secs;
        let mut summary = TickSummary {
            at_secs: at,
            memory: batch.memory,
            ..TickSummary::default()
        };

        match batch.cpus {
            Ok(cpus) => {
                self.note_recovery("cpu");
                for cpu in &cpus {
                    let key = format!("cpu{}", cpu.core_id);
                    summary.seen.push((key.clone(), EntityClass::Cpu));
                    let busy = self.rates.compute(&key, "busy", at, cpu.busy_ticks);
                    let idle = self.rates.compute(&key, "idle", at, cpu.idle_ticks);
                    if let (Some(busy), Some(idle)) = (busy, idle) {
                        let total = busy.value + idle.value;
                        if total > 0.0 {
                            summary.rates.push(SampledRate {
                                entity: key,
                                class: EntityClass::Cpu,
                                channel: Channel::Usage,
                                point: RatePoint {
                                    at_secs: at,
                                    value: 100.0 * busy.value / total,
                                },
                            });
                        }
                    }
                }
            }
            Err(e) => self.note_failure(&e),
        }

        match batch.disks {
            Ok(disks) => {
                self.note_recovery("disk");
                for disk in &disks {
                    summary.seen.push((disk.device.clone(), EntityClass::Disk));
                    summary.disk_read_total += disk.read_bytes;
                    summary.disk_write_total += disk.write_bytes;
                    self.push_rate(
                        &mut summary.rates,
                        &disk.device,
                        EntityClass::Disk,
                        Channel::Read,
                        "read_ops",
                        at,
                        disk.read_ops,
                    );
                    self.push_rate(
                        &mut summary.rates,
                        &disk.device,
                        EntityClass::Disk,
                        Channel::Write,
                        "write_ops",
                        at,
                        disk.write_ops,
                    );
                }
            }
            Err(e) => self.note_failure(&e),
        }

        match batch.networks {
            Ok(nets) => {
                self.note_recovery("network");
                for net in &nets {
                    summary
                        .seen
                        .push((net.interface.clone(), EntityClass::Network));
                    self.push_rate(
                        &mut summary.rates,
                        &net.interface,
                        EntityClass::Network,
                        Channel::In,
                        "rx_bytes",
                        at,
                        net.rx_bytes,
                    );
                    self.push_rate(
                        &mut summary.rates,
                        &net.interface,
                        EntityClass::Network,
                        Channel::Out,
                        "tx_bytes",
                        at,
                        net.tx_bytes,
                    );
                }
            }
            Err(e) => self.note_failure(&e),
        }

        summary
    }

    #[allow(clippy::too_many_arguments)]
    fn push_rate(
        &mut self,
        rates: &mut Vec<SampledRate>,
        entity: &str,
        class: EntityClass,
        channel: Channel,
        counter: &'static str,
        at: f64,
        value: u64,
    ) {
        if let Some(point) = self.rates.compute(entity, counter, at, value) {
            rates.push(SampledRate {
                entity: entity.to_string(),
                class,
                channel,
                point: RatePoint {
                    at_secs: point.at_secs,
                    value: channel.scale(point.value),
                },
            });
        }
    }

    fn note_failure(&mut self, err: &SourceError) {
        if self.failing.insert(err.kind()) {
            warn!("counter read failed, freezing affected series: {err}");
        }
    }

    fn note_recovery(&mut self, kind: &'static str) {
        if self.failing.remove(kind) {
            info!("{kind} counters recovered");
        }
    }

    #[cfg(test)]
    fn is_failing(&self, kind: &str) -> bool {
        self.failing.contains(kind)
    }
}
