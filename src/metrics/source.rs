use std::time::Instant;

use sysinfo::{Networks, System};

use crate::metrics::collector::{
    CounterBatch, CounterSource, CpuCounters, DiskCounters, MemoryCounters, NetCounters,
    SourceError,
};
use crate::metrics::platform;

/// Production counter source: CPU ticks and disk I/O from the kernel via
/// the platform module, interfaces and memory via sysinfo.
pub struct SystemCounterSource {
    networks: Networks,
    system: System,
    started: Instant,
}

impl Default for SystemCounterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCounterSource {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        Self {
            networks: Networks::new_with_refreshed_list(),
            system,
            started: Instant::now(),
        }
    }

    fn network_counters(&mut self) -> Result<Vec<NetCounters>, SourceError> {
        self.networks.refresh(true);
        let mut nets: Vec<NetCounters> = self
            .networks
            .list()
            .iter()
            .filter(|(name, _)| name.as_str() != "lo")
            .map(|(name, data)| NetCounters {
                interface: name.clone(),
                rx_bytes: data.total_received(),
                tx_bytes: data.total_transmitted(),
            })
            .collect();
        // Stable order keeps entity discovery (and palette assignment)
        // deterministic across runs.
        nets.sort_by(|a, b| a.interface.cmp(&b.interface));
        Ok(nets)
    }
}

impl CounterSource for SystemCounterSource {
    fn sample(&mut self) -> CounterBatch {
        let at_secs = self.started.elapsed().as_secs_f64();

        let cpus = platform::cpu_ticks().map(|ticks| {
            ticks
                .into_iter()
                .map(|t| CpuCounters {
                    core_id: t.core_id,
                    busy_ticks: t.busy,
                    idle_ticks: t.idle,
                })
                .collect()
        });

        let disks = platform::disk_counters().map(|counters| {
            counters
                .into_iter()
                .map(|d| DiskCounters {
                    device: d.device,
                    read_ops: d.reads,
                    write_ops: d.writes,
                    read_bytes: d.read_bytes,
                    write_bytes: d.written_bytes,
                })
                .collect()
        });

        let networks = self.network_counters();

        self.system.refresh_memory();
        let memory = Some(MemoryCounters {
            total: self.system.total_memory(),
            used: self.system.used_memory(),
        });

        CounterBatch {
            at_secs,
            cpus,
            disks,
            networks,
            memory,
        }
    }
}
