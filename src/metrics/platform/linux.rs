use super::{CpuTicks, DiskIoCounters};
use crate::metrics::collector::SourceError;

const SECTOR_SIZE: u64 = 512;

pub fn cpu_ticks() -> Result<Vec<CpuTicks>, SourceError> {
    let contents = std::fs::read_to_string("/proc/stat")
        .map_err(|e| SourceError::read("cpu", &e))?;
    Ok(parse_proc_stat(&contents))
}

pub fn disk_counters() -> Result<Vec<DiskIoCounters>, SourceError> {
    let contents = std::fs::read_to_string("/proc/diskstats")
        .map_err(|e| SourceError::read("disk", &e))?;
    Ok(parse_diskstats(&contents))
}

/// Parse per-core lines of /proc/stat ("cpu0 user nice system idle iowait
/// irq softirq steal ..."). The aggregate "cpu" line is skipped; busy time
/// is everything except idle and iowait.
fn parse_proc_stat(contents: &str) -> Vec<CpuTicks> {
    let mut cores = Vec::new();
    for line in contents.lines() {
        let Some(rest) = line.strip_prefix("cpu") else {
            continue;
        };
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            continue; // aggregate "cpu" line
        }
        let mut fields = rest.split_whitespace();
        let Some(core_id) = fields.next().and_then(|id| id.parse::<usize>().ok()) else {
            continue;
        };
        let ticks: Vec<u64> = fields.map(|f| f.parse().unwrap_or(0)).collect();
        if ticks.len() < 4 {
            continue;
        }
        let get = |i: usize| ticks.get(i).copied().unwrap_or(0);
        let idle = get(3) + get(4);
        let busy = get(0) + get(1) + get(2) + get(5) + get(6) + get(7);
        cores.push(CpuTicks {
            core_id,
            busy,
            idle,
        });
    }
    cores
}

/// Parse /proc/diskstats, keeping whole-disk devices only. Sector counts
/// are in 512-byte units regardless of the device's logical sector size.
fn parse_diskstats(contents: &str) -> Vec<DiskIoCounters> {
    let mut disks = Vec::new();
    for line in contents.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let device = fields[2];
        if is_virtual_device(device) || is_partition(device) {
            continue;
        }
        let parse = |i: usize| fields[i].parse::<u64>().unwrap_or(0);
        disks.push(DiskIoCounters {
            device: device.to_string(),
            reads: parse(3),
            read_bytes: parse(5) * SECTOR_SIZE,
            writes: parse(7),
            written_bytes: parse(9) * SECTOR_SIZE,
        });
    }
    disks
}

fn is_virtual_device(device: &str) -> bool {
    ["loop", "ram", "zram", "sr", "fd"]
        .iter()
        .any(|prefix| device.starts_with(prefix))
}

fn is_partition(device: &str) -> bool {
    // Mapped devices and software RAID end in digits but are whole disks.
    if device.starts_with("dm-") || device.starts_with("md") {
        return false;
    }
    if device.starts_with("nvme") || device.starts_with("mmcblk") {
        // Whole devices end in "n<N>"/"mmcblk<N>"; partitions append "p<N>".
        if let Some(idx) = device.rfind('p')
            && idx > 0
            && device.as_bytes()[idx - 1].is_ascii_digit()
        {
            let suffix = &device[idx + 1..];
            return !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit());
        }
        return false;
    }
    device.ends_with(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_SAMPLE: &str = "\
cpu  800 20 180 9000 100 0 50 0 0 0
cpu0 400 10 90 4500 50 0 25 0 0 0
cpu1 400 10 90 4500 50 0 25 0 0 0
intr 12345
ctxt 6789
";

    const DISKSTATS_SAMPLE: &str = "\
   7       0 loop0 100 0 800 10 0 0 0 0 0 10 10 0 0 0 0 0 0
   8       0 sda 5000 10 100000 300 2000 5 40000 200 0 400 500 0 0 0 0 0 0
   8       1 sda1 4900 10 99000 295 1990 5 39000 198 0 395 493 0 0 0 0 0 0
 259       0 nvme0n1 7000 0 140000 100 3000 0 60000 90 0 150 190 0 0 0 0 0 0
 259       1 nvme0n1p1 6900 0 139000 99 2990 0 59000 89 0 148 188 0 0 0 0 0 0
";

    #[test]
    fn proc_stat_parses_per_core_ticks_only() {
        let cores = parse_proc_stat(STAT_SAMPLE);
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[0].core_id, 0);
        // busy = user + nice + system + irq + softirq + steal
        assert_eq!(cores[0].busy, 400 + 10 + 90 + 25);
        // idle = idle + iowait
        assert_eq!(cores[0].idle, 4500 + 50);
    }

    #[test]
    fn diskstats_keeps_whole_disks_and_converts_sectors() {
        let disks = parse_diskstats(DISKSTATS_SAMPLE);
        let names: Vec<&str> = disks.iter().map(|d| d.device.as_str()).collect();
        assert_eq!(names, vec!["sda", "nvme0n1"]);
        assert_eq!(disks[0].reads, 5000);
        assert_eq!(disks[0].read_bytes, 100000 * 512);
        assert_eq!(disks[0].writes, 2000);
        assert_eq!(disks[0].written_bytes, 40000 * 512);
    }

    #[test]
    fn partition_detection_handles_nvme_and_scsi_names() {
        assert!(is_partition("sda1"));
        assert!(is_partition("vdb2"));
        assert!(!is_partition("sda"));
        assert!(is_partition("nvme0n1p1"));
        assert!(!is_partition("nvme0n1"));
        assert!(is_partition("mmcblk0p2"));
        assert!(!is_partition("mmcblk0"));
        assert!(!is_partition("dm-0"));
        assert!(!is_partition("md127"));
    }

    #[test]
    fn virtual_devices_are_filtered() {
        assert!(is_virtual_device("loop7"));
        assert!(is_virtual_device("zram0"));
        assert!(!is_virtual_device("sda"));
    }
}
