//! Point sample of process memory, taken once after the timed region.

const MIB: u64 = 1024 * 1024;

/// Virtual memory currently mapped for this process, in whole MiB.
#[cfg(feature = "mem")]
pub fn sample_memory_mib() -> u64 {
    use sysinfo::{ProcessRefreshKind, RefreshKind, System};

    let Ok(pid) = sysinfo::get_current_pid() else {
        tracing::warn!("could not determine current pid; reporting 0 MiB");
        return 0;
    };
    let mut sys = System::new_with_specifics(
        RefreshKind::new().with_processes(ProcessRefreshKind::new().with_memory()),
    );
    sys.refresh_process(pid);
    sys.process(pid)
        .map(|p| bytes_to_mib(p.virtual_memory()))
        .unwrap_or(0)
}

#[cfg(not(feature = "mem"))]
pub fn sample_memory_mib() -> u64 {
    0
}

pub fn bytes_to_mib(bytes: u64) -> u64 {
    bytes / MIB
}
