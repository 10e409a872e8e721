//! Host CPU descriptor attached to every benchmark record.

use std::path::Path;

use serde::{Deserialize, Serialize};

const CPU_CACHE_DIR: &str = "/sys/devices/system/cpu/cpu0/cache";

/// Immutable snapshot of the host CPU, taken once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub physical_cores: u32,
    pub threads_per_core: u32,
    pub logical_cores: u32,
    /// Cache sizes in bytes; zero when the platform does not expose them
    pub cache_line: u32,
    pub l1d: u32,
    pub l1i: u32,
    pub l2: u32,
    pub l3: u32,
    /// Nominal frequency in MHz
    pub freq_mhz: u64,
    pub brand: String,
    /// Host supports both ADX and BMI2
    pub adx: bool,
}

/// Sizes read from the kernel's cache topology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheInfo {
    pub line: u32,
    pub l1d: u32,
    pub l1i: u32,
    pub l2: u32,
    pub l3: u32,
}

impl HostInfo {
    /// Detect host information from the current system
    pub fn detect() -> Self {
        use sysinfo::{CpuRefreshKind, RefreshKind, System};

        let mut sys =
            System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::everything()));
        sys.refresh_cpu();

        let logical_cores = sys.cpus().len() as u32;
        let physical_cores = sys
            .physical_core_count()
            .map(|c| c as u32)
            .unwrap_or(logical_cores);
        let threads_per_core = if physical_cores > 0 {
            logical_cores / physical_cores
        } else {
            0
        };
        let brand = sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_default();
        let freq_mhz = sys.cpus().first().map(|c| c.frequency()).unwrap_or(0);
        let caches = read_cache_info(Path::new(CPU_CACHE_DIR));

        HostInfo {
            physical_cores,
            threads_per_core,
            logical_cores,
            cache_line: caches.line,
            l1d: caches.l1d,
            l1i: caches.l1i,
            l2: caches.l2,
            l3: caches.l3,
            freq_mhz,
            brand,
            adx: supports_adx(),
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn supports_adx() -> bool {
    std::is_x86_feature_detected!("adx") && std::is_x86_feature_detected!("bmi2")
}

#[cfg(not(target_arch = "x86_64"))]
fn supports_adx() -> bool {
    false
}

/// Read cache sizes from a sysfs-style `cache/indexN` tree.
pub fn read_cache_info(dir: &Path) -> CacheInfo {
    let mut info = CacheInfo::default();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return info;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_index = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("index"))
            .unwrap_or(false);
        if !is_index {
            continue;
        }

        let level = read_trimmed(&path.join("level"));
        let kind = read_trimmed(&path.join("type"));
        let size = read_trimmed(&path.join("size"))
            .as_deref()
            .and_then(parse_cache_size)
            .unwrap_or(0);
        if info.line == 0 {
            info.line = read_trimmed(&path.join("coherency_line_size"))
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
        }

        match (level.as_deref(), kind.as_deref()) {
            (Some("1"), Some("Data")) => info.l1d = size,
            (Some("1"), Some("Instruction")) => info.l1i = size,
            (Some("2"), _) => info.l2 = size,
            (Some("3"), _) => info.l3 = size,
            _ => {}
        }
    }
    info
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse sysfs cache sizes such as `48K`, `2048K` or `32M` into bytes.
pub fn parse_cache_size(s: &str) -> Option<u32> {
    let s = s.trim();
    let (digits, unit) = match s.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    };
    let value: u32 = digits.parse().ok()?;
    let multiplier = match unit.trim() {
        "" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        _ => return None,
    };
    value.checked_mul(multiplier)
}
