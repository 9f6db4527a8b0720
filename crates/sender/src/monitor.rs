//! Host Monitor – leituras do sistema via `sysinfo` e sysfs.
//!
//! - `sysinfo` — uso de CPU, RAM, disco, interfaces de rede, hostname
//! - sysfs — temperatura da CPU (`thermal_zone0`, milésimos de °C)
//! - ambiente — nome de login (`LOGNAME`/`USER`)

use stats_core::config::SamplerConfig;
use stats_core::metrics::{DiskReading, InterfaceAddrs, MemoryReading, MetricSource};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};
use tracing::debug;

/// Monitor do host (Raspberry Pi ou qualquer Linux).
pub struct HostMonitor {
    sys: System,
    disks: Disks,
    networks: Networks,
    cpu_window: Duration,
    thermal_path: PathBuf,
    root_mount: PathBuf,
}

impl HostMonitor {
    pub fn new(config: &SamplerConfig) -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );

        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            cpu_window: config.cpu_window().max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
            thermal_path: config.thermal_path.clone(),
            root_mount: config.root_mount.clone(),
        }
    }
}

impl MetricSource for HostMonitor {
    fn memory(&mut self) -> MemoryReading {
        self.sys.refresh_memory();
        MemoryReading {
            total: self.sys.total_memory(),
            available: self.sys.available_memory(),
        }
    }

    /// Bloqueia durante a janela de amostragem (1 s por padrão).
    fn cpu_usage(&mut self) -> f32 {
        self.sys.refresh_cpu_usage();
        std::thread::sleep(self.cpu_window);
        self.sys.refresh_cpu_usage();
        self.sys.global_cpu_usage()
    }

    fn cpu_temp_millidegrees(&mut self) -> Option<i64> {
        read_millidegrees(&self.thermal_path)
    }

    fn disk(&mut self) -> Option<DiskReading> {
        self.disks.refresh(true);
        let disk = self
            .disks
            .iter()
            .find(|d| d.mount_point() == self.root_mount.as_path());

        match disk {
            Some(d) => Some(DiskReading {
                total: d.total_space(),
                free: d.available_space(),
            }),
            None => {
                debug!("Nenhum disco montado em {}", self.root_mount.display());
                None
            }
        }
    }

    fn interfaces(&mut self) -> InterfaceAddrs {
        self.networks.refresh(true);
        self.networks
            .iter()
            .map(|(name, data)| {
                let ipv4: Vec<Ipv4Addr> = data
                    .ip_networks()
                    .iter()
                    .filter_map(|net| match net.addr {
                        IpAddr::V4(v4) => Some(v4),
                        IpAddr::V6(_) => None,
                    })
                    .collect();
                (name.clone(), ipv4)
            })
            .collect()
    }

    fn login_name(&mut self) -> Option<String> {
        ["LOGNAME", "USER"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|name| !name.is_empty())
    }

    fn host_name(&mut self) -> Option<String> {
        System::host_name().filter(|name| !name.is_empty())
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// Lê o sensor térmico do sysfs. Arquivo ausente ou ilegível → `None`.
fn read_millidegrees(path: &Path) -> Option<i64> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let parsed = parse_millidegrees(&content);
            if parsed.is_none() {
                debug!("Leitura inválida em {}: {content:?}", path.display());
            }
            parsed
        }
        Err(e) => {
            debug!("Sensor térmico indisponível ({}): {e}", path.display());
            None
        }
    }
}

fn parse_millidegrees(content: &str) -> Option<i64> {
    content.trim().parse().ok()
}
