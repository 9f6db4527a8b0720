//! Fonte de métricas e regras de amostragem por ciclo.
//!
//! A coleta no SO fica atrás de [`MetricSource`]; aqui ficam as regras que
//! transformam leituras brutas em registros: unidades, casas decimais,
//! sentinela `N/A` e a política de resolução de IP.

use crate::types::{MetricName, MetricRecord, MetricValue};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Valor de `IP_ADDR`/`NETWORK` quando nenhuma interface tem IPv4.
pub const DISCONNECTED: &str = "Disconnected";
/// Valor de `NETWORK` quando um IP foi encontrado.
pub const CONNECTED: &str = "Connected";

/// Interfaces consultadas para o IP, em ordem de preferência.
pub const DEFAULT_INTERFACES: [&str; 2] = ["wlan0", "eth0"];

// ──────────────────────────────────────────────
// Leituras brutas
// ──────────────────────────────────────────────

/// Memória em bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryReading {
    pub total: u64,
    pub available: u64,
}

/// Espaço do filesystem raiz em bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskReading {
    pub total: u64,
    pub free: u64,
}

/// Endereços IPv4 por nome de interface. Interface presente sem IPv4 tem
/// lista vazia.
pub type InterfaceAddrs = BTreeMap<String, Vec<Ipv4Addr>>;

/// Leituras do sistema operacional. Implementada pelo monitor do host e por
/// fontes falsas em testes.
pub trait MetricSource {
    fn memory(&mut self) -> MemoryReading;
    /// Uso agregado da CPU (%), amostrado numa janela curta.
    fn cpu_usage(&mut self) -> f32;
    /// Temperatura em milésimos de °C, `None` se o sensor não existe.
    fn cpu_temp_millidegrees(&mut self) -> Option<i64>;
    fn disk(&mut self) -> Option<DiskReading>;
    fn interfaces(&mut self) -> InterfaceAddrs;
    fn login_name(&mut self) -> Option<String>;
    fn host_name(&mut self) -> Option<String>;
}

impl<S: MetricSource + ?Sized> MetricSource for &mut S {
    fn memory(&mut self) -> MemoryReading {
        (**self).memory()
    }
    fn cpu_usage(&mut self) -> f32 {
        (**self).cpu_usage()
    }
    fn cpu_temp_millidegrees(&mut self) -> Option<i64> {
        (**self).cpu_temp_millidegrees()
    }
    fn disk(&mut self) -> Option<DiskReading> {
        (**self).disk()
    }
    fn interfaces(&mut self) -> InterfaceAddrs {
        (**self).interfaces()
    }
    fn login_name(&mut self) -> Option<String> {
        (**self).login_name()
    }
    fn host_name(&mut self) -> Option<String> {
        (**self).host_name()
    }
}

// ──────────────────────────────────────────────
// Unidades e precisão
// ──────────────────────────────────────────────

/// Regras de arredondamento centralizadas por tipo de métrica.
pub mod units {
    use crate::types::MetricValue;

    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    /// Memória: bytes → MiB, 2 casas.
    pub fn memory_mib(bytes: u64) -> MetricValue {
        MetricValue::number(bytes as f64 / MIB, 2)
    }

    /// Armazenamento: bytes → GiB, 2 casas.
    pub fn storage_gib(bytes: u64) -> MetricValue {
        MetricValue::number(bytes as f64 / GIB, 2)
    }

    /// Uso de CPU: %, 1 casa.
    pub fn percent(value: f32) -> MetricValue {
        MetricValue::number(f64::from(value), 1)
    }

    /// Temperatura: m°C → °C, 1 casa; sem leitura vira `N/A`.
    pub fn celsius(millidegrees: Option<i64>) -> MetricValue {
        match millidegrees {
            Some(m) => MetricValue::number(m as f64 / 1000.0, 1),
            None => MetricValue::Unavailable,
        }
    }
}

// ──────────────────────────────────────────────
// Rede
// ──────────────────────────────────────────────

/// Primeiro IPv4 da primeira interface preferida que tiver um.
pub fn resolve_ip<S: AsRef<str>>(addrs: &InterfaceAddrs, preference: &[S]) -> Option<Ipv4Addr> {
    preference
        .iter()
        .filter_map(|iface| addrs.get(iface.as_ref()))
        .find_map(|ips| ips.first().copied())
}

/// Valor de `IP_ADDR` para uma resolução.
pub fn ip_value(ip: Option<Ipv4Addr>) -> MetricValue {
    match ip {
        Some(ip) => MetricValue::text(ip.to_string()),
        None => MetricValue::text(DISCONNECTED),
    }
}

/// Valor de `NETWORK`, derivado da resolução de IP.
pub fn network_value(ip: Option<Ipv4Addr>) -> MetricValue {
    MetricValue::text(if ip.is_some() { CONNECTED } else { DISCONNECTED })
}

// ──────────────────────────────────────────────
// Amostragem de um ciclo
// ──────────────────────────────────────────────

/// Amostrador de um único ciclo.
///
/// Lê cada subsistema sob demanda e guarda a leitura para as métricas
/// irmãs do mesmo ciclo: memória para `RAM_*`, disco para `STORAGE_*`, e a
/// resolução de IP para `IP_ADDR`/`NETWORK`.
pub struct CycleSampler<'a, S: MetricSource + ?Sized> {
    source: &'a mut S,
    interfaces: &'a [String],
    memory: Option<MemoryReading>,
    disk: Option<Option<DiskReading>>,
    ip: Option<Option<Ipv4Addr>>,
}

impl<'a, S: MetricSource + ?Sized> CycleSampler<'a, S> {
    pub fn new(source: &'a mut S, interfaces: &'a [String]) -> Self {
        Self {
            source,
            interfaces,
            memory: None,
            disk: None,
            ip: None,
        }
    }

    /// Lê a métrica e monta o registro correspondente.
    pub fn sample(&mut self, metric: MetricName) -> MetricRecord {
        let value = match metric {
            MetricName::RamTotal => units::memory_mib(self.memory().total),
            MetricName::RamFree => units::memory_mib(self.memory().available),
            MetricName::CpuUsage => units::percent(self.source.cpu_usage()),
            MetricName::CpuTemp => units::celsius(self.source.cpu_temp_millidegrees()),
            MetricName::StorageTotal => self
                .disk()
                .map_or(MetricValue::Unavailable, |d| units::storage_gib(d.total)),
            MetricName::StorageFree => self
                .disk()
                .map_or(MetricValue::Unavailable, |d| units::storage_gib(d.free)),
            MetricName::IpAddr => ip_value(self.ip()),
            MetricName::UserName => MetricValue::text_or_unavailable(self.source.login_name()),
            MetricName::ComputerName => MetricValue::text_or_unavailable(self.source.host_name()),
            MetricName::Network => network_value(self.ip()),
        };
        MetricRecord::from((metric, value))
    }

    fn memory(&mut self) -> MemoryReading {
        *self.memory.get_or_insert_with(|| self.source.memory())
    }

    fn disk(&mut self) -> Option<DiskReading> {
        *self.disk.get_or_insert_with(|| self.source.disk())
    }

    fn ip(&mut self) -> Option<Ipv4Addr> {
        if let Some(ip) = self.ip {
            return ip;
        }
        let resolved = resolve_ip(&self.source.interfaces(), self.interfaces);
        self.ip = Some(resolved);
        resolved
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Fonte fixa que conta quantas vezes cada subsistema foi lido.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct StaticSource {
        pub memory: MemoryReading,
        pub cpu: f32,
        pub temp: Option<i64>,
        pub disk: Option<DiskReading>,
        pub interfaces: InterfaceAddrs,
        pub login: Option<String>,
        pub host: Option<String>,
        pub memory_reads: usize,
        pub interface_reads: usize,
    }

    impl StaticSource {
        pub(crate) fn raspberry() -> Self {
            let mut interfaces = InterfaceAddrs::new();
            interfaces.insert("lo".into(), vec![Ipv4Addr::LOCALHOST]);
            interfaces.insert("eth0".into(), vec![Ipv4Addr::new(192, 168, 1, 5)]);
            Self {
                memory: MemoryReading {
                    total: 4_096_000_000,
                    available: 3_041_000_000,
                },
                cpu: 12.5,
                temp: Some(45_600),
                disk: Some(DiskReading {
                    total: 31_910_000_000,
                    free: 20_000_000_000,
                }),
                interfaces,
                login: Some("pi".into()),
                host: Some("raspberrypi".into()),
                ..Default::default()
            }
        }
    }

    impl MetricSource for StaticSource {
        fn memory(&mut self) -> MemoryReading {
            self.memory_reads += 1;
            self.memory
        }
        fn cpu_usage(&mut self) -> f32 {
            self.cpu
        }
        fn cpu_temp_millidegrees(&mut self) -> Option<i64> {
            self.temp
        }
        fn disk(&mut self) -> Option<DiskReading> {
            self.disk
        }
        fn interfaces(&mut self) -> InterfaceAddrs {
            self.interface_reads += 1;
            self.interfaces.clone()
        }
        fn login_name(&mut self) -> Option<String> {
            self.login.clone()
        }
        fn host_name(&mut self) -> Option<String> {
            self.host.clone()
        }
    }

    fn preference() -> Vec<String> {
        DEFAULT_INTERFACES.iter().map(|s| s.to_string()).collect()
    }

    fn line(source: &mut StaticSource, metric: MetricName) -> String {
        let prefs = preference();
        CycleSampler::new(source, &prefs).sample(metric).to_line()
    }

    #[test]
    fn eth0_used_when_wlan0_absent() {
        let mut source = StaticSource::raspberry();
        let prefs = preference();
        let mut sampler = CycleSampler::new(&mut source, &prefs);
        assert_eq!(sampler.sample(MetricName::IpAddr).to_line(), "IP_ADDR:192.168.1.5\n");
        assert_eq!(sampler.sample(MetricName::Network).to_line(), "NETWORK:Connected\n");
    }

    #[test]
    fn no_preferred_interface_means_disconnected() {
        let mut source = StaticSource::raspberry();
        source.interfaces.remove("eth0");
        assert_eq!(line(&mut source, MetricName::IpAddr), "IP_ADDR:Disconnected\n");
        assert_eq!(line(&mut source, MetricName::Network), "NETWORK:Disconnected\n");
    }

    #[test]
    fn preferred_interface_wins_when_both_present() {
        let mut addrs = InterfaceAddrs::new();
        addrs.insert("eth0".into(), vec![Ipv4Addr::new(192, 168, 1, 5)]);
        addrs.insert("wlan0".into(), vec![Ipv4Addr::new(10, 0, 0, 7)]);
        assert_eq!(
            resolve_ip(&addrs, &DEFAULT_INTERFACES),
            Some(Ipv4Addr::new(10, 0, 0, 7))
        );
    }

    #[test]
    fn interface_without_ipv4_is_skipped() {
        let mut addrs = InterfaceAddrs::new();
        addrs.insert("wlan0".into(), Vec::new());
        addrs.insert("eth0".into(), vec![Ipv4Addr::new(192, 168, 1, 5)]);
        assert_eq!(
            resolve_ip(&addrs, &DEFAULT_INTERFACES),
            Some(Ipv4Addr::new(192, 168, 1, 5))
        );
    }

    #[test]
    fn missing_temperature_sensor_sends_sentinel() {
        let mut source = StaticSource::raspberry();
        source.temp = None;
        assert_eq!(line(&mut source, MetricName::CpuTemp), "CPU_TEMP:N/A\n");
    }

    #[test]
    fn temperature_converted_from_millidegrees() {
        let mut source = StaticSource::raspberry();
        assert_eq!(line(&mut source, MetricName::CpuTemp), "CPU_TEMP:45.6\n");
    }

    #[test]
    fn memory_and_storage_use_binary_units() {
        let mut source = StaticSource::raspberry();
        source.memory.total = 4 * 1024 * 1024 * 1024;
        source.disk = Some(DiskReading {
            total: 32 * 1024 * 1024 * 1024,
            free: 1024 * 1024 * 1024 / 2,
        });
        assert_eq!(line(&mut source, MetricName::RamTotal), "RAM_TOTAL:4096.0\n");
        assert_eq!(line(&mut source, MetricName::StorageTotal), "STORAGE_TOTAL:32.0\n");
        assert_eq!(line(&mut source, MetricName::StorageFree), "STORAGE_FREE:0.5\n");
    }

    #[test]
    fn missing_disk_and_identity_send_sentinel() {
        let mut source = StaticSource::raspberry();
        source.disk = None;
        source.login = None;
        assert_eq!(line(&mut source, MetricName::StorageFree), "STORAGE_FREE:N/A\n");
        assert_eq!(line(&mut source, MetricName::UserName), "USER_NAME:N/A\n");
    }

    #[test]
    fn sibling_metrics_share_one_reading() {
        let mut source = StaticSource::raspberry();
        let prefs = preference();
        {
            let mut sampler = CycleSampler::new(&mut source, &prefs);
            for metric in MetricName::ALL {
                sampler.sample(metric);
            }
        }
        assert_eq!(source.memory_reads, 1);
        assert_eq!(source.interface_reads, 1);
    }
}
