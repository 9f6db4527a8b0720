//! Configuração unificada via TOML.
//!
//! Um único `config.toml` ao lado do executável, com seções `[bus]` e
//! `[sampler]`. Campos ausentes assumem o valor padrão.

use crate::bus::SMBUS_BLOCK_MAX;
use crate::cycle::CYCLE_PERIOD;
use crate::metrics::DEFAULT_INTERFACES;
use crate::pacer::{CHUNK_DELAY, MAX_CHUNK_DELAY};
use crate::protocol::{COMMAND_BYTE, MAX_CHUNK_SIZE};
use crate::transport::{Destination, TransportSettings};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Erros ao persistir a configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro ao serializar configuração: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Erro ao escrever {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Configuração do barramento e do transporte.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Device I²C (ex: /dev/i2c-1)
    pub device: String,
    /// Endereço 7-bit do display
    pub address: u8,
    /// Byte de comando/registrador de cada escrita
    pub command: u8,
    /// Tamanho máximo de um chunk (bytes)
    pub max_chunk_size: usize,
    /// Atraso entre chunks (ms)
    pub chunk_delay_ms: u64,
    /// Apenas loga os chunks, sem tocar no hardware
    pub dry_run: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            device: "/dev/i2c-1".into(),
            address: Destination::DEFAULT_ADDRESS,
            command: COMMAND_BYTE,
            max_chunk_size: MAX_CHUNK_SIZE,
            chunk_delay_ms: CHUNK_DELAY.as_millis() as u64,
            dry_run: false,
        }
    }
}

impl BusConfig {
    pub fn destination(&self) -> Destination {
        Destination {
            address: self.address,
            command: self.command,
        }
    }

    pub fn transport(&self) -> TransportSettings {
        TransportSettings {
            max_chunk: NonZeroUsize::new(self.max_chunk_size).unwrap_or(NonZeroUsize::MIN),
            chunk_delay: Duration::from_millis(self.chunk_delay_ms),
        }
    }
}

/// Configuração da amostragem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Intervalo entre ciclos em segundos
    pub interval_secs: f64,
    /// Janela de amostragem do uso de CPU (ms)
    pub cpu_window_ms: u64,
    /// Arquivo do sensor térmico (milésimos de °C)
    pub thermal_path: PathBuf,
    /// Interfaces consultadas para o IP, em ordem de preferência
    pub interfaces: Vec<String>,
    /// Ponto de montagem medido em STORAGE_*
    pub root_mount: PathBuf,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_secs: CYCLE_PERIOD.as_secs_f64(),
            cpu_window_ms: 1000,
            thermal_path: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            interfaces: DEFAULT_INTERFACES.iter().map(|s| s.to_string()).collect(),
            root_mount: PathBuf::from("/"),
        }
    }
}

impl SamplerConfig {
    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs).unwrap_or(CYCLE_PERIOD)
    }

    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_window_ms)
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bus: BusConfig,
    pub sampler: SamplerConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(0x03..=0x77).contains(&self.bus.address) {
            errors.push(format!(
                "Endereço I²C inválido: 0x{:02X} (0x03–0x77)",
                self.bus.address
            ));
        }
        if self.bus.max_chunk_size == 0 || self.bus.max_chunk_size > SMBUS_BLOCK_MAX {
            errors.push(format!(
                "Tamanho de chunk inválido: {} (1–{SMBUS_BLOCK_MAX})",
                self.bus.max_chunk_size
            ));
        }
        if self.bus.chunk_delay_ms > MAX_CHUNK_DELAY.as_millis() as u64 {
            errors.push(format!(
                "Atraso entre chunks inválido: {} ms (0–{} ms)",
                self.bus.chunk_delay_ms,
                MAX_CHUNK_DELAY.as_millis()
            ));
        }
        if !self.bus.dry_run && self.bus.device.is_empty() {
            errors.push("Device do barramento não pode ser vazio".into());
        }
        if !(0.1..=3600.0).contains(&self.sampler.interval_secs) {
            errors.push(format!(
                "Intervalo de amostragem inválido: {} (0.1–3600.0)",
                self.sampler.interval_secs
            ));
        }
        if self.sampler.interfaces.is_empty() {
            errors.push("Lista de interfaces de rede vazia".into());
        }

        errors
    }
}
