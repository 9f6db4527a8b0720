//! # Pi Stats Core
//!
//! Crate compartilhada que define os registros de métrica, o protocolo de
//! fatiamento em chunks, o transporte pelo barramento I²C, o ciclo de
//! amostragem e a configuração TOML.
//!
//! ## Módulos
//! - [`types`] – Registros `nome:valor` e catálogo de métricas
//! - [`protocol`] – Codificação da linha e fatiamento em frames
//! - [`bus`] – Costura com o hardware (embedded-hal) e barramento falso
//! - [`pacer`] – Espaçamento entre escritas
//! - [`transport`] – Envio chunk a chunk com isolamento de falhas
//! - [`metrics`] – Fonte de métricas, unidades e resolução de IP
//! - [`cycle`] – Orquestrador do loop de amostragem
//! - [`shutdown`] – Flag de shutdown cooperativo
//! - [`config`] – Configuração unificada via TOML

pub mod types;
pub mod protocol;
pub mod bus;
pub mod pacer;
pub mod transport;
pub mod metrics;
pub mod cycle;
pub mod shutdown;
pub mod config;

// Re-exports convenientes
pub use bus::{BlockBus, BusError};
pub use config::AppConfig;
pub use cycle::{CycleReport, CycleRunner};
pub use metrics::MetricSource;
pub use protocol::{MAX_CHUNK_SIZE, encode_record, frames};
pub use shutdown::ShutdownFlag;
pub use transport::{ChunkSender, Destination, SendReport};
pub use types::{MetricName, MetricRecord, MetricValue};
