//! Definição dos registros de métrica enviados ao display.
//!
//! Cada registro vira uma linha textual `"{nome}:{valor}\n"`. Não existe
//! escape: nomes e valores não podem conter `:` nem `\n`, e isso é
//! responsabilidade de quem constrói o registro.

use std::fmt;

/// Literal enviado no lugar de uma leitura indisponível.
pub const UNAVAILABLE: &str = "N/A";

// ──────────────────────────────────────────────
// Catálogo de métricas
// ──────────────────────────────────────────────

/// Métricas enviadas a cada ciclo, na ordem em que o display as espera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RamTotal,
    RamFree,
    CpuUsage,
    CpuTemp,
    StorageTotal,
    StorageFree,
    IpAddr,
    UserName,
    ComputerName,
    Network,
}

impl MetricName {
    /// Ordem fixa de envio de um ciclo.
    pub const ALL: [MetricName; 10] = [
        MetricName::RamTotal,
        MetricName::RamFree,
        MetricName::CpuUsage,
        MetricName::CpuTemp,
        MetricName::StorageTotal,
        MetricName::StorageFree,
        MetricName::IpAddr,
        MetricName::UserName,
        MetricName::ComputerName,
        MetricName::Network,
    ];

    /// Nome no fio (chave antes do `:`).
    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::RamTotal => "RAM_TOTAL",
            MetricName::RamFree => "RAM_FREE",
            MetricName::CpuUsage => "CPU_USAGE",
            MetricName::CpuTemp => "CPU_TEMP",
            MetricName::StorageTotal => "STORAGE_TOTAL",
            MetricName::StorageFree => "STORAGE_FREE",
            MetricName::IpAddr => "IP_ADDR",
            MetricName::UserName => "USER_NAME",
            MetricName::ComputerName => "COMPUTER_NAME",
            MetricName::Network => "NETWORK",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────────────────────────────────
// Valores
// ──────────────────────────────────────────────

/// Valor escalar de uma métrica.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Texto enviado como está (IP, hostname, status…)
    Text(String),
    /// Número arredondado para `decimals` casas na renderização
    Number { value: f64, decimals: u8 },
    /// Leitura indisponível – renderiza como `N/A`
    Unavailable,
}

impl MetricValue {
    pub fn text(value: impl Into<String>) -> Self {
        MetricValue::Text(value.into())
    }

    pub fn number(value: f64, decimals: u8) -> Self {
        MetricValue::Number { value, decimals }
    }

    /// `Some(texto)` vira [`MetricValue::Text`], `None` vira o sentinela.
    pub fn text_or_unavailable(value: Option<String>) -> Self {
        value.map_or(MetricValue::Unavailable, MetricValue::Text)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, MetricValue::Unavailable)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Text(text) => f.write_str(text),
            MetricValue::Number { value, decimals } => {
                let rounded = round_to(*value, *decimals);
                if rounded.is_finite() {
                    // Debug de f64 usa a menor representação exata e mantém
                    // ao menos uma casa decimal (3906.0, 45.6, 3906.25).
                    write!(f, "{rounded:?}")
                } else {
                    f.write_str(UNAVAILABLE)
                }
            }
            MetricValue::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// Arredonda `value` para `decimals` casas decimais.
pub fn round_to(value: f64, decimals: u8) -> f64 {
    let factor = 10f64.powi(i32::from(decimals));
    (value * factor).round() / factor
}

// ──────────────────────────────────────────────
// Registro
// ──────────────────────────────────────────────

/// Par nome/valor de um ciclo. Imutável depois de construído.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    name: String,
    value: MetricValue,
}

impl MetricRecord {
    pub fn new(name: impl Into<String>, value: MetricValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &MetricValue {
        &self.value
    }

    /// Linha canônica `"{nome}:{valor}\n"`.
    pub fn to_line(&self) -> String {
        format!("{}:{}\n", self.name, self.value)
    }
}

impl From<(MetricName, MetricValue)> for MetricRecord {
    fn from((name, value): (MetricName, MetricValue)) -> Self {
        MetricRecord::new(name.as_str(), value)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
