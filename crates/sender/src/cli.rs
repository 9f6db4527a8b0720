//! Argumentos de linha de comando.

use clap::Parser;
use std::path::PathBuf;

/// Envia métricas do host para o display via I²C.
#[derive(Debug, Parser)]
#[command(name = "stats_sender", version, about)]
pub struct Cli {
    /// Arquivo de configuração (padrão: config.toml ao lado do executável)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Loga os frames em vez de escrever no barramento
    #[arg(long)]
    pub dry_run: bool,

    /// Roda um único ciclo e sai
    #[arg(long)]
    pub once: bool,

    /// Filtro de log (ex: info, debug, stats_core=trace)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}
