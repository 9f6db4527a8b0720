//! # Pi Stats Sender
//!
//! Coleta métricas do host e envia ao display (Wio Terminal) pelo
//! barramento I²C, em chunks de até 30 bytes.
//!
//! ## Uso
//! ```bash
//! stats_sender                  # Loop contínuo (Ctrl+C encerra)
//! stats_sender --dry-run --once # Um ciclo, frames só no log
//! ```

mod bus;
mod cli;
mod monitor;

use clap::Parser;
use cli::Cli;
use monitor::HostMonitor;
use stats_core::{AppConfig, ChunkSender, CycleRunner, ShutdownFlag};
use std::process::ExitCode;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging ──
    let filter = match &cli.log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info".into()),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ── Carregar config ──
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    if cli.dry_run {
        config.bus.dry_run = true;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Configuração inválida: {e}");
        }
        return ExitCode::FAILURE;
    }

    // ── Barramento ──
    let bus = match bus::open_bus(&config.bus) {
        Ok(bus) => bus,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // ── Shutdown (SIGINT/SIGTERM) ──
    let shutdown = ShutdownFlag::new();
    let handler_flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.request()) {
        error!("Falha ao instalar handler de sinal: {e}");
        return ExitCode::FAILURE;
    }

    let destination = config.bus.destination();
    let transport = config.bus.transport();
    let sender = ChunkSender::new(bus, destination, transport);
    let monitor = HostMonitor::new(&config.sampler);
    info!("Host monitor inicializado");

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ PI STATS SENDER – ATIVO");
    println!("══════════════════════════════════════════════");
    if config.bus.dry_run {
        println!("  Destino:   dry-run (0x{:02X})", destination.address);
    } else {
        println!("  Destino:   {} @ 0x{:02X}", config.bus.device, destination.address);
    }
    println!(
        "  Chunks:    {} bytes a cada {} ms",
        transport.max_chunk,
        transport.chunk_delay.as_millis()
    );
    println!("  Intervalo: {:.1}s", config.sampler.interval_secs);
    println!("══════════════════════════════════════════════");
    println!();

    let mut runner = CycleRunner::new(
        monitor,
        sender,
        config.sampler.interfaces.clone(),
        config.sampler.period(),
        shutdown.clone(),
    );

    // ── Loop principal ──
    if cli.once {
        let report = runner.run_cycle();
        info!(
            "Ciclo único: {} métricas, {} chunks, {} falhas",
            report.metrics_sent, report.frames_attempted, report.frames_failed
        );
    } else {
        runner.run();
    }

    if shutdown.is_requested() {
        info!("Interrompido, encerrando coleta de métricas");
    }

    // Libera o barramento antes de sair
    drop(runner.into_sender().into_bus());
    info!("Barramento liberado");

    ExitCode::SUCCESS
}
