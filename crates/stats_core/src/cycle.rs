//! Loop de amostragem: a cada período lê as métricas na ordem fixa e envia
//! cada registro pelo [`ChunkSender`].

use crate::bus::BlockBus;
use crate::metrics::{CycleSampler, MetricSource};
use crate::shutdown::ShutdownFlag;
use crate::transport::ChunkSender;
use crate::types::MetricName;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Período padrão entre ciclos.
pub const CYCLE_PERIOD: Duration = Duration::from_secs(5);

/// Resumo de um ciclo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Registros com ao menos um chunk tentado (inclusive os com chunks perdidos)
    pub metrics_sent: usize,
    pub frames_attempted: usize,
    pub frames_failed: usize,
    pub interrupted: bool,
}

/// Orquestrador: dono da fonte de métricas e do sender.
pub struct CycleRunner<S: MetricSource, B: BlockBus> {
    source: S,
    sender: ChunkSender<B>,
    interfaces: Vec<String>,
    period: Duration,
    shutdown: ShutdownFlag,
}

impl<S: MetricSource, B: BlockBus> CycleRunner<S, B> {
    pub fn new(
        source: S,
        sender: ChunkSender<B>,
        interfaces: Vec<String>,
        period: Duration,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            source,
            sender: sender.with_shutdown(shutdown.clone()),
            interfaces,
            period,
            shutdown,
        }
    }

    pub fn sender(&self) -> &ChunkSender<B> {
        &self.sender
    }

    /// Encerra o orquestrador e devolve o sender (e com ele o barramento).
    pub fn into_sender(self) -> ChunkSender<B> {
        self.sender
    }

    /// Amostra e envia as 10 métricas, em ordem.
    pub fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let mut sampler = CycleSampler::new(&mut self.source, &self.interfaces);

        for metric in MetricName::ALL {
            if self.shutdown.is_requested() {
                report.interrupted = true;
                break;
            }

            let record = sampler.sample(metric);
            let sent = self.sender.send_record(&record);
            if sent.attempted > 0 {
                report.metrics_sent += 1;
            }
            report.frames_attempted += sent.attempted;
            report.frames_failed += sent.failed;

            if sent.interrupted {
                report.interrupted = true;
                break;
            }
        }

        report
    }

    /// Roda ciclos até o shutdown ser pedido. Retorna quantos ciclos rodaram.
    pub fn run(&mut self) -> u64 {
        let mut cycles = 0u64;

        while !self.shutdown.is_requested() {
            let cycle_start = Instant::now();
            let report = self.run_cycle();
            cycles += 1;

            if report.frames_failed > 0 {
                warn!(
                    "Ciclo {cycles}: {} métricas, {}/{} chunks perdidos",
                    report.metrics_sent, report.frames_failed, report.frames_attempted
                );
            } else {
                info!(
                    "Ciclo {cycles}: {} métricas em {} chunks ({:.1}s)",
                    report.metrics_sent,
                    report.frames_attempted,
                    cycle_start.elapsed().as_secs_f64()
                );
            }

            if report.interrupted {
                break;
            }

            // Dormir pelo tempo restante do período
            let elapsed = cycle_start.elapsed();
            if elapsed < self.period && !self.shutdown.sleep(self.period - elapsed) {
                break;
            }
        }

        debug!("Loop de amostragem encerrado após {cycles} ciclos");
        cycles
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
