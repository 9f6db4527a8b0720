//! Envio de registros em chunks pelo barramento.
//!
//! Política *best effort*: uma falha de escrita é logada e o envio segue
//! para o próximo chunk. O chunk perdido corrompe aquele valor no display,
//! mas o ciclo seguinte reenvia tudo.

use crate::bus::BlockBus;
use crate::pacer::{CHUNK_DELAY, Pacer};
use crate::protocol::{COMMAND_BYTE, default_chunk_size, encode_record, frames};
use crate::shutdown::ShutdownFlag;
use crate::types::MetricRecord;
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::{info, warn};

/// Endereço de destino no barramento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub address: u8,
    pub command: u8,
}

impl Destination {
    /// Endereço padrão do display (Wio Terminal em modo slave).
    pub const DEFAULT_ADDRESS: u8 = 0x08;

    pub fn new(address: u8) -> Self {
        Self {
            address,
            command: COMMAND_BYTE,
        }
    }
}

impl Default for Destination {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ADDRESS)
    }
}

/// Parâmetros do transporte.
#[derive(Debug, Clone, Copy)]
pub struct TransportSettings {
    pub max_chunk: NonZeroUsize,
    pub chunk_delay: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            max_chunk: default_chunk_size(),
            chunk_delay: CHUNK_DELAY,
        }
    }
}

/// Resultado do envio de um registro.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    /// Escritas tentadas
    pub attempted: usize,
    /// Escritas que falharam
    pub failed: usize,
    /// Envio parado por pedido de shutdown
    pub interrupted: bool,
}

impl SendReport {
    pub fn delivered(&self) -> usize {
        self.attempted - self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0 && !self.interrupted
    }
}

/// Dono do barramento durante a vida do processo.
pub struct ChunkSender<B: BlockBus> {
    bus: B,
    destination: Destination,
    max_chunk: NonZeroUsize,
    pacer: Pacer,
    shutdown: Option<ShutdownFlag>,
}

impl<B: BlockBus> ChunkSender<B> {
    pub fn new(bus: B, destination: Destination, settings: TransportSettings) -> Self {
        Self {
            bus,
            destination,
            max_chunk: settings.max_chunk,
            pacer: Pacer::new(settings.chunk_delay),
            shutdown: None,
        }
    }

    /// Para antes do próximo chunk quando `flag` for ligada.
    pub fn with_shutdown(mut self, flag: ShutdownFlag) -> Self {
        self.shutdown = Some(flag);
        self
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Encerra o sender e devolve o barramento para ser liberado.
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Formata, fatia e envia um registro.
    pub fn send_record(&mut self, record: &MetricRecord) -> SendReport {
        let encoded = encode_record(record);
        let max_chunk = self.max_chunk;
        self.send_frames(frames(&encoded, max_chunk))
    }

    /// Envia frames já fatiados, em ordem, um por escrita.
    pub fn send_frames<'a, I>(&mut self, chunks: I) -> SendReport
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let Destination { address, command } = self.destination;
        let mut report = SendReport::default();

        for frame in chunks {
            if self.stop_requested() {
                report.interrupted = true;
                break;
            }

            self.pacer.wait();
            // O pedido pode ter chegado durante a espera
            if self.stop_requested() {
                report.interrupted = true;
                break;
            }

            let text = String::from_utf8_lossy(frame);
            info!("Enviando chunk: {text:?}");
            report.attempted += 1;

            if let Err(e) = self.bus.write_block(address, command, frame) {
                report.failed += 1;
                warn!("Erro ao enviar chunk {text:?} para 0x{address:02X}: {e}");
            }
            self.pacer.mark();
        }

        report
    }

    fn stop_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(ShutdownFlag::is_requested)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusError;
    use crate::bus::fake::RecordingBus;
    use crate::types::MetricValue;
    use std::thread;

    /// Liga o flag de shutdown de dentro da escrita de índice `at`.
    struct StopDuringWrite {
        inner: RecordingBus,
        flag: ShutdownFlag,
        at: usize,
    }

    impl BlockBus for StopDuringWrite {
        fn write_block(&mut self, address: u8, command: u8, payload: &[u8]) -> Result<(), BusError> {
            let index = self.inner.writes().len();
            let outcome = self.inner.write_block(address, command, payload);
            if index == self.at {
                self.flag.request();
            }
            outcome
        }
    }

    fn fast() -> TransportSettings {
        TransportSettings {
            chunk_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    #[test]
    fn short_record_is_one_write() {
        let mut sender = ChunkSender::new(RecordingBus::new(), Destination::default(), fast());
        let record = MetricRecord::new("CPU_TEMP", MetricValue::number(45.6, 1));

        let report = sender.send_record(&record);

        assert_eq!(report.attempted, 1);
        assert!(report.is_complete());
        let writes = sender.bus().writes();
        assert_eq!(writes[0].address, 0x08);
        assert_eq!(writes[0].command, 0);
        assert_eq!(writes[0].payload, b"CPU_TEMP:45.6\n");
    }

    #[test]
    fn middle_chunk_failure_does_not_stop_the_record() {
        let frames: [&[u8]; 3] = [b"one", b"two", b"three"];
        let mut sender = ChunkSender::new(RecordingBus::failing_at(&[1]), Destination::default(), fast());

        let report = sender.send_frames(frames);

        assert_eq!(report.attempted, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered(), 2);
        let sent: Vec<&[u8]> = sender.bus().writes().iter().map(|w| w.payload.as_slice()).collect();
        assert_eq!(sent, frames);
        assert_eq!(sender.bus().delivered_stream(), b"onethree");
    }

    #[test]
    fn failure_in_one_record_leaves_next_record_intact() {
        let mut sender = ChunkSender::new(RecordingBus::failing_at(&[0]), Destination::default(), fast());

        let first = sender.send_record(&MetricRecord::new("RAM_TOTAL", MetricValue::number(3906.0, 2)));
        let second = sender.send_record(&MetricRecord::new("RAM_FREE", MetricValue::number(2900.5, 2)));

        assert_eq!(first.failed, 1);
        assert!(second.is_complete());
        assert_eq!(sender.bus().delivered_stream(), b"RAM_FREE:2900.5\n");
    }

    #[test]
    fn writes_are_paced_across_records() {
        let delay = Duration::from_millis(20);
        let settings = TransportSettings {
            max_chunk: NonZeroUsize::new(4).unwrap(),
            chunk_delay: delay,
        };
        let mut sender = ChunkSender::new(RecordingBus::new(), Destination::default(), settings);

        sender.send_record(&MetricRecord::new("AB", MetricValue::text("C"))); // "AB:C\n" → 2 frames
        sender.send_record(&MetricRecord::new("D", MetricValue::text("E"))); // "D:E\n" → 1 frame

        let writes = sender.bus().writes();
        assert_eq!(writes.len(), 3);
        for pair in writes.windows(2) {
            assert!(pair[1].at.duration_since(pair[0].at) >= delay);
        }
    }

    #[test]
    fn shutdown_stops_before_next_chunk() {
        let flag = ShutdownFlag::new();
        let mut sender = ChunkSender::new(RecordingBus::new(), Destination::default(), fast())
            .with_shutdown(flag.clone());

        flag.request();
        let report = sender.send_frames([b"never".as_slice()]);

        assert!(report.interrupted);
        assert_eq!(report.attempted, 0);
        assert!(sender.into_bus().writes().is_empty());
    }

    #[test]
    fn shutdown_during_write_finishes_it_and_skips_the_rest() {
        let flag = ShutdownFlag::new();
        let bus = StopDuringWrite {
            inner: RecordingBus::new(),
            flag: flag.clone(),
            at: 0,
        };
        let mut sender = ChunkSender::new(bus, Destination::default(), fast()).with_shutdown(flag);

        let report = sender.send_frames([b"first".as_slice(), b"second".as_slice()]);

        assert!(report.interrupted);
        assert_eq!(report.attempted, 1);
        assert_eq!(report.failed, 0);
        let bus = sender.into_bus();
        assert_eq!(bus.inner.writes().len(), 1);
        assert_eq!(bus.inner.delivered_stream(), b"first");
    }

    #[test]
    fn shutdown_during_pacing_skips_the_pending_chunk() {
        let flag = ShutdownFlag::new();
        let settings = TransportSettings {
            chunk_delay: Duration::from_millis(300),
            ..Default::default()
        };
        let mut sender = ChunkSender::new(RecordingBus::new(), Destination::default(), settings)
            .with_shutdown(flag.clone());

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            flag.request();
        });
        let report = sender.send_frames([b"one".as_slice(), b"two".as_slice()]);
        stopper.join().unwrap();

        assert!(report.interrupted);
        assert_eq!(report.attempted, 1);
        assert_eq!(sender.bus().delivered_stream(), b"one");
    }

    #[test]
    fn empty_frames_send_nothing() {
        let mut sender = ChunkSender::new(RecordingBus::new(), Destination::default(), fast());
        let report = sender.send_frames(std::iter::empty());
        assert_eq!(report, SendReport::default());
    }
}
