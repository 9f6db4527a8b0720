use super::{BlockBus, BusError};
use std::collections::VecDeque;
use std::time::Instant;

/// Uma escrita observada pelo [`RecordingBus`].
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub address: u8,
    pub command: u8,
    pub payload: Vec<u8>,
    pub at: Instant,
    pub delivered: bool,
}

/// Barramento falso para testes: grava cada escrita e devolve o
/// resultado roteirizado. Sem roteiro, toda escrita tem sucesso.
#[derive(Default)]
pub struct RecordingBus {
    script: VecDeque<Result<(), BusError>>,
    writes: Vec<RecordedWrite>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Vec<Result<(), BusError>>) -> Self {
        Self {
            script: script.into(),
            writes: Vec::new(),
        }
    }

    /// Falha (NACK simulado) nas escritas de índice `failing`, base zero.
    pub fn failing_at(failing: &[usize]) -> Self {
        let len = failing.iter().max().map_or(0, |max| max + 1);
        let script = (0..len)
            .map(|i| {
                if failing.contains(&i) {
                    Err(BusError::Write {
                        address: 0,
                        reason: "NACK simulado".into(),
                    })
                } else {
                    Ok(())
                }
            })
            .collect();
        Self::with_script(script)
    }

    pub fn writes(&self) -> &[RecordedWrite] {
        &self.writes
    }

    /// Bytes que o receptor teria visto: payloads entregues, concatenados.
    pub fn delivered_stream(&self) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|w| w.delivered)
            .flat_map(|w| w.payload.iter().copied())
            .collect()
    }
}

impl BlockBus for RecordingBus {
    fn write_block(&mut self, address: u8, command: u8, payload: &[u8]) -> Result<(), BusError> {
        let outcome = self.script.pop_front().unwrap_or(Ok(()));
        self.writes.push(RecordedWrite {
            address,
            command,
            payload: payload.to_vec(),
            at: Instant::now(),
            delivered: outcome.is_ok(),
        });
        outcome
    }
}
