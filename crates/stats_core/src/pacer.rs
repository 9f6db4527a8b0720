//! Espaçamento mínimo entre escritas consecutivas no barramento.
//!
//! O display tem buffer pequeno; cada frame precisa de tempo para ser
//! consumido antes do próximo chegar.

use std::time::{Duration, Instant};

/// Atraso padrão entre chunks.
pub const CHUNK_DELAY: Duration = Duration::from_millis(200);

/// Maior atraso aceito entre chunks.
pub const MAX_CHUNK_DELAY: Duration = Duration::from_secs(10);

/// Pacer baseado em relógio monotônico.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    /// `interval` acima de [`MAX_CHUNK_DELAY`] é limitado a ele.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.min(MAX_CHUNK_DELAY),
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Bloqueia até que `interval` tenha passado desde o último [`mark`].
    ///
    /// Sem `mark` anterior não espera. Retorna quanto tempo dormiu.
    ///
    /// [`mark`]: Pacer::mark
    pub fn wait(&self) -> Duration {
        let Some(last) = self.last else {
            return Duration::ZERO;
        };
        let now = Instant::now();
        let Some(ready_at) = last.checked_add(self.interval) else {
            std::thread::sleep(self.interval);
            return self.interval;
        };
        if ready_at <= now {
            return Duration::ZERO;
        }
        let slept = ready_at - now;
        std::thread::sleep(slept);
        slept
    }

    /// Registra o fim de uma escrita; o próximo `wait` conta a partir daqui.
    pub fn mark(&mut self) {
        self.last = Some(Instant::now());
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(CHUNK_DELAY)
    }
}
