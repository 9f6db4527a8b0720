//! Protocolo de fio entre o host e o display.
//!
//! Cada registro é codificado como UTF‑8 e fatiado em frames de tamanho
//! fixo, porque o barramento aceita no máximo 32 bytes por transferência:
//!
//! ```text
//! "CPU_USAGE:12.5\nSTORAGE_TOTAL:29.72\n"
//!  └── frame 0 (≤ 30 bytes) ──┘└ frame 1 ┘
//! ```
//!
//! - Sem header, sem número de sequência, sem checksum
//! - O receptor remonta as linhas concatenando os frames na ordem de chegada

use crate::types::MetricRecord;
use std::num::NonZeroUsize;

/// Tamanho máximo de um frame (payload por escrita no barramento).
pub const MAX_CHUNK_SIZE: usize = 30;

/// Byte de comando/registrador usado em toda escrita.
pub const COMMAND_BYTE: u8 = 0;

/// Codifica um registro como bytes `"{nome}:{valor}\n"`.
pub fn encode_record(record: &MetricRecord) -> Vec<u8> {
    record.to_line().into_bytes()
}

/// Fatia `data` em frames de até `max` bytes, em ordem.
///
/// Entrada vazia não produz nenhum frame.
pub fn frames(data: &[u8], max: NonZeroUsize) -> std::slice::Chunks<'_, u8> {
    data.chunks(max.get())
}

/// Quantidade de frames que [`frames`] produz para `len` bytes.
pub fn frame_count(len: usize, max: NonZeroUsize) -> usize {
    len.div_ceil(max.get())
}

/// [`MAX_CHUNK_SIZE`] como `NonZeroUsize`.
pub fn default_chunk_size() -> NonZeroUsize {
    NonZeroUsize::new(MAX_CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
