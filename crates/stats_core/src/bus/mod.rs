//! Barramento de bytes até o display.
//!
//! [`BlockBus`] é a costura entre o transporte e o hardware: uma escrita de
//! bloco para um endereço, com um byte de comando seguido do payload. No
//! fio é exatamente o que um `write_i2c_block_data` SMBus produz.

pub mod fake;

use embedded_hal::i2c::I2c;

/// Maior bloco aceito numa transferência SMBus.
pub const SMBUS_BLOCK_MAX: usize = 32;

/// Erros do barramento.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Falha ao abrir barramento {device}: {reason}")]
    Open { device: String, reason: String },

    #[error("Escrita para 0x{address:02X} falhou: {reason}")]
    Write { address: u8, reason: String },

    #[error("Payload de {len} bytes excede o limite do barramento ({max} bytes)")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Barramento I²C não suportado nesta plataforma")]
    Unsupported,
}

/// Escrita de bloco endereçada. Único ponto de contato com o hardware.
pub trait BlockBus {
    fn write_block(&mut self, address: u8, command: u8, payload: &[u8]) -> Result<(), BusError>;
}

impl<B: BlockBus + ?Sized> BlockBus for Box<B> {
    fn write_block(&mut self, address: u8, command: u8, payload: &[u8]) -> Result<(), BusError> {
        (**self).write_block(address, command, payload)
    }
}

impl<B: BlockBus + ?Sized> BlockBus for &mut B {
    fn write_block(&mut self, address: u8, command: u8, payload: &[u8]) -> Result<(), BusError> {
        (**self).write_block(address, command, payload)
    }
}

// ──────────────────────────────────────────────
// Adaptador embedded-hal
// ──────────────────────────────────────────────

/// Qualquer controlador `embedded_hal::i2c::I2c` como [`BlockBus`].
///
/// Cada bloco vira uma única transação de escrita `[comando, payload…]`.
pub struct I2cBus<T> {
    i2c: T,
    buf: Vec<u8>,
}

impl<T: I2c> I2cBus<T> {
    pub fn new(i2c: T) -> Self {
        Self {
            i2c,
            buf: Vec::with_capacity(SMBUS_BLOCK_MAX + 1),
        }
    }

    /// Devolve o controlador, encerrando o uso do barramento.
    pub fn release(self) -> T {
        self.i2c
    }
}

impl<T: I2c> BlockBus for I2cBus<T> {
    fn write_block(&mut self, address: u8, command: u8, payload: &[u8]) -> Result<(), BusError> {
        if payload.len() > SMBUS_BLOCK_MAX {
            return Err(BusError::PayloadTooLarge {
                len: payload.len(),
                max: SMBUS_BLOCK_MAX,
            });
        }

        self.buf.clear();
        self.buf.push(command);
        self.buf.extend_from_slice(payload);

        self.i2c
            .write(address, &self.buf)
            .map_err(|e| BusError::Write {
                address,
                reason: format!("{e:?}"),
            })
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
