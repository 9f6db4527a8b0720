//! Abertura do barramento real (Linux `/dev/i2c-N`) ou de um barramento
//! dry-run que só loga os frames.

use stats_core::bus::{BlockBus, BusError};
use stats_core::config::BusConfig;
use tracing::info;

/// Barramento que não toca no hardware: cada frame vai para o log.
#[derive(Debug, Default)]
pub struct DryRunBus {
    writes: usize,
}

impl BlockBus for DryRunBus {
    fn write_block(&mut self, address: u8, command: u8, payload: &[u8]) -> Result<(), BusError> {
        self.writes += 1;
        info!(
            "[dry-run] 0x{address:02X} cmd={command} #{} {:?}",
            self.writes,
            String::from_utf8_lossy(payload)
        );
        Ok(())
    }
}

/// Abre o barramento descrito em `config`.
pub fn open_bus(config: &BusConfig) -> Result<Box<dyn BlockBus>, BusError> {
    if config.dry_run {
        info!("Modo DRY-RUN: nenhum byte será escrito no barramento");
        return Ok(Box::new(DryRunBus::default()));
    }
    open_device(&config.device)
}

#[cfg(target_os = "linux")]
fn open_device(device: &str) -> Result<Box<dyn BlockBus>, BusError> {
    use linux_embedded_hal::I2cdev;
    use stats_core::bus::I2cBus;

    let i2c = I2cdev::new(device).map_err(|e| BusError::Open {
        device: device.to_string(),
        reason: e.to_string(),
    })?;
    info!("Barramento {device} aberto");
    Ok(Box::new(I2cBus::new(i2c)))
}

#[cfg(not(target_os = "linux"))]
fn open_device(_device: &str) -> Result<Box<dyn BlockBus>, BusError> {
    Err(BusError::Unsupported)
}
