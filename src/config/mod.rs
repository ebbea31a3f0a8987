pub mod hardware;

use core::num::NonZeroU16;

use crate::drivers::imu::mpu6050::GyroRange;
use hardware::{i2c_addresses, system};

/// Параметры запуска конвейера
///
/// По умолчанию собираются из констант [`hardware`]; тесты уменьшают
/// число измерений и паузу.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Адрес датчика на шине
    pub device_address: u8,
    /// Диапазон гироскопа, выставляемый при старте
    pub gyro_range: GyroRange,
    /// Пауза после включения датчика (мс)
    pub startup_delay_ms: u32,
    /// Количество измерений для калибровки (всегда больше нуля)
    pub calibration_probes: NonZeroU16,
}

impl PipelineConfig {
    /// Конфигурация с заданным числом измерений калибровки
    pub fn with_probes(mut self, probes: NonZeroU16) -> Self {
        self.calibration_probes = probes;
        self
    }

    /// Конфигурация с заданной паузой после включения
    pub fn with_startup_delay_ms(mut self, delay_ms: u32) -> Self {
        self.startup_delay_ms = delay_ms;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            device_address: i2c_addresses::MPU6050_ADDR,
            gyro_range: GyroRange::Deg1000,
            startup_delay_ms: system::STARTUP_DELAY_MS,
            calibration_probes: match NonZeroU16::new(system::CALIBRATION_PROBES) {
                Some(probes) => probes,
                None => NonZeroU16::MIN,
            },
        }
    }
}
