//! Конфигурация аппаратного обеспечения формирователя

/// Конфигурация частот и скоростей
pub mod frequencies {
    /// Частота I2C шины (Гц)
    pub const I2C_FREQUENCY: u32 = 400_000; // 400 kHz

    /// Скорость UART для выходных записей (бод)
    pub const OUTPUT_BAUDRATE: u32 = 115_200;
}

/// Адреса I2C устройств
pub mod i2c_addresses {
    /// Адрес MPU6050 IMU
    pub const MPU6050_ADDR: u8 = 0x68;
}

/// Параметры системы
pub mod system {
    /// Пауза после включения датчика перед калибровкой (мс)
    pub const STARTUP_DELAY_MS: u32 = 1000;

    /// Количество измерений при калибровке гироскопа
    pub const CALIBRATION_PROBES: u16 = 1024;

    /// Период вывода прогресса калибровки (в измерениях)
    pub const CALIBRATION_PROGRESS_STEP: u16 = 128;

    /// Период отладочного вывода сырых данных (в циклах)
    pub const DEBUG_SAMPLE_PERIOD: u32 = 256;
}

/// Параметры фильтрации
pub mod filters {
    /// Глубина скользящего среднего для каждой оси
    pub const AVERAGE_DEPTH: usize = 8;
}
