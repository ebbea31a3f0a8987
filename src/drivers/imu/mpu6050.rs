use embedded_hal::delay::DelayNs;
use nalgebra::Vector3;

use super::ImuSensor;
use crate::data::RawSample;
use crate::drivers::bus::RegisterBus;

/// Регистры MPU6050
pub mod regs {
    pub const PWR_MGMT_1: u8 = 0x6B;      // Управление питанием
    pub const GYRO_CONFIG: u8 = 0x1B;     // Конфигурация гироскопа
    pub const WHO_AM_I: u8 = 0x75;        // Идентификатор устройства

    // Регистры данных
    pub const ACCEL_XOUT_H: u8 = 0x3B;    // Старший байт X акселерометра, начало полного кадра
    pub const GYRO_XOUT_H: u8 = 0x43;     // Старший байт X гироскопа, начало кадра гироскопа
}

/// Длина полного кадра: accel x/y/z, температура, gyro x/y/z по 2 байта
pub const FRAME_LEN: usize = 14;

/// Длина кадра гироскопа: gyro x/y/z по 2 байта
pub const GYRO_FRAME_LEN: usize = 6;

/// Значение PWR_MGMT_1 для выхода из сна
const WAKE_UP: u8 = 0x00;

/// Диапазон измерения гироскопа
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroRange {
    /// ±250°/s
    Deg250 = 0x00,
    /// ±500°/s
    Deg500 = 0x08,
    /// ±1000°/s
    Deg1000 = 0x10,
    /// ±2000°/s
    Deg2000 = 0x18,
}

/// Два байта регистра (старший, затем младший) в знаковое 16-битное значение
#[inline(always)]
pub const fn decode_word(high: u8, low: u8) -> i16 {
    i16::from_be_bytes([high, low])
}

/// Разбор полного кадра, начинающегося с ACCEL_XOUT_H
pub fn decode_frame(frame: &[u8; FRAME_LEN]) -> RawSample {
    RawSample {
        accel: Vector3::new(
            decode_word(frame[0], frame[1]),
            decode_word(frame[2], frame[3]),
            decode_word(frame[4], frame[5]),
        ),
        temperature: decode_word(frame[6], frame[7]),
        gyro: Vector3::new(
            decode_word(frame[8], frame[9]),
            decode_word(frame[10], frame[11]),
            decode_word(frame[12], frame[13]),
        ),
    }
}

/// Разбор кадра гироскопа, начинающегося с GYRO_XOUT_H
pub fn decode_gyro(frame: &[u8; GYRO_FRAME_LEN]) -> Vector3<i16> {
    Vector3::new(
        decode_word(frame[0], frame[1]),
        decode_word(frame[2], frame[3]),
        decode_word(frame[4], frame[5]),
    )
}

/// Драйвер MPU6050 поверх шины регистров
///
/// Буферы кадров живут столько же, сколько драйвер. Если шина не
/// смогла прочитать кадр, в буфере остаются байты прошлого успешного
/// чтения, и они декодируются повторно.
pub struct Mpu6050<B> {
    /// Шина регистров
    bus: B,
    /// Адрес устройства
    addr: u8,
    /// Диапазон гироскопа
    gyro_range: GyroRange,
    frame: [u8; FRAME_LEN],
    gyro_frame: [u8; GYRO_FRAME_LEN],
}

impl<B: RegisterBus> Mpu6050<B> {
    /// Создание нового экземпляра драйвера (без обращения к шине)
    pub fn new(bus: B, addr: u8) -> Self {
        Self {
            bus,
            addr,
            gyro_range: GyroRange::Deg250,
            frame: [0; FRAME_LEN],
            gyro_frame: [0; GYRO_FRAME_LEN],
        }
    }

    /// Включение датчика, выбор диапазона гироскопа и пауза на стабилизацию
    pub fn init<D: DelayNs>(&mut self, gyro_range: GyroRange, delay: &mut D, startup_delay_ms: u32) {
        let who_am_i = self.who_am_i();
        if !matches!(who_am_i, 0x68 | 0x70 | 0x72) {
            log_warn!("Неожиданный ID устройства: {=u8:#x}", who_am_i);
        } else {
            log_info!("MPU6050 найден, ID {=u8:#x}", who_am_i);
        }

        // Выход из режима сна
        self.write_register(regs::PWR_MGMT_1, WAKE_UP);

        // Диапазон гироскопа не меняется после старта
        self.write_register(regs::GYRO_CONFIG, gyro_range as u8);
        self.gyro_range = gyro_range;
        log_info!("Диапазон гироскопа: {=u8:#x}", gyro_range as u8);

        delay.delay_ms(startup_delay_ms);
        log_info!("MPU6050 инициализирован");
    }

    /// Чтение идентификатора устройства
    pub fn who_am_i(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        self.bus.read_registers(self.addr, regs::WHO_AM_I, &mut buf);
        buf[0]
    }

    /// Текущий диапазон гироскопа
    pub fn gyro_range(&self) -> GyroRange {
        self.gyro_range
    }

    /// Доступ к шине
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Освобождение шины
    pub fn release(self) -> B {
        self.bus
    }

    /// Запись в регистр
    fn write_register(&mut self, reg: u8, value: u8) {
        self.bus.write_register(self.addr, reg, value);
    }
}

impl<B: RegisterBus> ImuSensor for Mpu6050<B> {
    fn read_raw(&mut self) -> RawSample {
        // Все 14 байт одной операцией (с ACCEL_XOUT_H по GYRO_ZOUT_L)
        self.bus.read_registers(self.addr, regs::ACCEL_XOUT_H, &mut self.frame);
        decode_frame(&self.frame)
    }

    fn read_gyro_raw(&mut self) -> Vector3<i16> {
        self.bus.read_registers(self.addr, regs::GYRO_XOUT_H, &mut self.gyro_frame);
        decode_gyro(&self.gyro_frame)
    }
}
