//! Калибровка смещения нуля гироскопа

use core::num::NonZeroU16;
use nalgebra::Vector3;

use crate::config::hardware::system::CALIBRATION_PROGRESS_STEP;
use crate::data::Offset;
use crate::drivers::imu::ImuSensor;

/// Накопитель сумм показаний гироскопа по осям
///
/// Суммы 64-битные: переполнение невозможно для любого числа
/// измерений, умещающегося в `u32`.
#[derive(Debug, Clone)]
pub struct BiasAccumulator {
    sum: Vector3<i64>,
    count: u32,
}

impl BiasAccumulator {
    pub fn new() -> Self {
        Self {
            sum: Vector3::zeros(),
            count: 0,
        }
    }

    /// Добавление одного измерения
    pub fn add(&mut self, gyro: Vector3<i16>) {
        self.sum += gyro.map(i64::from);
        self.count += 1;
    }

    /// Количество накопленных измерений
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Смещение: сумма по оси, деленная нацело (с отбрасыванием дробной части)
    ///
    /// `None`, если не было ни одного измерения.
    pub fn offset(&self) -> Option<Offset> {
        if self.count == 0 {
            return None;
        }
        let n = i64::from(self.count);
        Some(Offset::new(
            (self.sum.x / n) as i32,
            (self.sum.y / n) as i32,
            (self.sum.z / n) as i32,
        ))
    }
}

impl Default for BiasAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Калибровка гироскопа: ровно `probes` измерений неподвижного датчика
///
/// Ошибки шины не обнаруживаются: что вернула шина, то и усредняется.
pub fn calibrate_gyro<S: ImuSensor>(imu: &mut S, probes: NonZeroU16) -> Offset {
    log_info!("Начало калибровки гироскопа, {} измерений", probes.get());
    log_info!("НЕ ДВИГАЙТЕ УСТРОЙСТВО!");

    let mut accumulator = BiasAccumulator::new();
    for i in 0..probes.get() {
        accumulator.add(imu.read_gyro_raw());

        if i % CALIBRATION_PROGRESS_STEP == 0 {
            log_info!("Калибровка: {}/{}", i, probes.get());
        }
    }

    // probes > 0, значит хотя бы одно измерение есть
    let offset = accumulator.offset().unwrap_or_default();

    log_info!("Калибровка завершена. Смещения гироскопа:");
    log_info!("  X: {} LSB", offset.x);
    log_info!("  Y: {} LSB", offset.y);
    log_info!("  Z: {} LSB", offset.z);

    offset
}
