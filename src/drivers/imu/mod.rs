pub mod mpu6050;

use nalgebra::Vector3;

use crate::data::RawSample;

pub use mpu6050::{GyroRange, Mpu6050};

/// Трейт для IMU датчиков
pub trait ImuSensor {
    /// Полный кадр: акселерометр, температура, гироскоп
    fn read_raw(&mut self) -> RawSample;

    /// Только гироскоп (для калибровки)
    fn read_gyro_raw(&mut self) -> Vector3<i16>;
}

impl<T: ImuSensor + ?Sized> ImuSensor for &mut T {
    fn read_raw(&mut self) -> RawSample {
        T::read_raw(self)
    }

    fn read_gyro_raw(&mut self) -> Vector3<i16> {
        T::read_gyro_raw(self)
    }
}
