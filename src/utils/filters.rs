//! Скользящее среднее по осям IMU

use crate::data::{Axis, OutputRecord};
use nalgebra::Vector3;

/// Скользящее среднее на кольцевом буфере фиксированной глубины `N`
///
/// Буфер сам не хранит позицию записи: индекс слота задает владелец,
/// чтобы несколько буферов писались синхронно одним курсором.
#[derive(Debug, Clone, Copy)]
pub struct MovingAverage<const N: usize> {
    buffer: [i16; N],
}

impl<const N: usize> MovingAverage<N> {
    /// Создание буфера, заполненного нулями
    pub const fn new() -> Self {
        Self { buffer: [0; N] }
    }

    /// Запись значения в слот `slot` (вытесняет старое значение)
    pub fn write(&mut self, slot: usize, value: i16) {
        self.buffer[slot % N] = value;
    }

    /// Среднее по всем `N` слотам, включая еще не записанные нули
    pub fn average(&self) -> f32 {
        let sum: i64 = self.buffer.iter().map(|&v| i64::from(v)).sum();
        sum as f32 / N as f32
    }

    /// Текущее содержимое буфера в порядке слотов
    pub fn values(&self) -> &[i16; N] {
        &self.buffer
    }
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Состояние усреднения: шесть буферов и общий курсор записи
///
/// Курсор указывает на следующий перезаписываемый слот во всех шести
/// буферах сразу. Он сдвигается только через [`AveragingState::advance`],
/// после того как обновлены все оси.
#[derive(Debug, Clone)]
pub struct AveragingState<const N: usize> {
    buffers: [MovingAverage<N>; Axis::COUNT],
    cursor: usize,
}

impl<const N: usize> AveragingState<N> {
    const DEPTH_IS_NONZERO: () = assert!(N > 0, "averaging depth must be non-zero");

    pub const fn new() -> Self {
        let _ = Self::DEPTH_IS_NONZERO;

        Self {
            buffers: [MovingAverage::new(); Axis::COUNT],
            cursor: 0,
        }
    }

    /// Глубина усреднения
    pub const fn depth(&self) -> usize {
        N
    }

    /// Слот, который будет перезаписан следующим
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Запись значения оси в слот под курсором и новое среднее по этой оси
    ///
    /// Курсор не сдвигается.
    pub fn push(&mut self, axis: Axis, value: i16) -> f32 {
        let buffer = &mut self.buffers[axis.index()];
        buffer.write(self.cursor, value);
        buffer.average()
    }

    /// Обновление всех шести осей одним курсором
    ///
    /// Порядок значений: accel x/y/z, gyro x/y/z. Курсор не сдвигается.
    pub fn update(&mut self, accel: Vector3<i16>, gyro: Vector3<i16>) -> OutputRecord {
        let mut means = [0.0f32; Axis::COUNT];
        for axis in Axis::ALL {
            let value = match axis {
                Axis::AccelX => accel.x,
                Axis::AccelY => accel.y,
                Axis::AccelZ => accel.z,
                Axis::GyroX => gyro.x,
                Axis::GyroY => gyro.y,
                Axis::GyroZ => gyro.z,
            };
            means[axis.index()] = self.push(axis, value);
        }

        OutputRecord::from_means(means)
    }

    /// Сдвиг общего курсора на один слот по модулю `N`
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % N;
    }

    /// Буфер отдельной оси
    pub fn buffer(&self, axis: Axis) -> &MovingAverage<N> {
        &self.buffers[axis.index()]
    }
}

impl<const N: usize> Default for AveragingState<N> {
    fn default() -> Self {
        Self::new()
    }
}
