use core::num::NonZeroU16;

use embedded_hal::delay::DelayNs;

use crate::config::hardware::filters::AVERAGE_DEPTH;
#[cfg(feature = "debug-sensors")]
use crate::config::hardware::system::DEBUG_SAMPLE_PERIOD;
use crate::config::PipelineConfig;
use crate::data::{Offset, OutputRecord};
use crate::drivers::bus::RegisterBus;
use crate::drivers::imu::{ImuSensor, Mpu6050};
use crate::sensors::calibration::calibrate_gyro;
use crate::utils::filters::AveragingState;

/// Приемник текстовых записей
///
/// Запись всегда считается доставленной, ошибок вызывающий не видит.
pub trait RecordSink {
    /// Передача одной строки вместе с переводом строки
    fn write_line(&mut self, line: &str);
}

impl<T: RecordSink + ?Sized> RecordSink for &mut T {
    fn write_line(&mut self, line: &str) {
        T::write_line(self, line)
    }
}

/// Конвейер обработки: калибровка при старте, затем бесконечный цикл
/// чтение → коррекция → усреднение → вывод
///
/// Калибровка выполняется в конструкторе [`SamplePipeline::start`], так
/// что существующий конвейер всегда в рабочем режиме и его смещение
/// больше не меняется.
pub struct SamplePipeline<S, K, const N: usize = AVERAGE_DEPTH> {
    imu: S,
    sink: K,
    offset: Offset,
    averaging: AveragingState<N>,
    cycles: u32,
}

impl<B, K, const N: usize> SamplePipeline<Mpu6050<B>, K, N>
where
    B: RegisterBus,
    K: RecordSink,
{
    /// Полный запуск MPU6050: включение, выбор диапазона, пауза, калибровка
    pub fn bring_up<D: DelayNs>(bus: B, delay: &mut D, sink: K, config: &PipelineConfig) -> Self {
        let mut imu = Mpu6050::new(bus, config.device_address);
        imu.init(config.gyro_range, delay, config.startup_delay_ms);
        Self::start(imu, sink, config.calibration_probes)
    }
}

impl<S, K, const N: usize> SamplePipeline<S, K, N>
where
    S: ImuSensor,
    K: RecordSink,
{
    /// Калибровка гироскопа и переход в рабочий режим
    pub fn start(mut imu: S, sink: K, probes: NonZeroU16) -> Self {
        log_info!("Калибровка IMU, не двигайте устройство...");
        let offset = calibrate_gyro(&mut imu, probes);
        log_info!("Калибровка завершена, рабочий режим");

        Self::with_offset(imu, sink, offset)
    }

    /// Рабочий режим с заранее известным смещением, без калибровки
    pub fn with_offset(imu: S, sink: K, offset: Offset) -> Self {
        Self {
            imu,
            sink,
            offset,
            averaging: AveragingState::new(),
            cycles: 0,
        }
    }

    /// Один цикл опроса
    ///
    /// Все шесть осей пишутся в слот под курсором, запись уходит в
    /// приемник, и только после этого курсор сдвигается.
    pub fn cycle(&mut self) -> OutputRecord {
        let raw = self.imu.read_raw();

        // Температура и акселерометр не корректируются
        let gyro = self.offset.correct(raw.gyro);
        let record = self.averaging.update(raw.accel, gyro);

        self.sink.write_line(record.to_line().as_str());
        self.averaging.advance();

        #[cfg(feature = "debug-sensors")]
        if self.cycles % DEBUG_SAMPLE_PERIOD == 0 {
            log_debug!(
                "raw accel=({}, {}, {}) gyro=({}, {}, {}) temp={}°C",
                raw.accel.x,
                raw.accel.y,
                raw.accel.z,
                raw.gyro.x,
                raw.gyro.y,
                raw.gyro.z,
                raw.temperature_celsius()
            );
        }
        self.cycles = self.cycles.wrapping_add(1);

        record
    }

    /// Бесконечный цикл без пауз между итерациями
    pub fn run(mut self) -> ! {
        log_info!("Начало выдачи данных");
        loop {
            self.cycle();
        }
    }

    /// Смещение нуля гироскопа
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Состояние усреднения
    pub fn averaging(&self) -> &AveragingState<N> {
        &self.averaging
    }

    /// Количество выполненных циклов (по модулю 2^32)
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn imu(&self) -> &S {
        &self.imu
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }
}
