//! Формирователь сигнала гироскопа и акселерометра MPU-6050
//!
//! Читает сырые отсчеты по I2C, вычитает смещение нуля гироскопа,
//! найденное при старте, сглаживает каждую ось скользящим средним
//! и выдает строку `ax,ay,az,gx,gy,gz` на каждый цикл опроса.
//!
//! Вся логика не зависит от платформы и собирается на хосте;
//! привязка к RP2040 находится в бинарнике (фича `rp2040`).

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod utils;

pub mod config;
pub mod data;
pub mod drivers;
pub mod sensors;
pub mod tasks;

pub use config::PipelineConfig;
pub use data::{Axis, Offset, OutputRecord, RawSample};
pub use drivers::bus::{I2cBus, RegisterBus};
pub use drivers::imu::{ImuSensor, Mpu6050};
pub use sensors::calibration::{calibrate_gyro, BiasAccumulator};
pub use tasks::sensor_task::{RecordSink, SamplePipeline};
pub use utils::filters::{AveragingState, MovingAverage};
