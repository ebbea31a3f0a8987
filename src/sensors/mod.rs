pub mod calibration;

pub use calibration::{calibrate_gyro, BiasAccumulator};
