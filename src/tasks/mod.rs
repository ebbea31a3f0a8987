pub mod sensor_task;
