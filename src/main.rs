#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, Config as I2cConfig};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{self, Blocking, Config as UartConfig};
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use imu_conditioner::config::hardware::frequencies::{I2C_FREQUENCY, OUTPUT_BAUDRATE};
use imu_conditioner::utils::system_info;
use imu_conditioner::{I2cBus, PipelineConfig, RecordSink, SamplePipeline};

/// Вывод записей в UART0
struct UartSink(uart::Uart<'static, UART0, Blocking>);

impl RecordSink for UartSink {
    fn write_line(&mut self, line: &str) {
        // Хосту об ошибках не сообщаем, строка просто теряется
        if let Err(e) = self.0.blocking_write(line.as_bytes()) {
            defmt::trace!("Ошибка UART: {}", e);
        }
    }
}

/// Точка входа в программу
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    // Инициализация HAL Raspberry Pi Pico
    let p = embassy_rp::init(Default::default());

    defmt::info!("=== Формирователь сигнала IMU v0.1.0 ===");
    system_info::print_clock_info();

    // Проверка корректности частот
    if let Err(e) = system_info::validate_clocks() {
        defmt::error!("Ошибка конфигурации частот: {}", e);
        panic!("Invalid clock configuration");
    }

    // Светодиод: мигание при старте, горит во время калибровки
    let mut led = Output::new(p.PIN_25, Level::Low);
    for _ in 0..3 {
        led.set_high();
        Timer::after(Duration::from_millis(100)).await;
        led.set_low();
        Timer::after(Duration::from_millis(100)).await;
    }

    // Инициализация I2C для MPU6050
    let i2c = {
        let sda = p.PIN_4; // GPIO4 - SDA
        let scl = p.PIN_5; // GPIO5 - SCL

        let mut config = I2cConfig::default();
        config.frequency = I2C_FREQUENCY;

        i2c::I2c::new_blocking(p.I2C0, scl, sda, config)
    };

    // Инициализация UART для выходных записей
    let uart_out = {
        let tx = p.PIN_0; // GPIO0 - TX
        let rx = p.PIN_1; // GPIO1 - RX

        let mut config = UartConfig::default();
        config.baudrate = OUTPUT_BAUDRATE;

        uart::Uart::new_blocking(p.UART0, tx, rx, config)
    };

    let config = PipelineConfig::default();

    led.set_high();
    let pipeline: SamplePipeline<_, _> =
        SamplePipeline::bring_up(I2cBus::new(i2c), &mut Delay, UartSink(uart_out), &config);
    led.set_low();

    // Дальше только блокирующий цикл опроса, без возврата
    pipeline.run()
}
