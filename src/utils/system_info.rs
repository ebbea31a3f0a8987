//! Информация о системе и тактировании

use embassy_rp::clocks;

use crate::config::hardware::frequencies::{I2C_FREQUENCY, OUTPUT_BAUDRATE};

/// Максимальная частота I2C контроллера RP2040 (Fast-mode Plus)
const I2C_MAX_FREQUENCY: u32 = 1_000_000;

/// Структура с информацией о частотах системы
#[derive(Debug, Clone, Copy)]
pub struct SystemClocks {
    pub sys_freq: u32,
    pub peri_freq: u32,
    pub ref_freq: u32,
}

/// Получить текущие частоты системы
pub fn get_system_clocks() -> SystemClocks {
    SystemClocks {
        sys_freq: clocks::clk_sys_freq(),
        peri_freq: clocks::clk_peri_freq(),
        ref_freq: clocks::clk_ref_freq(),
    }
}

/// Вывести информацию о частотах в лог
pub fn print_clock_info() {
    let clocks = get_system_clocks();

    defmt::info!("=== Конфигурация тактирования ===");
    defmt::info!("Системная частота: {} МГц", clocks.sys_freq / 1_000_000);
    defmt::info!("Периферийная частота: {} МГц", clocks.peri_freq / 1_000_000);
    defmt::info!("Опорная частота: {} МГц", clocks.ref_freq / 1_000_000);
}

/// Проверить, что периферия успевает за выбранными скоростями шин
pub fn validate_clocks() -> Result<(), &'static str> {
    let clocks = get_system_clocks();

    // Делитель UART требует clk_peri не меньше 16 * baudrate
    if clocks.peri_freq < OUTPUT_BAUDRATE * 16 {
        return Err("Периферийная частота слишком низкая для UART");
    }

    if I2C_FREQUENCY > I2C_MAX_FREQUENCY {
        return Err("Частота I2C выше предела контроллера");
    }

    Ok(())
}
