// src/data/mod.rs
use core::fmt::Write;
use heapless::String;
use nalgebra::Vector3;

/// Максимальная длина строки записи: 6 полей по "-32768.00", 6 запятых и перевод строки
pub const RECORD_LINE_CAPACITY: usize = 64;

/// Ось датчика в порядке вывода
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    AccelX,
    AccelY,
    AccelZ,
    GyroX,
    GyroY,
    GyroZ,
}

impl Axis {
    pub const COUNT: usize = 6;

    /// Все оси в порядке полей выходной записи
    pub const ALL: [Axis; Axis::COUNT] = [
        Axis::AccelX,
        Axis::AccelY,
        Axis::AccelZ,
        Axis::GyroX,
        Axis::GyroY,
        Axis::GyroZ,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Сырые данные одного цикла опроса (в единицах LSB)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawSample {
    pub accel: Vector3<i16>,
    pub temperature: i16,
    pub gyro: Vector3<i16>,
}

impl RawSample {
    /// Температура кристалла: T = TEMP_OUT / 340 + 36.53
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature as f32 / 340.0 + 36.53
    }
}

/// Смещение нуля гироскопа, найденное при калибровке
///
/// Вычисляется один раз при старте и дальше только читается.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Вычитание смещения из показаний гироскопа
    ///
    /// Результат насыщается в диапазон i16, а не переворачивает знак.
    pub fn correct(&self, gyro: Vector3<i16>) -> Vector3<i16> {
        Vector3::new(
            subtract_saturating(gyro.x, self.x),
            subtract_saturating(gyro.y, self.y),
            subtract_saturating(gyro.z, self.z),
        )
    }
}

fn subtract_saturating(value: i16, offset: i32) -> i16 {
    let corrected = i32::from(value).saturating_sub(offset);
    corrected.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Сглаженные значения одного цикла
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputRecord {
    pub accel: Vector3<f32>,
    pub gyro: Vector3<f32>,
}

impl OutputRecord {
    /// Сборка записи из средних в порядке [`Axis::ALL`]
    pub fn from_means(means: [f32; Axis::COUNT]) -> Self {
        Self {
            accel: Vector3::new(means[0], means[1], means[2]),
            gyro: Vector3::new(means[3], means[4], means[5]),
        }
    }

    /// Поля записи в порядке вывода
    pub fn fields(&self) -> [f32; Axis::COUNT] {
        [
            self.accel.x,
            self.accel.y,
            self.accel.z,
            self.gyro.x,
            self.gyro.y,
            self.gyro.z,
        ]
    }

    /// Текстовая строка `ax,ay,az,gx,gy,gz\n` с двумя знаками после точки
    ///
    /// Округление половины от нуля, как у `Serial.print` в прошивке
    /// аддона: при глубине 8 средние кратны 0.125, и четверть из них
    /// попадает ровно на середину. С фичей `legacy-record` после
    /// последнего поля ставится запятая.
    pub fn to_line(&self) -> String<RECORD_LINE_CAPACITY> {
        let mut line = String::new();
        for (i, value) in self.fields().iter().enumerate() {
            if i > 0 {
                let _ = line.push(',');
            }
            // Емкость рассчитана на худший случай, запись не может переполниться
            let _ = write_hundredths(&mut line, *value);
        }
        if cfg!(feature = "legacy-record") {
            let _ = line.push(',');
        }
        let _ = line.push('\n');
        line
    }
}

/// Запись числа с двумя знаками, половина сотой округляется от нуля
fn write_hundredths<W: Write>(out: &mut W, value: f32) -> core::fmt::Result {
    let negative = value < 0.0;
    let magnitude = if negative { -f64::from(value) } else { f64::from(value) };
    // Приведение к u64 отбрасывает дробную часть
    let hundredths = (magnitude * 100.0 + 0.5) as u64;
    let sign = if negative { "-" } else { "" };
    write!(out, "{}{}.{:02}", sign, hundredths / 100, hundredths % 100)
}
