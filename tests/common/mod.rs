//! Имитатор MPU-6050 на шине I2C embedded-hal

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use imu_conditioner::RecordSink;

pub const DEVICE_ADDR: u8 = 0x68;

const PWR_MGMT_1: u8 = 0x6B;
const WHO_AM_I: u8 = 0x75;
const ACCEL_XOUT_H: usize = 0x3B;
const TEMP_OUT_H: usize = 0x41;
const GYRO_XOUT_H: usize = 0x43;
const SLEEP: u8 = 0x40;

#[derive(Debug)]
pub struct MockError(pub ErrorKind);

impl embedded_hal::i2c::Error for MockError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

pub struct SimState {
    regs: [u8; 128],
    /// Записи в регистры по порядку: (регистр, значение)
    pub writes: Vec<(u8, u8)>,
    /// Чтения по порядку: (начальный регистр, длина)
    pub reads: Vec<(u8, usize)>,
    /// Все передачи завершаются ошибкой, буфер чтения при этом портится
    pub fail: bool,
}

/// Общий регистровый файл: клоны видят одно и то же состояние
#[derive(Clone)]
pub struct SimulatedMpu6050 {
    pub state: Rc<RefCell<SimState>>,
}

impl SimulatedMpu6050 {
    pub fn new() -> Self {
        let mut regs = [0u8; 128];
        regs[WHO_AM_I as usize] = 0x68;
        regs[PWR_MGMT_1 as usize] = SLEEP;
        Self {
            state: Rc::new(RefCell::new(SimState {
                regs,
                writes: Vec::new(),
                reads: Vec::new(),
                fail: false,
            })),
        }
    }

    fn set_words(&self, start: usize, words: &[i16]) {
        let mut state = self.state.borrow_mut();
        for (i, word) in words.iter().enumerate() {
            let [high, low] = word.to_be_bytes();
            state.regs[start + 2 * i] = high;
            state.regs[start + 2 * i + 1] = low;
        }
    }

    pub fn set_accel(&self, x: i16, y: i16, z: i16) {
        self.set_words(ACCEL_XOUT_H, &[x, y, z]);
    }

    pub fn set_temperature(&self, raw: i16) {
        self.set_words(TEMP_OUT_H, &[raw]);
    }

    pub fn set_gyro(&self, x: i16, y: i16, z: i16) {
        self.set_words(GYRO_XOUT_H, &[x, y, z]);
    }

    pub fn set_fail(&self, fail: bool) {
        self.state.borrow_mut().fail = fail;
    }

    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.state.borrow().writes.clone()
    }

    pub fn reads(&self) -> Vec<(u8, usize)> {
        self.state.borrow().reads.clone()
    }

    pub fn is_awake(&self) -> bool {
        self.state.borrow().regs[PWR_MGMT_1 as usize] & SLEEP == 0
    }
}

impl ErrorType for SimulatedMpu6050 {
    type Error = MockError;
}

impl I2c for SimulatedMpu6050 {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if address != DEVICE_ADDR {
            return Err(MockError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
        }

        let mut state = self.state.borrow_mut();
        let mut pointer = 0usize;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if let Some((&register, values)) = bytes.split_first() {
                        pointer = register as usize;
                        for (i, &value) in values.iter().enumerate() {
                            state.writes.push((register + i as u8, value));
                            state.regs[pointer + i] = value;
                        }
                    }
                }
                Operation::Read(buf) => {
                    if state.fail {
                        // Оборванная передача оставляет мусор в буфере
                        buf.fill(0xEE);
                        return Err(MockError(ErrorKind::ArbitrationLoss));
                    }
                    state.reads.push((pointer as u8, buf.len()));
                    let asleep = state.regs[PWR_MGMT_1 as usize] & SLEEP != 0;
                    for (i, byte) in buf.iter_mut().enumerate() {
                        let register = pointer + i;
                        // Во сне регистры данных читаются нулями
                        let is_data = (ACCEL_XOUT_H..GYRO_XOUT_H + 6).contains(&register);
                        *byte = if asleep && is_data { 0 } else { state.regs[register] };
                    }
                }
            }
        }
        if state.fail {
            return Err(MockError(ErrorKind::ArbitrationLoss));
        }
        Ok(())
    }
}

/// Задержка, которая только суммирует запрошенное время
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Приемник, собирающий выданные строки
#[derive(Debug, Default)]
pub struct Lines(pub Vec<String>);

impl RecordSink for Lines {
    fn write_line(&mut self, line: &str) {
        self.0.push(line.to_owned());
    }
}
