//! Доступ к регистрам датчика по двухпроводной шине

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

/// Максимальная длина одного чтения (размер промежуточного буфера)
pub const MAX_BURST: usize = 32;

/// Шина регистров датчика
///
/// Обе операции блокирующие и с точки зрения вызывающего всегда успешны.
/// Если передача не удалась, реализация обязана оставить `buf`
/// нетронутым: вызывающий тогда заново декодирует байты предыдущей
/// успешной передачи и никак не отличает их от свежих.
pub trait RegisterBus {
    /// Запись одного байта в регистр устройства
    fn write_register(&mut self, device: u8, register: u8, value: u8);

    /// Чтение `buf.len()` байт подряд начиная с регистра `register`
    fn read_registers(&mut self, device: u8, register: u8, buf: &mut [u8]);
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn write_register(&mut self, device: u8, register: u8, value: u8) {
        T::write_register(self, device, register, value)
    }

    fn read_registers(&mut self, device: u8, register: u8, buf: &mut [u8]) {
        T::read_registers(self, device, register, buf)
    }
}

/// Ошибка обмена по I2C
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Ошибка записи в регистр
    Write { register: u8, kind: ErrorKind },
    /// Ошибка чтения регистров
    Read { register: u8, kind: ErrorKind },
}

// Реализация Format для defmt
#[cfg(feature = "defmt")]
impl defmt::Format for BusError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            BusError::Write { register, kind } => defmt::write!(
                fmt,
                "I2C write to reg {=u8:#x}: {}",
                register,
                defmt::Debug2Format(kind)
            ),
            BusError::Read { register, kind } => defmt::write!(
                fmt,
                "I2C read from reg {=u8:#x}: {}",
                register,
                defmt::Debug2Format(kind)
            ),
        }
    }
}

/// Счетчики неудачных передач
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    pub writes_failed: u32,
    pub reads_failed: u32,
}

/// Адаптер блокирующей шины embedded-hal к [`RegisterBus`]
///
/// Ошибки не пробрасываются выше: они считаются, последняя запоминается,
/// начало и конец серии сбоев пишутся в лог. Чтение длиннее
/// [`MAX_BURST`] байт не выполняется и считается сбоем.
pub struct I2cBus<I> {
    i2c: I,
    stats: BusStats,
    last_error: Option<BusError>,
    faulted: bool,
}

impl<I: I2c> I2cBus<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            stats: BusStats::default(),
            last_error: None,
            faulted: false,
        }
    }

    /// Счетчики сбоев с момента запуска
    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Последняя ошибка шины, если была
    pub fn last_error(&self) -> Option<BusError> {
        self.last_error
    }

    /// Освобождение периферии
    pub fn release(self) -> I {
        self.i2c
    }

    fn record_success(&mut self) {
        if self.faulted {
            log_info!("Обмен по I2C восстановлен");
            self.faulted = false;
        }
    }

    fn record_failure(&mut self, error: BusError) {
        match error {
            BusError::Write { .. } => self.stats.writes_failed = self.stats.writes_failed.wrapping_add(1),
            BusError::Read { .. } => self.stats.reads_failed = self.stats.reads_failed.wrapping_add(1),
        }
        if !self.faulted {
            log_warn!("Сбой обмена по I2C: {}", error);
            self.faulted = true;
        }
        self.last_error = Some(error);
    }
}

impl<I: I2c> RegisterBus for I2cBus<I> {
    fn write_register(&mut self, device: u8, register: u8, value: u8) {
        match self.i2c.write(device, &[register, value]) {
            Ok(()) => self.record_success(),
            Err(e) => self.record_failure(BusError::Write { register, kind: e.kind() }),
        }
    }

    fn read_registers(&mut self, device: u8, register: u8, buf: &mut [u8]) {
        let len = buf.len();
        if len > MAX_BURST {
            // Длиннее промежуточного буфера не читаем, данные вызывающего не трогаем
            self.record_failure(BusError::Read { register, kind: ErrorKind::Overrun });
            return;
        }

        // Через промежуточный буфер, чтобы сбой не испортил данные вызывающего
        let mut scratch = [0u8; MAX_BURST];
        match self.i2c.write_read(device, &[register], &mut scratch[..len]) {
            Ok(()) => {
                buf.copy_from_slice(&scratch[..len]);
                self.record_success();
            }
            Err(e) => self.record_failure(BusError::Read { register, kind: e.kind() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};
    use std::vec::Vec;

    #[derive(Debug)]
    struct Nack;

    impl embedded_hal::i2c::Error for Nack {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    /// Шина, отвечающая фиксированными байтами и умеющая отказывать
    struct FakeI2c {
        reply: Vec<u8>,
        fail: bool,
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl FakeI2c {
        fn new(reply: &[u8]) -> Self {
            Self {
                reply: reply.to_vec(),
                fail: false,
                writes: Vec::new(),
            }
        }
    }

    impl ErrorType for FakeI2c {
        type Error = Nack;
    }

    impl I2c for FakeI2c {
        fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buf) => {
                        // Частично заполняем буфер, как реальная шина при обрыве
                        let n = buf.len().min(self.reply.len());
                        buf[..n].copy_from_slice(&self.reply[..n]);
                        if self.fail {
                            return Err(Nack);
                        }
                    }
                }
            }
            if self.fail {
                return Err(Nack);
            }
            Ok(())
        }
    }

    #[test]
    fn write_register_sends_register_then_value() {
        let mut bus = I2cBus::new(FakeI2c::new(&[]));
        bus.write_register(0x68, 0x1B, 2 << 3);

        let i2c = bus.release();
        assert_eq!(i2c.writes, vec![(0x68, vec![0x1B, 0x10])]);
    }

    #[test]
    fn read_registers_fills_buffer() {
        let mut bus = I2cBus::new(FakeI2c::new(&[0x12, 0x34, 0x56]));
        let mut buf = [0u8; 3];
        bus.read_registers(0x68, 0x43, &mut buf);

        assert_eq!(buf, [0x12, 0x34, 0x56]);
        assert_eq!(bus.stats(), BusStats::default());
        assert_eq!(bus.release().writes, vec![(0x68, vec![0x43])]);
    }

    #[test]
    fn failed_read_leaves_buffer_untouched() {
        let mut i2c = FakeI2c::new(&[0xAA; 14]);
        i2c.fail = true;
        let mut bus = I2cBus::new(i2c);

        let mut buf = [0x01u8; 14];
        bus.read_registers(0x68, 0x3B, &mut buf);

        assert_eq!(buf, [0x01; 14]);
        assert_eq!(bus.stats().reads_failed, 1);
        assert_eq!(
            bus.last_error(),
            Some(BusError::Read {
                register: 0x3B,
                kind: ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            })
        );
    }

    #[test]
    fn failed_long_read_leaves_buffer_untouched() {
        let mut i2c = FakeI2c::new(&[0xAA; 40]);
        i2c.fail = true;
        let mut bus = I2cBus::new(i2c);

        let mut buf = [0x01u8; 40];
        bus.read_registers(0x68, 0x3B, &mut buf);

        assert_eq!(buf, [0x01; 40]);
        assert_eq!(bus.stats().reads_failed, 1);
    }

    #[test]
    fn read_longer_than_burst_is_rejected() {
        let mut bus = I2cBus::new(FakeI2c::new(&[0xAA; 40]));

        let mut buf = [0x01u8; MAX_BURST + 1];
        bus.read_registers(0x68, 0x3B, &mut buf);

        assert_eq!(buf, [0x01; MAX_BURST + 1]);
        assert_eq!(
            bus.last_error(),
            Some(BusError::Read { register: 0x3B, kind: ErrorKind::Overrun })
        );
        // До шины запрос не доходит
        assert!(bus.release().writes.is_empty());
    }

    #[test]
    fn full_burst_read_succeeds() {
        let mut bus = I2cBus::new(FakeI2c::new(&[0x5A; MAX_BURST]));

        let mut buf = [0u8; MAX_BURST];
        bus.read_registers(0x68, 0x3B, &mut buf);

        assert_eq!(buf, [0x5A; MAX_BURST]);
        assert_eq!(bus.stats(), BusStats::default());
    }

    #[test]
    fn failed_write_is_counted() {
        let mut i2c = FakeI2c::new(&[]);
        i2c.fail = true;
        let mut bus = I2cBus::new(i2c);

        bus.write_register(0x68, 0x6B, 0);
        bus.write_register(0x68, 0x1B, 0x10);

        assert_eq!(bus.stats().writes_failed, 2);
        assert!(matches!(bus.last_error(), Some(BusError::Write { register: 0x1B, .. })));
    }
}
