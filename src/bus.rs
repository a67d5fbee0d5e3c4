//! Register-level access to the controller

use embedded_hal::i2c::{I2c, Operation};

/// Byte-oriented register access to one device.
///
/// Each call is one bus transaction: the register select and its data must
/// not be interleaved with traffic from another caller.
pub trait RegisterBus {
    type Error;

    /// Fill `buf` with consecutive registers starting at `register`
    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `values` to consecutive registers starting at `register`
    fn write_register(&mut self, register: u8, values: &[u8]) -> Result<(), Self::Error>;
}

/// [`RegisterBus`] over an embedded-hal I2C port
pub struct I2cRegisterBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cRegisterBus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the I2C port
    pub fn destroy(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> RegisterBus for I2cRegisterBus<I2C> {
    type Error = I2C::Error;

    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[register], buf)
    }

    fn write_register(&mut self, register: u8, values: &[u8]) -> Result<(), Self::Error> {
        // adjacent writes go out without a restart, so the device sees one frame
        self.i2c.transaction(
            self.address,
            &mut [Operation::Write(&[register]), Operation::Write(values)],
        )
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    type Error = B::Error;

    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read_register(register, buf)
    }

    fn write_register(&mut self, register: u8, values: &[u8]) -> Result<(), Self::Error> {
        (**self).write_register(register, values)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    extern crate std;

    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource};
    use std::collections::VecDeque;
    use std::vec::Vec;

    #[derive(Debug, PartialEq, Eq)]
    pub(crate) enum Op {
        Write(Vec<u8>),
        Read(usize),
    }

    /// Records every transaction and answers reads from a queue
    #[derive(Default)]
    pub(crate) struct RecordingI2c {
        pub transactions: Vec<(u8, Vec<Op>)>,
        pub responses: VecDeque<Vec<u8>>,
        pub nack: bool,
    }

    impl ErrorType for RecordingI2c {
        type Error = ErrorKind;
    }

    impl I2c for RecordingI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nack {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            let mut ops = Vec::new();
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => ops.push(Op::Write(bytes.to_vec())),
                    Operation::Read(buf) => {
                        let resp = self.responses.pop_front().unwrap_or_default();
                        for (dst, src) in buf.iter_mut().zip(resp.iter()) {
                            *dst = *src;
                        }
                        ops.push(Op::Read(buf.len()));
                    }
                }
            }
            self.transactions.push((address, ops));
            Ok(())
        }
    }

    #[test]
    fn read_selects_register_then_reads() {
        let mut i2c = RecordingI2c::default();
        i2c.responses.push_back(std::vec![0x02]);
        let mut bus = I2cRegisterBus::new(i2c, 0x38);

        let mut buf = [0u8; 1];
        bus.read_register(0x02, &mut buf).unwrap();
        assert_eq!(buf, [0x02]);

        let i2c = bus.destroy();
        assert_eq!(
            i2c.transactions,
            std::vec![(0x38, std::vec![Op::Write(std::vec![0x02]), Op::Read(1)])]
        );
    }

    #[test]
    fn write_sends_register_and_values_in_one_transaction() {
        let mut bus = I2cRegisterBus::new(RecordingI2c::default(), 0x39);
        assert_eq!(bus.address(), 0x39);
        bus.write_register(0x80, &[0x40, 0x41]).unwrap();

        let i2c = bus.destroy();
        assert_eq!(i2c.transactions.len(), 1);
        let (addr, ops) = &i2c.transactions[0];
        assert_eq!(*addr, 0x39);
        let frame: Vec<u8> = ops
            .iter()
            .flat_map(|op| match op {
                Op::Write(bytes) => bytes.clone(),
                Op::Read(_) => panic!("unexpected read"),
            })
            .collect();
        assert_eq!(frame, std::vec![0x80, 0x40, 0x41]);
    }

    #[test]
    fn bus_errors_pass_through() {
        let i2c = RecordingI2c {
            nack: true,
            ..Default::default()
        };
        let mut bus = I2cRegisterBus::new(i2c, 0x38);
        let mut buf = [0u8; 4];
        assert_eq!(
            bus.read_register(0x00, &mut buf),
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert!(bus.write_register(0x00, &[1]).is_err());
    }
}
