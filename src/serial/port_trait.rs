//! Trait abstraction for line-oriented serial input to enable testing

use std::io::{self, BufRead, BufReader};
use tokio_serial::SerialPort;

/// Source of newline-terminated records
#[cfg_attr(test, mockall::automock)]
pub trait LineDevice: Send {
    /// Number of bytes that can be read without waiting
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read one line including its terminator
    ///
    /// Returns `Ok(None)` when the read timed out before a full line arrived;
    /// the partial bytes are kept for the next call.
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// Byte stream that can report how much input is already waiting
pub trait PortInput: io::Read + Send {
    fn bytes_waiting(&self) -> io::Result<usize>;
}

impl PortInput for Box<dyn SerialPort> {
    fn bytes_waiting(&self) -> io::Result<usize> {
        Ok(self.bytes_to_read()? as usize)
    }
}

/// Blocking serial port that yields whole lines
pub struct SerialLineDevice<P = Box<dyn SerialPort>> {
    reader: BufReader<P>,
    pending: Vec<u8>,
}

impl<P: PortInput> SerialLineDevice<P> {
    pub fn new(port: P) -> Self {
        Self {
            reader: BufReader::new(port),
            pending: Vec::new(),
        }
    }
}

impl<P> std::fmt::Debug for SerialLineDevice<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLineDevice")
            .field("buffered", &self.reader.buffer().len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<P: PortInput> LineDevice for SerialLineDevice<P> {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let buffered = self.reader.buffer().len();
        let waiting = self.reader.get_ref().bytes_waiting()?;
        Ok(buffered + waiting)
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) if self.pending.is_empty() => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "serial device closed",
            )),
            Ok(_) => Ok(Some(std::mem::take(&mut self.pending))),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::ChunkedPort;
    use super::*;

    #[test]
    fn test_timed_out_partial_line_is_completed_by_next_read() {
        let port = ChunkedPort::new(&[
            Ok("IR: 1"),
            Err(io::ErrorKind::TimedOut),
            Ok("23\r\nIR: 4\n"),
        ]);
        let mut device = SerialLineDevice::new(port);

        assert_eq!(device.read_line().unwrap(), None);
        assert_eq!(device.read_line().unwrap(), Some(b"IR: 123\r\n".to_vec()));
        assert_eq!(device.read_line().unwrap(), Some(b"IR: 4\n".to_vec()));

        let err = device.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_partial_line_at_end_of_stream_is_returned() {
        let port = ChunkedPort::new(&[Ok("IR: 9")]);
        let mut device = SerialLineDevice::new(port);

        assert_eq!(device.read_line().unwrap(), Some(b"IR: 9".to_vec()));
        assert!(device.read_line().is_err());
    }

    #[test]
    fn test_other_read_errors_are_faults() {
        let port = ChunkedPort::new(&[Ok("IR:"), Err(io::ErrorKind::BrokenPipe)]);
        let mut device = SerialLineDevice::new(port);

        let err = device.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_bytes_available_counts_buffered_and_waiting() {
        let port = ChunkedPort::new(&[Ok("IR: 1\nIR: 2\n"), Ok("IR: 3\n")]);
        let mut device = SerialLineDevice::new(port);
        assert_eq!(device.bytes_available().unwrap(), 12);

        // Second line stays in the read buffer
        device.read_line().unwrap();
        assert_eq!(device.bytes_available().unwrap(), 6 + 6);

        device.read_line().unwrap();
        assert_eq!(device.bytes_available().unwrap(), 6);
    }
}
