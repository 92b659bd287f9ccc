//! Trait abstraction for serial port operations to enable testing

use async_trait::async_trait;
use bytes::BytesMut;
use std::io;

/// Trait for serial port I/O operations
#[async_trait]
pub trait SerialPortIo: Send {
    /// Read available bytes into the buffer, returning the count (0 = EOF)
    async fn read_into(&mut self, buf: &mut BytesMut) -> io::Result<usize>;

    /// Write all data to the port
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Wrapper around tokio_serial::SerialStream that implements SerialPortIo
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl SerialPortIo for TokioSerialPort {
    async fn read_into(&mut self, buf: &mut BytesMut) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.port.read_buf(buf).await
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }
}
