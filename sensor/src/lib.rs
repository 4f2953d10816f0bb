//! Acquisition adapter for the optical sensor's serial protocol. The host
//! discards bytes until a literal TAB, then reads half a frame's worth of
//! bytes, each packing two 4-bit samples, high nibble first.
//!
//! The adapter works over any `io::Read`; baud rate and the per-byte timeout
//! belong to the caller-owned port handle, which is closed on drop. A read
//! timeout mid-stream or an external interrupt yields `Ok(None)` with no
//! partial state.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

pub const FRAME_ROWS: usize = 288;
pub const FRAME_COLS: usize = 256;

/// Byte announcing the start of a frame.
pub const SYNC_BYTE: u8 = 0x09;

/// Payload bytes read per chunk between interrupt checks.
const CHUNK: usize = 256;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("serial port error: {0}")]
    Io(#[from] io::Error),
}

/// One decoded frame of 4-bit samples, row-major, values 0..=15.
#[derive(Debug, Clone)]
pub struct Frame {
    pub rows: usize,
    pub cols: usize,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn get(&self, y: usize, x: usize) -> u8 {
        self.pixels[y * self.cols + x]
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

fn interrupted(flag: Option<&AtomicBool>) -> bool {
    flag.map(|f| f.load(Ordering::Relaxed)).unwrap_or(false)
}

/// Reads one frame of the given geometry. Returns `Ok(None)` on a read
/// timeout, end of stream before the frame completes, or when `interrupt`
/// is raised; the interrupt is honoured on chunk boundaries.
pub fn read_frame_with(
    port: &mut impl Read,
    rows: usize,
    cols: usize,
    interrupt: Option<&AtomicBool>,
) -> Result<Option<Frame>, CaptureError> {
    // sync: skip everything up to the TAB marker
    loop {
        if interrupted(interrupt) {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match port.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) if byte[0] == SYNC_BYTE => break,
            Ok(_) => continue,
            Err(err) if is_timeout(&err) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }

    let payload_len = rows * cols / 2;
    let mut payload = vec![0u8; payload_len];
    let mut filled = 0usize;
    while filled < payload_len {
        if interrupted(interrupt) {
            return Ok(None);
        }
        let end = (filled + CHUNK).min(payload_len);
        match port.read(&mut payload[filled..end]) {
            Ok(0) => return Ok(None),
            Ok(n) => filled += n,
            Err(err) if is_timeout(&err) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }

    let mut pixels = Vec::with_capacity(rows * cols);
    for byte in payload {
        pixels.push(byte >> 4);
        pixels.push(byte & 0x0F);
    }

    Ok(Some(Frame {
        rows,
        cols,
        pixels,
    }))
}

/// Reads one frame in the sensor's native 288x256 geometry.
pub fn read_frame(port: &mut impl Read) -> Result<Option<Frame>, CaptureError> {
    read_frame_with(port, FRAME_ROWS, FRAME_COLS, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn sync_then_nibbles_high_first() {
        let mut stream = vec![SYNC_BYTE];
        stream.extend(std::iter::repeat(0xABu8).take(FRAME_ROWS * FRAME_COLS / 2));
        let mut port = Cursor::new(stream);

        let frame = read_frame(&mut port).unwrap().expect("frame");
        assert_eq!(frame.rows, FRAME_ROWS);
        assert_eq!(frame.cols, FRAME_COLS);
        assert_eq!(frame.pixels.len(), FRAME_ROWS * FRAME_COLS);
        for (i, &px) in frame.pixels.iter().enumerate() {
            let expected = if i % 2 == 0 { 0x0A } else { 0x0B };
            assert_eq!(px, expected, "pixel {}", i);
        }
    }

    #[test]
    fn garbage_before_sync_is_discarded() {
        let mut stream = vec![0x00, 0xFF, 0x42, SYNC_BYTE];
        stream.extend(std::iter::repeat(0x11u8).take(8));
        let mut port = Cursor::new(stream);

        let frame = read_frame_with(&mut port, 4, 4, None).unwrap().expect("frame");
        assert!(frame.pixels.iter().all(|&p| p == 0x01));
        assert_eq!(frame.get(0, 0), 0x01);
    }

    #[test]
    fn truncated_stream_yields_empty_result() {
        let mut stream = vec![SYNC_BYTE];
        stream.extend(std::iter::repeat(0xABu8).take(10));
        let mut port = Cursor::new(stream);
        assert!(read_frame(&mut port).unwrap().is_none());
    }

    #[test]
    fn no_sync_yields_empty_result() {
        let mut port = Cursor::new(vec![0x01u8, 0x02, 0x03]);
        assert!(read_frame(&mut port).unwrap().is_none());
    }

    struct TimeoutAfter {
        bytes: Vec<u8>,
        served: usize,
    }

    impl Read for TimeoutAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served >= self.bytes.len() {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "port timeout"));
            }
            let n = buf.len().min(self.bytes.len() - self.served);
            buf[..n].copy_from_slice(&self.bytes[self.served..self.served + n]);
            self.served += n;
            Ok(n)
        }
    }

    #[test]
    fn timeout_mid_stream_yields_empty_result() {
        let mut bytes = vec![SYNC_BYTE];
        bytes.extend(std::iter::repeat(0xABu8).take(100));
        let mut port = TimeoutAfter { bytes, served: 0 };
        assert!(read_frame(&mut port).unwrap().is_none());
    }

    #[test]
    fn interrupt_aborts_the_capture() {
        let flag = AtomicBool::new(true);
        let mut stream = vec![SYNC_BYTE];
        stream.extend(std::iter::repeat(0xABu8).take(FRAME_ROWS * FRAME_COLS / 2));
        let mut port = Cursor::new(stream);
        let frame = read_frame_with(&mut port, FRAME_ROWS, FRAME_COLS, Some(&flag)).unwrap();
        assert!(frame.is_none());
    }

    #[test]
    fn other_io_errors_surface() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "no port"))
            }
        }
        assert!(matches!(
            read_frame(&mut Broken),
            Err(CaptureError::Io(_))
        ));
    }
}
