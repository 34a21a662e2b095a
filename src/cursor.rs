use crate::fs::ReadSeek;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};

/// Pull-based byte source over a seekable stream with single-byte peek and
/// a one-byte mark/reset (`rewind_one`). Tracks its absolute file offset.
pub struct ByteCursor {
    inner: BufReader<Box<dyn ReadSeek>>,
    pos: u64,
}

impl ByteCursor {
    pub fn new(stream: Box<dyn ReadSeek>, offset: u64, buf_bytes: usize) -> io::Result<Self> {
        let mut inner = BufReader::with_capacity(buf_bytes.max(8 * 1024), stream);
        inner.seek(SeekFrom::Start(offset))?;
        Ok(Self { inner, pos: offset })
    }

    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Read one byte; `None` at end of stream.
    #[inline]
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let buf = self.inner.fill_buf()?;
        match buf.first().copied() {
            Some(b) => {
                self.inner.consume(1);
                self.pos += 1;
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }

    /// Look at the next byte without consuming it.
    #[inline]
    pub fn peek(&mut self) -> io::Result<Option<u8>> {
        Ok(self.inner.fill_buf()?.first().copied())
    }

    /// Step back over the byte just consumed.
    pub fn rewind_one(&mut self) -> io::Result<()> {
        self.inner.seek_relative(-1)?;
        self.pos -= 1;
        Ok(())
    }

    /// Reposition to an absolute offset. Relative seeks keep the buffer
    /// when the target is already buffered.
    pub fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        let delta = offset as i64 - self.pos as i64;
        self.inner.seek_relative(delta)?;
        self.pos = offset;
        Ok(())
    }
}
