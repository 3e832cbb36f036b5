use crate::error::SheetDocError;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

/// Spreadsheet content borrowed from an uploaded file.
pub(crate) struct BytesReader<'a>(Cursor<&'a [u8]>);

impl<'a> BytesReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> BytesReader<'a> {
        BytesReader(Cursor::new(bytes))
    }

    /// Returns up to `length` leading bytes, leaving the position at the start.
    pub(crate) fn peek(&mut self, length: usize) -> Result<Vec<u8>, SheetDocError> {
        let mut head = Vec::with_capacity(length);
        self.by_ref().take(length as u64).read_to_end(&mut head)?;
        self.rewind()?;
        Ok(head)
    }
}

impl Read for BytesReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl Seek for BytesReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.0.seek(pos)
    }
}
