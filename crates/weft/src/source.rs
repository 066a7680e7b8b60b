//! Read-only byte sources that templates are evaluated from.
//!
//! A [`Source`] knows its total length, supports bounded reads, and is closed
//! explicitly (or on drop). Two implementations are provided:
//!
//! - [`FileSource`] reads a file, either one it opened itself or a handle the
//!   caller lent it. Closing a lent handle leaves the caller's file open.
//! - [`BufferSource`] reads a private copy of an in-memory buffer.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{Result, TemplateError};

const READ_CHUNK: usize = 8 * 1024;

/// A read-only byte provider with a known length.
pub trait Source {
    /// Total number of bytes, or `None` once the source is closed.
    fn length(&mut self) -> Option<u64>;

    /// Reads up to `buf.len()` bytes, returning how many were read. `0` means
    /// the end of the source was reached.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Releases the underlying provider. Further reads fail.
    fn close(&mut self) -> Result<()>;

    /// Reads everything from the current position to the end.
    fn read_all(&mut self) -> Result<Vec<u8>> {
        let hint = self.length().ok_or(TemplateError::SourceClosed)?;
        let mut data = Vec::with_capacity(usize::try_from(hint).unwrap_or(0));
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = self.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
        }
        Ok(data)
    }
}

enum Handle<'a> {
    Owned(File),
    Wrapped(&'a mut File),
    Closed,
}

/// A source backed by a file.
pub struct FileSource<'a> {
    handle: Handle<'a>,
    path: Option<PathBuf>,
}

impl FileSource<'static> {
    /// Opens `path` for reading. The file is closed by [`Source::close`] or on drop.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TemplateError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            handle: Handle::Owned(file),
            path: Some(path.to_path_buf()),
        })
    }
}

impl<'a> FileSource<'a> {
    /// Reads from a file the caller keeps ownership of.
    ///
    /// Closing the source only detaches it; the caller's handle stays open.
    pub fn wrap(file: &'a mut File) -> Self {
        Self {
            handle: Handle::Wrapped(file),
            path: None,
        }
    }

    /// The path this source was opened from, if it opened one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self.handle, Handle::Wrapped(_))
    }

    fn file_mut(&mut self) -> Option<&mut File> {
        match &mut self.handle {
            Handle::Owned(file) => Some(file),
            Handle::Wrapped(file) => Some(&mut **file),
            Handle::Closed => None,
        }
    }
}

impl Source for FileSource<'_> {
    fn length(&mut self) -> Option<u64> {
        let file = self.file_mut()?;
        let pos = file.stream_position().ok()?;
        let len = file.seek(SeekFrom::End(0)).ok()?;
        file.seek(SeekFrom::Start(pos)).ok()?;
        Some(len)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let file = self.file_mut().ok_or(TemplateError::SourceClosed)?;
        Ok(file.read(buf)?)
    }

    fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.handle, Handle::Closed) {
            // Dropping the owned handle closes the descriptor.
            Handle::Owned(file) => drop(file),
            Handle::Wrapped(_) => {}
            Handle::Closed => return Err(TemplateError::SourceClosed),
        }
        Ok(())
    }
}

/// A source over a private copy of an in-memory buffer.
#[derive(Debug, Clone)]
pub struct BufferSource {
    data: Vec<u8>,
    pos: usize,
    closed: bool,
}

impl BufferSource {
    /// Copies `data`; the caller's buffer is never touched again.
    pub fn new(data: impl AsRef<[u8]>) -> Self {
        Self {
            data: data.as_ref().to_vec(),
            pos: 0,
            closed: false,
        }
    }

    /// Current read position, never beyond the buffer's length.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Source for BufferSource {
    fn length(&mut self) -> Option<u64> {
        if self.closed {
            return None;
        }
        Some(self.data.len() as u64)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(TemplateError::SourceClosed);
        }
        let remaining = &self.data[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos = (self.pos + n).min(self.data.len());
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(TemplateError::SourceClosed);
        }
        self.closed = true;
        self.data = Vec::new();
        self.pos = 0;
        Ok(())
    }
}
