// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Managed input buffer sitting between the writer and the framing loop.
//!
//! The writer side appends bytes without blocking; the single reader (the
//! framing loop) awaits complete lines or exact byte counts. Reads observe
//! bytes in exactly the order they were written.

use std::fmt;

use bytes::{Bytes, BytesMut};
use memchr::memmem;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Errors returned once the buffer has been stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A write arrived after [`ParserBuffer::stop`].
    WriteAfterStop,
    /// A read was pending at, or arrived after, [`ParserBuffer::stop`].
    ReaderClosed,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteAfterStop => f.write_str("write to a stopped buffer"),
            Self::ReaderClosed => f.write_str("buffer reader closed"),
        }
    }
}

impl std::error::Error for BufferError {}

struct Inner {
    data: BytesMut,
    stopped: bool,
}

/// Byte buffer with blocking line/chunk readers.
///
/// Writes are unbounded and never block; backpressure, when needed, is the
/// transport's flow-control window. Exactly one task may read at a time
/// (wakeups use `notify_one`).
pub struct ParserBuffer {
    inner: Mutex<Inner>,
    readable: Notify,
}

impl ParserBuffer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                data: BytesMut::with_capacity(4096),
                stopped: false,
            }),
            readable: Notify::new(),
        }
    }

    /// Enqueues bytes for the reader.
    ///
    /// # Errors
    /// Fails with [`BufferError::WriteAfterStop`] after [`stop`](Self::stop).
    pub fn write(&self, bytes: &[u8]) -> Result<usize, BufferError> {
        {
            let mut inner = self.inner.lock();
            if inner.stopped {
                return Err(BufferError::WriteAfterStop);
            }
            inner.data.extend_from_slice(bytes);
        }
        self.readable.notify_one();
        Ok(bytes.len())
    }

    /// Returns the next CRLF-terminated line without its terminator.
    /// The line may be empty. Waits until a full line is available.
    pub async fn next_line(&self) -> Result<Bytes, BufferError> {
        loop {
            {
                let mut inner = self.inner.lock();
                if inner.stopped {
                    return Err(BufferError::ReaderClosed);
                }
                if let Some(pos) = memmem::find(&inner.data, b"\r\n") {
                    let mut line = inner.data.split_to(pos + 2);
                    line.truncate(pos);
                    return Ok(line.freeze());
                }
            }
            self.readable.notified().await;
        }
    }

    /// Returns the next `n` bytes verbatim, waiting until they are all
    /// available.
    pub async fn next_chunk(&self, n: usize) -> Result<Bytes, BufferError> {
        loop {
            {
                let mut inner = self.inner.lock();
                if inner.stopped {
                    return Err(BufferError::ReaderClosed);
                }
                if inner.data.len() >= n {
                    return Ok(inner.data.split_to(n).freeze());
                }
            }
            self.readable.notified().await;
        }
    }

    /// Stops the buffer: the pending read is woken with
    /// [`BufferError::ReaderClosed`], and every subsequent read or write
    /// fails.
    pub fn stop(&self) {
        self.inner.lock().stopped = true;
        self.readable.notify_one();
    }
}

impl Default for ParserBuffer {
    fn default() -> Self {
        Self::new()
    }
}
