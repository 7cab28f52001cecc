//! In-memory blocking duplex channel for driving both handshake ends
//! hermetically from two threads.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex};

#[derive(Default)]
struct Inner {
    buffer: VecDeque<u8>,
    closed: bool,
}

type Shared = Arc<(Mutex<Inner>, Condvar)>;

/// Read half of a one-way pipe. Blocks until data arrives or the writer is
/// dropped.
pub struct PipeReader {
    shared: Shared,
}

/// Write half of a one-way pipe.
pub struct PipeWriter {
    shared: Shared,
}

/// Create a one-way blocking byte pipe.
pub fn pipe() -> (PipeWriter, PipeReader) {
    let shared: Shared = Arc::new((Mutex::new(Inner::default()), Condvar::new()));
    (
        PipeWriter {
            shared: shared.clone(),
        },
        PipeReader { shared },
    )
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (lock, condvar) = &*self.shared;
        let mut inner = lock.lock().unwrap();
        loop {
            if !inner.buffer.is_empty() {
                let n = buf.len().min(inner.buffer.len());
                for slot in buf.iter_mut().take(n) {
                    *slot = inner.buffer.pop_front().unwrap();
                }
                return Ok(n);
            }
            if inner.closed {
                return Ok(0);
            }
            inner = condvar.wait(inner).unwrap();
        }
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let (lock, condvar) = &*self.shared;
        let mut inner = lock.lock().unwrap();
        if inner.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        }
        inner.buffer.extend(buf.iter().copied());
        condvar.notify_all();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        let (lock, condvar) = &*self.shared;
        if let Ok(mut inner) = lock.lock() {
            inner.closed = true;
            condvar.notify_all();
        }
    }
}

/// A duplex link: ((client read, client write), (server read, server write)).
pub fn duplex() -> ((PipeReader, PipeWriter), (PipeReader, PipeWriter)) {
    let (client_writer, server_reader) = pipe();
    let (server_writer, client_reader) = pipe();
    ((client_reader, client_writer), (server_reader, server_writer))
}
