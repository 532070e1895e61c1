//! Output handling for printing built-ins.
//!
//! Output goes to the innermost sink of a redirection stack. The base sink
//! is chosen when the evaluator is built (stdout, a capture buffer, or
//! silence); `ToString`, `ToStdout` and `ToFile` push a sink for the dynamic
//! extent of their body and pop it afterwards.
//!
//! Uses enum dispatch rather than trait objects: writes happen on every
//! printing built-in.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

/// Captured output shared between the evaluator and its owner.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer(Arc<Mutex<String>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&self, text: &str) {
        self.0.lock().push_str(text);
    }

    /// Everything captured so far.
    pub fn get_output(&self) -> String {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    /// Drain the captured text.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.0.lock())
    }
}

/// Where the evaluator's base output goes.
#[derive(Clone, Debug, Default)]
pub enum OutputHandler {
    /// Writes to stdout (default).
    #[default]
    Stdout,
    /// Captures into a buffer (embedding, tests).
    Buffer(SharedBuffer),
    /// Discards everything.
    Silent,
}

impl OutputHandler {
    /// Create a capturing handler and hand back its buffer.
    pub fn buffer() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::new();
        (OutputHandler::Buffer(buffer.clone()), buffer)
    }

    fn write(&self, text: &str) {
        match self {
            Self::Stdout => print!("{text}"),
            Self::Buffer(buffer) => buffer.push_str(text),
            Self::Silent => {}
        }
    }
}

#[derive(Debug)]
enum Sink {
    Handler(OutputHandler),
    File { path: PathBuf, writer: BufWriter<File> },
}

impl Sink {
    fn write(&mut self, text: &str) -> io::Result<()> {
        match self {
            Sink::Handler(handler) => {
                handler.write(text);
                Ok(())
            }
            Sink::File { writer, .. } => writer.write_all(text.as_bytes()),
        }
    }

    fn close(self) -> io::Result<()> {
        match self {
            Sink::Handler(_) => Ok(()),
            Sink::File { path, mut writer } => {
                tracing::debug!(path = %path.display(), "close output file");
                writer.flush()
            }
        }
    }
}

/// Base handler plus the active redirections, innermost last.
#[derive(Debug)]
pub struct OutputStack {
    base: OutputHandler,
    redirects: Vec<Sink>,
}

impl OutputStack {
    pub fn new(base: OutputHandler) -> Self {
        OutputStack {
            base,
            redirects: Vec::new(),
        }
    }

    #[inline]
    pub fn base(&self) -> &OutputHandler {
        &self.base
    }

    /// Number of active redirections.
    #[inline]
    pub fn depth(&self) -> usize {
        self.redirects.len()
    }

    /// Write to the innermost sink.
    pub fn write(&mut self, text: &str) -> io::Result<()> {
        match self.redirects.last_mut() {
            Some(sink) => sink.write(text),
            None => {
                self.base.write(text);
                Ok(())
            }
        }
    }

    pub fn push_handler(&mut self, handler: OutputHandler) {
        self.redirects.push(Sink::Handler(handler));
    }

    /// Redirect into a freshly created (truncated) file.
    pub fn push_file(&mut self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        tracing::debug!(path = %path.display(), "redirect output to file");
        self.redirects.push(Sink::File {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        });
        Ok(())
    }

    /// Drop the innermost redirection, flushing it if it is a file.
    pub fn pop(&mut self) -> io::Result<()> {
        match self.redirects.pop() {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }
}

impl Default for OutputStack {
    fn default() -> Self {
        Self::new(OutputHandler::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn base_buffer_captures_writes() {
        let (handler, buffer) = OutputHandler::buffer();
        let mut out = OutputStack::new(handler);
        out.write("hello ").ok();
        out.write("world").ok();
        assert_eq!(buffer.get_output(), "hello world");
        buffer.clear();
        assert_eq!(buffer.get_output(), "");
    }

    #[test]
    fn redirection_is_innermost_first_and_scoped() {
        let (handler, base) = OutputHandler::buffer();
        let mut out = OutputStack::new(handler);
        let (inner, captured) = OutputHandler::buffer();
        out.push_handler(inner);
        out.write("inside").ok();
        out.pop().ok();
        out.write("outside").ok();
        assert_eq!(captured.take(), "inside");
        assert_eq!(base.get_output(), "outside");
        assert_eq!(out.depth(), 0);
    }

    #[test]
    fn silent_discards() {
        let mut out = OutputStack::new(OutputHandler::Silent);
        assert!(out.write("gone").is_ok());
    }

    #[test]
    fn pop_without_redirect_is_noop() {
        let mut out = OutputStack::default();
        assert!(out.pop().is_ok());
    }
}
