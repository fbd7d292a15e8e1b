use std::io::{self, BufWriter, Write};

use crate::prom::Sample;

pub const OUTPUT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Buffered line sink for accepted samples.
///
/// Call [`RecordWriter::finish`] on the normal path to see flush errors. If the
/// writer is dropped without it, whatever is buffered is still flushed and a
/// failure is logged.
pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,
    finished: bool,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W) -> Self {
        RecordWriter {
            inner: BufWriter::with_capacity(OUTPUT_BUFFER_CAPACITY, out),
            finished: false,
        }
    }

    pub fn write_sample(&mut self, sample: &Sample<'_>) -> io::Result<()> {
        writeln!(self.inner, "{sample}")
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.finished = true;
        self.inner.flush()
    }
}

impl<W: Write> Drop for RecordWriter<W> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.inner.flush() {
            log::error!("Failed to flush buffered records: {err}");
        }
    }
}
