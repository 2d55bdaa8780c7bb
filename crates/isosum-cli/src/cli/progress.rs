//! Per-file progress bars for verbose mode.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use isosum_core::progress::{FileProgress, ProgressObserver};
use isosum_core::task::{FileTask, HashResult};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;

const BAR_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})";

/// One bar per in-flight file, drawn on stderr.
pub struct ProgressDisplay {
    multi: MultiProgress,
    style: ProgressStyle,
    bars: Mutex<HashMap<PathBuf, ProgressBar>>,
}

impl ProgressDisplay {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        Self {
            multi: MultiProgress::new(),
            style,
            bars: Mutex::new(HashMap::new()),
        }
    }

    /// Log writer that hides the bars while each log line is written, so
    /// logs and bars can share stderr.
    pub fn log_writer(&self) -> BarSafeMakeWriter<fn() -> io::Stderr> {
        BarSafeMakeWriter::new(self.multi.clone(), io::stderr)
    }
}

/// Makes writers that buffer one log event and flush it to `inner` with the
/// progress bars suspended.
pub struct BarSafeMakeWriter<M> {
    multi: MultiProgress,
    inner: M,
}

impl<M> BarSafeMakeWriter<M> {
    pub fn new(multi: MultiProgress, inner: M) -> Self {
        Self { multi, inner }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for BarSafeMakeWriter<M> {
    type Writer = BarSafeWriter<'a, M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        BarSafeWriter {
            multi: &self.multi,
            inner: self.inner.make_writer(),
            buf: Vec::new(),
        }
    }
}

pub struct BarSafeWriter<'a, W: Write> {
    multi: &'a MultiProgress,
    inner: W,
    buf: Vec<u8>,
}

impl<W: Write> Write for BarSafeWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let Self { multi, inner, buf } = self;
        let res = multi.suspend(|| {
            inner.write_all(buf)?;
            inner.flush()
        });
        buf.clear();
        res
    }
}

impl<W: Write> Drop for BarSafeWriter<'_, W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressDisplay {
    fn on_start(&self, task: &FileTask) {
        let bar = self.multi.add(ProgressBar::new(task.size));
        bar.set_style(self.style.clone());
        bar.set_message(task.file_name());
        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(task.path.clone(), bar);
        }
    }

    fn on_chunk(&self, task: &FileTask, progress: &FileProgress) {
        if let Ok(bars) = self.bars.lock() {
            if let Some(bar) = bars.get(&task.path) {
                bar.set_position(progress.bytes_done);
            }
        }
    }

    fn on_finish(&self, result: &HashResult) {
        let bar = self.bars.lock().ok().and_then(|mut bars| bars.remove(&result.path));
        if let Some(bar) = bar {
            bar.finish_and_clear();
            self.multi.remove(&bar);
        }
    }
}
