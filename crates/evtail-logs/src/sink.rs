use std::io;

use evtail_types::LogEntry;

/// Destination for batches of retrieved entries
pub trait Sink {
    /// Emit `entries` in the order given
    fn render(&mut self, entries: &[LogEntry]) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn render(&mut self, entries: &[LogEntry]) -> io::Result<()> {
        (**self).render(entries)
    }
}
