//! Console status table.

use std::fmt::Write as _;
use std::io::{self, Write};

use parking_lot::Mutex;

use crate::core::{Observer, SimEvent};

const WIDTHS: [usize; 9] = [10, 10, 20, 15, 36, 10, 10, 10, 12];
const HEADERS: [&str; 9] = [
    "Entity",
    "ID",
    "Name",
    "Priority",
    "Status",
    "Doctors",
    "Nurses",
    "Rooms",
    "Ventilators",
];

/// Observer printing one fixed-width row per patient event and one plain
/// line per controller event.
pub struct TableObserver {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TableObserver {
    /// Table written to `out`.
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Table written to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Header line followed by a rule.
    #[must_use]
    pub fn header() -> String {
        let mut line = String::new();
        for (title, width) in HEADERS.iter().zip(WIDTHS) {
            let _ = write!(line, "{title:>width$}");
        }
        let rule = "-".repeat(WIDTHS.iter().sum());
        format!("{line}\n{rule}")
    }

    /// Write the header to the underlying writer.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_header(&self) -> io::Result<()> {
        writeln!(self.out.lock(), "{}", Self::header())
    }

    /// Render one event.
    #[must_use]
    pub fn format_event(event: &SimEvent) -> String {
        let Some(row) = event.status_row() else {
            return event.to_string();
        };
        let cells = [
            row.role.to_string(),
            row.id.to_string(),
            row.label,
            row.priority.to_string(),
            row.status.to_string(),
            event.resources.doctors.available.to_string(),
            event.resources.nurses.available.to_string(),
            event.resources.exam_rooms.available.to_string(),
            event.resources.ventilators.available.to_string(),
        ];
        let mut line = String::new();
        for (cell, width) in cells.iter().zip(WIDTHS) {
            let _ = write!(line, "{cell:>width$}");
        }
        line
    }
}

impl Observer for TableObserver {
    fn record(&self, event: SimEvent) {
        let line = Self::format_event(&event);
        let mut out = self.out.lock();
        if writeln!(out, "{line}").is_err() {
            tracing::warn!("failed to write status row");
        }
    }
}
