//! Per-thread log capture for tests.
//!
//! The `log` facade holds one global logger per process, so records are kept in a
//! thread-local buffer: each test only sees what its own thread logged.

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct Capture;

impl Log for Capture {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let line = record.args().to_string();
        RECORDS.with(|r| r.borrow_mut().push((record.level(), line)));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;
static INSTALL: Once = Once::new();

/// Installs the capture logger (once per process) and clears this thread's buffer.
pub(crate) fn start() {
    INSTALL.call_once(|| {
        if log::set_logger(&CAPTURE).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    RECORDS.with(|r| r.borrow_mut().clear());
}

/// Messages logged on this thread since `start`, at `level` or more severe.
pub(crate) fn lines(level: Level) -> Vec<String> {
    RECORDS.with(|r| {
        r.borrow()
            .iter()
            .filter(|(l, _)| *l <= level)
            .map(|(_, line)| line.clone())
            .collect()
    })
}
