use std::sync::Mutex;

/// Logging capability handed to each pipeline component.
///
/// The pipeline reports progress through this trait rather than writing to a
/// process stream directly, so tests can assert on emitted messages.
pub trait Logger {
    fn log(&self, message: &str);

    /// Diagnostic output, emitted only when debug logging is enabled.
    fn debug(&self, message: &str);
}

/// Timestamped stderr logger used by the CLI.
pub struct StderrLogger {
    pub debug: bool,
}

impl StderrLogger {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl Logger for StderrLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", chrono::Local::now().format("%a %b %e %T %Y"), message);
    }

    fn debug(&self, message: &str) {
        if self.debug {
            self.log(message);
        }
    }
}

/// Logger that records messages in memory. Debug messages are always kept.
#[derive(Default)]
pub struct MemoryLogger {
    messages: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("logger mutex poisoned").clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, message: &str) {
        self.messages
            .lock()
            .expect("logger mutex poisoned")
            .push(message.to_string());
    }

    fn debug(&self, message: &str) {
        self.log(message);
    }
}
