//! Structured output abstraction for course-engine.
//!
//! Provides a unified interface for outputting messages in different modes:
//! - Human: colored text and symbol-prefixed messages for terminal display
//! - Json: one pretty-printed JSON document per command; only errors add events
//! - Quiet: only errors are emitted
//!
//! The Output struct auto-detects TTY for color support and can be injected
//! with a custom writer for test capture.

use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Output mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable colored output
    Human,
    /// JSON documents for programmatic consumption
    Json,
    /// Silent mode - only errors
    Quiet,
}

impl OutputMode {
    /// `--json` wins over `--quiet`.
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Human
        }
    }
}

/// Output abstraction with mode-aware formatting
#[derive(Clone)]
pub struct Output {
    mode: OutputMode,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    is_tty: bool,
}

impl Output {
    /// Create a new Output writing to stdout
    pub fn new(mode: OutputMode) -> Self {
        let is_tty = atty::is(atty::Stream::Stdout);
        Self {
            mode,
            writer: Arc::new(Mutex::new(Box::new(io::stdout()))),
            is_tty,
        }
    }

    /// Create an Output with a custom writer (for testing)
    #[cfg(test)]
    pub fn with_writer(mode: OutputMode, writer: Box<dyn Write + Send>) -> Self {
        Self {
            mode,
            writer: Arc::new(Mutex::new(writer)),
            is_tty: false, // Assume non-TTY for custom writers
        }
    }

    /// Output a rendered text block (no prefix)
    pub fn info(&self, msg: &str) {
        if self.mode == OutputMode::Human {
            self.write_line(msg);
        }
    }

    /// Output a warning message: "⚠ {msg}" in yellow
    pub fn warn(&self, msg: &str) {
        if self.mode == OutputMode::Human {
            let prefix = if self.is_tty {
                "⚠".yellow().to_string()
            } else {
                "⚠".to_string()
            };
            self.write_line(&format!("{} {}", prefix, msg));
        }
    }

    /// Output an error message: "✗ {msg}" in red
    pub fn error(&self, msg: &str) {
        match self.mode {
            OutputMode::Human => {
                let prefix = if self.is_tty {
                    "✗".red().to_string()
                } else {
                    "✗".to_string()
                };
                self.write_line(&format!("{} {}", prefix, msg));
            }
            OutputMode::Json => {
                self.write_json_event("error", msg);
            }
            OutputMode::Quiet => {
                // Errors always output, even in quiet mode
                self.write_line(&format!("✗ {}", msg));
            }
        }
    }

    /// Output a pretty-printed JSON document (Json mode only)
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        if self.mode != OutputMode::Json {
            return;
        }
        match serde_json::to_string_pretty(value) {
            Ok(text) => self.write_line(&text),
            Err(e) => self.write_json_event("error", &e.to_string()),
        }
    }

    /// Get the current output mode
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Write a line to the output
    fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }

    /// Write a JSON-formatted event line
    fn write_json_event(&self, level: &str, msg: &str) {
        let event = json!({
            "level": level,
            "msg": msg,
        });
        self.write_line(&event.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    // Test-specific writer that wraps Arc<Mutex<Vec<u8>>>
    struct TestWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl TestWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buffer = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    buffer: buffer.clone(),
                },
                buffer,
            )
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.buffer.lock().unwrap().flush()
        }
    }

    fn captured(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        let data = buffer.lock().unwrap();
        String::from_utf8(data.clone()).unwrap()
    }

    #[test]
    fn test_human_mode_output() {
        let (writer, buffer) = TestWriter::new();
        let output = Output::with_writer(OutputMode::Human, Box::new(writer));

        output.info("Report");
        output.warn("Warning");
        output.error("Error");
        output.json(&json!({"ignored": true}));

        let result = captured(&buffer);
        assert!(result.contains("Report"));
        assert!(result.contains("⚠ Warning"));
        assert!(result.contains("✗ Error"));
        assert!(!result.contains("ignored"));
    }

    #[test]
    fn test_json_mode_output() {
        let (writer, buffer) = TestWriter::new();
        let output = Output::with_writer(OutputMode::Json, Box::new(writer));

        output.info("Report");
        output.warn("Warning");
        output.json(&json!({"ok": true}));

        let result = captured(&buffer);
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["ok"], true);
        assert!(!result.contains("Report"));
        assert!(!result.contains("Warning"));
    }

    #[test]
    fn test_json_mode_error_event() {
        let (writer, buffer) = TestWriter::new();
        let output = Output::with_writer(OutputMode::Json, Box::new(writer));

        output.error("Boom");

        let result = captured(&buffer);
        assert!(result.contains(r#""level":"error""#));
        assert!(result.contains(r#""msg":"Boom""#));
    }

    #[test]
    fn test_quiet_mode_only_errors() {
        let (writer, buffer) = TestWriter::new();
        let output = Output::with_writer(OutputMode::Quiet, Box::new(writer));

        output.info("Info");
        output.warn("Warning");
        output.error("Error");

        let result = captured(&buffer);
        assert!(result.contains("✗ Error"));
        assert!(!result.contains("Warning"));
        assert!(!result.contains("Info"));
    }

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(OutputMode::from_flags(true, true), OutputMode::Json);
        assert_eq!(OutputMode::from_flags(false, true), OutputMode::Quiet);
        assert_eq!(OutputMode::from_flags(false, false), OutputMode::Human);
        assert_eq!(Output::new(OutputMode::Json).mode(), OutputMode::Json);
    }
}
