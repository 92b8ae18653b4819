//! Host-provided message channel.
//!
//! User-facing messages ("Installing Foo\Bar from package ...") go through
//! [`HostIo`]; diagnostics go through `tracing`.

use colored::Colorize;

pub trait HostIo {
    fn write(&mut self, message: &str);
}

/// Writes messages to stdout.
#[derive(Debug, Default)]
pub struct ConsoleIo {
    pub quiet: bool,
}

impl HostIo for ConsoleIo {
    fn write(&mut self, message: &str) {
        if !self.quiet {
            println!("{} {message}", "→".cyan());
        }
    }
}

/// Collects messages in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferedIo {
    pub messages: Vec<String>,
}

impl BufferedIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|message| message.contains(needle))
    }
}

impl HostIo for BufferedIo {
    fn write(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullIo;

impl HostIo for NullIo {
    fn write(&mut self, _message: &str) {}
}
