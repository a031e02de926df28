//! In-process console: the engine's plain-text logging sink
//!
//! Asset loaders and the renderer report recoverable conditions here.
//! Every line is forwarded to the `log` facade and retained in memory so
//! a debug overlay (or a test) can read the scrollback.

/// Plain-text log sink with an in-memory scrollback.
#[derive(Debug, Default)]
pub struct Console {
    lines: Vec<String>,
}

impl Console {
    /// Create an empty console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line to the scrollback and forward it to the `log` facade.
    pub fn log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::info!("{}", msg);
        self.lines.push(msg);
    }

    /// The retained scrollback, oldest line first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_retains_lines_in_order() {
        let mut console = Console::new();
        console.log("first");
        console.log(String::from("second"));

        assert_eq!(console.lines(), &["first", "second"]);
    }
}
