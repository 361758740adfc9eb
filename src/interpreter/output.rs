use std::io::Write;

/// Destination of `println`. One call per printed line, without the
/// trailing newline.
pub trait OutputSink {
    fn write_line(&mut self, line: &str);
}

#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(error) = writeln!(handle, "{}", line) {
            tracing::warn!(%error, "failed to write program output");
        }
    }
}

/// Collects printed lines in memory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BufferSink {
    pub lines: Vec<String>,
}

impl BufferSink {
    pub fn new() -> Self {
        BufferSink::default()
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl OutputSink for BufferSink {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
