use std::fmt::Write as _;
use std::io::Write as _;

/// Everything one query prints, held back so that concurrent queries never
/// interleave their lines.
#[derive(Debug, Default)]
pub struct Report {
    stdout: String,
    stderr: String,
}

impl Report {
    pub fn line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.stdout, "{}", text);
    }

    /// Appends `text` as is, without a trailing newline.
    pub fn text(&mut self, text: impl std::fmt::Display) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn error_line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.stderr, "{}", text);
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Writes both buffers out, each in one piece.
    pub fn flush(self) {
        if !self.stderr.is_empty() {
            let mut err = std::io::stderr().lock();
            let _ = err.write_all(self.stderr.as_bytes());
        }
        if !self.stdout.is_empty() {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(self.stdout.as_bytes());
            let _ = out.flush();
        }
    }
}
