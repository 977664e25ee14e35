//! File, stdin, stdout and in-memory implementations of the line contracts

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

use crate::lines::service_trait::{LineSink, LineSource};

/// Reads lines from a file.
pub struct FileLineSource {
    lines: Lines<BufReader<File>>,
}

impl FileLineSource {
    /// Opens the file at `path` for line-by-line reading.
    ///
    /// * `path` - Name of the file to read from.
    pub async fn open(path: &str) -> Result<Self, std::io::Error> {
        let file = File::open(path).await?;
        Ok(FileLineSource {
            lines: BufReader::new(file).lines(),
        })
    }
}

#[async_trait]
impl LineSource for FileLineSource {
    async fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        self.lines.next_line().await
    }
}

/// Reads lines from standard input.
pub struct StdinLineSource {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinLineSource {
    pub fn new() -> Self {
        StdinLineSource {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl LineSource for StdinLineSource {
    async fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        self.lines.next_line().await
    }
}

/// Reads from a file, or from standard input for the conventional "-" name.
pub enum InputLineSource {
    File(FileLineSource),
    Stdin(StdinLineSource),
}

impl InputLineSource {
    /// Opens the named input, treating "-" as standard input.
    ///
    /// * `name` - File name or "-".
    pub async fn open(name: &str) -> Result<Self, std::io::Error> {
        if name == "-" {
            Ok(InputLineSource::Stdin(StdinLineSource::new()))
        } else {
            Ok(InputLineSource::File(FileLineSource::open(name).await?))
        }
    }

    /// Human-readable name of the input for log messages.
    pub fn describe(name: &str) -> &str {
        if name == "-" {
            "standard input"
        } else {
            name
        }
    }
}

#[async_trait]
impl LineSource for InputLineSource {
    async fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        match self {
            InputLineSource::File(source) => source.next_line().await,
            InputLineSource::Stdin(source) => source.next_line().await,
        }
    }
}

/// Writes lines to standard output, flushed per line so downstream pipes
/// see them immediately.
pub struct StdoutLineSink {
    out: Stdout,
}

impl StdoutLineSink {
    pub fn new() -> Self {
        StdoutLineSink {
            out: tokio::io::stdout(),
        }
    }
}

#[async_trait]
impl LineSink for StdoutLineSink {
    async fn write_line(&mut self, line: &str) -> Result<(), std::io::Error> {
        self.out.write_all(line.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }
}

/// Appends lines to a file, creating it first if necessary.
pub struct FileLineSink {
    file: File,
}

impl FileLineSink {
    /// Opens the file at `path` for appending.
    ///
    /// * `path` - Name of the file to append to.
    pub async fn open_append(path: &str) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(FileLineSink { file })
    }
}

#[async_trait]
impl LineSink for FileLineSink {
    async fn write_line(&mut self, line: &str) -> Result<(), std::io::Error> {
        self.file.write_all(line.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        self.file.flush().await
    }
}

/// In-memory source for tests.
#[cfg(test)]
pub struct MemoryLineSource {
    lines: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl MemoryLineSource {
    pub fn new(lines: &[&str]) -> Self {
        MemoryLineSource {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Lines not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
#[async_trait]
impl LineSource for MemoryLineSource {
    async fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        Ok(self.lines.pop_front())
    }
}

/// In-memory sink for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryLineSink {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl MemoryLineSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl LineSink for MemoryLineSink {
    async fn write_line(&mut self, line: &str) -> Result<(), std::io::Error> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::lines::service::{InputLineSource, MemoryLineSink, MemoryLineSource};
    use crate::lines::service_trait::{LineSink, LineSource};

    #[actix_rt::test]
    async fn memory_source_drains_in_order() {
        let mut source = MemoryLineSource::new(&["one", "two"]);

        assert_eq!(source.next_line().await.unwrap(), Some("one".to_string()));
        assert_eq!(source.next_line().await.unwrap(), Some("two".to_string()));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn memory_sink_keeps_lines() {
        let mut sink = MemoryLineSink::new();

        sink.write_line("first").await.unwrap();
        sink.write_line("second").await.unwrap();

        assert_eq!(sink.lines, vec!["first", "second"]);
    }

    #[test]
    fn input_names_for_logging() {
        assert_eq!(InputLineSource::describe("-"), "standard input");
        assert_eq!(InputLineSource::describe("words.txt"), "words.txt");
    }
}
