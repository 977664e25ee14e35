//! Interface of the line producers and consumers

use async_trait::async_trait;
use mockall::predicate::*;
#[cfg(test)]
use mockall::automock;

/// Produces lines one at a time, e.g. passwords from a wordlist or hosts
/// from a target file.
#[async_trait]
pub trait LineSource {
    /// Returns the next line without its terminator, or [None] at end of input.
    async fn next_line(&mut self) -> Result<Option<String>, std::io::Error>;
}

/// Consumes one line at a time, e.g. solved pot entries or capture records.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LineSink {
    async fn write_line(&mut self, line: &str) -> Result<(), std::io::Error>;
}
