//! Streams password guesses against the captured handshake set.

use thiserror::Error;

use crate::cracker::set::{HandshakeSet, HandshakeSetError};
use crate::cracker::token::{format_token, PotEntry, TokenScanner};
use crate::crypto::password::Password;
use crate::lines::service_trait::{LineSink, LineSource};
use crate::protocol::rfb::{Challenge, Response};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("handshake bookkeeping defect: {0}")]
    Defect(#[from] HandshakeSetError),
}

/// The offline matcher. Handshakes go in once, then the pot pass and the
/// wordlist pass each remove the pairs they solve.
pub struct Matcher {
    set: HandshakeSet,
    scanner: TokenScanner,
}

impl Matcher {
    pub fn new() -> Self {
        Matcher {
            set: HandshakeSet::new(),
            scanner: TokenScanner::new(),
        }
    }

    /// Adds one captured pair. Returns false if it was already known.
    pub fn add(&mut self, challenge: Challenge, response: Response) -> bool {
        self.set.add(challenge, response)
    }

    /// Scans every line of `source` for handshake tokens.
    ///
    /// Returns how many previously unseen pairs the source contributed.
    pub async fn read_handshakes(
        &mut self,
        source: &mut impl LineSource,
    ) -> Result<usize, std::io::Error> {
        let mut added = 0;
        while let Some(line) = source.next_line().await? {
            for (challenge, response) in self.scanner.scan_line(&line) {
                if self.set.add(challenge, response) {
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    /// Removes pairs already solved in an earlier run.
    ///
    /// Each pot line whose pair is still live is reported to `results` as a
    /// POT line and taken out of the set. Returns the number removed.
    pub async fn check_pot(
        &mut self,
        pot: &mut impl LineSource,
        results: &mut impl LineSink,
    ) -> Result<usize, MatchError> {
        let mut found = 0;
        while let Some(line) = pot.next_line().await? {
            let Some(entry) = self.scanner.scan_pot_line(&line) else {
                continue;
            };
            if !self.set.contains(&entry.challenge, &entry.response) {
                continue;
            }
            results
                .write_line(&format!("POT {}", entry.to_line()))
                .await?;
            self.set.remove(&entry.challenge, &entry.response)?;
            found += 1;
        }
        Ok(found)
    }

    /// Tries each wordlist line against every remaining challenge.
    ///
    /// Cracked pairs are reported to `results` as FOUND lines, appended to
    /// `pot_out` when one is given, and removed from the set. Stops as soon
    /// as the set empties, without draining the rest of the wordlist.
    /// Returns the number cracked.
    pub async fn crack<P: LineSink>(
        &mut self,
        wordlist: &mut impl LineSource,
        mut pot_out: Option<&mut P>,
        results: &mut impl LineSink,
    ) -> Result<usize, MatchError> {
        let mut cracked = 0;
        loop {
            if self.set.is_empty() {
                break;
            }
            let Some(line) = wordlist.next_line().await? else {
                break;
            };
            let password = Password::new(&line);
            cracked += self.try_password(&password, &mut pot_out, results).await?;
        }
        Ok(cracked)
    }

    /// Tests one password against every live challenge.
    ///
    /// At most one response per challenge can match a given password, so a
    /// hit removes exactly that pair and the scan moves to the next
    /// challenge.
    async fn try_password<P: LineSink>(
        &mut self,
        password: &Password,
        pot_out: &mut Option<&mut P>,
        results: &mut impl LineSink,
    ) -> Result<usize, MatchError> {
        let mut cracked = 0;
        for challenge in self.set.challenges() {
            let expected = password.cipher().encrypt(&challenge);
            if !self.set.contains(&challenge, &expected) {
                continue;
            }
            let entry = PotEntry {
                challenge,
                response: expected,
                plaintext: password.shown(),
            };
            let line = entry.to_line();
            if let Some(pot) = pot_out.as_mut() {
                pot.write_line(&line).await?;
            }
            results.write_line(&format!("FOUND {line}")).await?;
            self.set.remove(&challenge, &expected)?;
            cracked += 1;
        }
        Ok(cracked)
    }

    /// Reports every pair the wordlist never solved as a NOTFOUND line.
    pub async fn report_uncracked(
        &self,
        results: &mut impl LineSink,
    ) -> Result<(), std::io::Error> {
        for (challenge, response) in self.set.pairs() {
            results
                .write_line(&format!("NOTFOUND {}", format_token(&challenge, &response)))
                .await?;
        }
        Ok(())
    }

    /// Number of pairs still awaiting a crack.
    pub fn remaining(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
