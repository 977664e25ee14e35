//! The in-memory set of handshakes still awaiting a crack decision.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::protocol::rfb::{Challenge, Response};

#[derive(Debug, Error, PartialEq, Eq)]
/// Removal of a pair that is not live. Indicates a bookkeeping defect in
/// the caller, never bad input.
pub enum HandshakeSetError {
    #[error("challenge {} is not in the set", hex::encode_upper(.0))]
    UnknownChallenge(Challenge),
    #[error(
        "response {} is not recorded for challenge {}",
        hex::encode_upper(.1),
        hex::encode_upper(.0)
    )]
    UnknownResponse(Challenge, Response),
}

#[derive(Debug)]
/// Maps each challenge to the distinct responses captured for it.
///
/// The same challenge can carry several responses (separate capture
/// sessions answering the same decoy challenge), and each pair is cracked
/// and removed independently. Removing the last response for a challenge
/// removes the challenge itself.
pub struct HandshakeSet {
    entries: HashMap<Challenge, HashSet<Response>>,
}

impl HandshakeSet {
    pub fn new() -> Self {
        HandshakeSet {
            entries: HashMap::new(),
        }
    }

    /// Adds a pair. Returns false if it was already present.
    pub fn add(&mut self, challenge: Challenge, response: Response) -> bool {
        self.entries.entry(challenge).or_default().insert(response)
    }

    pub fn contains(&self, challenge: &Challenge, response: &Response) -> bool {
        self.entries
            .get(challenge)
            .map(|responses| responses.contains(response))
            .unwrap_or(false)
    }

    /// Removes a pair that must be live.
    pub fn remove(
        &mut self,
        challenge: &Challenge,
        response: &Response,
    ) -> Result<(), HandshakeSetError> {
        let responses = self
            .entries
            .get_mut(challenge)
            .ok_or(HandshakeSetError::UnknownChallenge(*challenge))?;
        if !responses.remove(response) {
            return Err(HandshakeSetError::UnknownResponse(*challenge, *response));
        }
        if responses.is_empty() {
            self.entries.remove(challenge);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of live (challenge, response) pairs, not challenges.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashSet::len).sum()
    }

    /// Snapshot of the live challenges, safe to iterate while removing.
    pub fn challenges(&self) -> Vec<Challenge> {
        self.entries.keys().copied().collect()
    }

    /// Snapshot of every live pair.
    pub fn pairs(&self) -> Vec<(Challenge, Response)> {
        self.entries
            .iter()
            .flat_map(|(challenge, responses)| {
                responses.iter().map(|response| (*challenge, *response))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::cracker::set::{HandshakeSet, HandshakeSetError};

    #[test]
    fn duplicate_pairs_are_kept_once() {
        let mut set = HandshakeSet::new();

        assert!(set.add([1u8; 16], [2u8; 16]));
        assert!(!set.add([1u8; 16], [2u8; 16]));

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn one_challenge_holds_many_responses() {
        let mut set = HandshakeSet::new();
        set.add([1u8; 16], [2u8; 16]);
        set.add([1u8; 16], [3u8; 16]);
        set.add([4u8; 16], [5u8; 16]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.challenges().len(), 2);
    }

    #[test]
    fn removing_the_last_response_drops_the_challenge() {
        let mut set = HandshakeSet::new();
        set.add([1u8; 16], [2u8; 16]);
        set.add([1u8; 16], [3u8; 16]);

        set.remove(&[1u8; 16], &[2u8; 16]).unwrap();
        assert!(set.contains(&[1u8; 16], &[3u8; 16]));
        assert_eq!(set.challenges().len(), 1);

        set.remove(&[1u8; 16], &[3u8; 16]).unwrap();
        assert!(set.is_empty());
        assert!(set.challenges().is_empty());
    }

    #[test]
    fn removing_unknown_pairs_is_a_defect() {
        let mut set = HandshakeSet::new();
        set.add([1u8; 16], [2u8; 16]);

        assert_eq!(
            set.remove(&[9u8; 16], &[2u8; 16]),
            Err(HandshakeSetError::UnknownChallenge([9u8; 16]))
        );
        assert_eq!(
            set.remove(&[1u8; 16], &[9u8; 16]),
            Err(HandshakeSetError::UnknownResponse([1u8; 16], [9u8; 16]))
        );
    }
}
