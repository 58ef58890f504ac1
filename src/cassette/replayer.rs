//! Serves recorded interactions back in order.

use std::collections::{BTreeMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Pending calls for one `(port, method)` stream.
#[derive(Debug, Default)]
struct Stream {
    pending: VecDeque<Interaction>,
    served: usize,
    last_seq: Option<u64>,
}

/// Hands out a cassette's interactions one at a time, each stream in the
/// order it was recorded. Streams are independent of each other.
#[derive(Debug)]
pub struct CassetteReplayer {
    streams: BTreeMap<(String, String), Stream>,
}

impl CassetteReplayer {
    /// Indexes the cassette by port and method.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut streams: BTreeMap<(String, String), Stream> = BTreeMap::new();
        for interaction in &cassette.interactions {
            let key = (interaction.port.clone(), interaction.method.clone());
            streams.entry(key).or_default().pending.push_back(interaction.clone());
        }
        Self { streams }
    }

    /// Takes the next recorded call for `port`/`method`.
    ///
    /// # Errors
    ///
    /// Returns a `cassette exhausted` message when the stream was never
    /// recorded (listing the streams that were) or has been fully served.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<Interaction, String> {
        let key = (port.to_string(), method.to_string());
        if !self.streams.contains_key(&key) {
            let known: Vec<String> =
                self.streams.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            return Err(format!(
                "cassette exhausted: nothing recorded for {port}::{method} (recorded: [{}])",
                known.join(", ")
            ));
        }
        let stream = self.streams.entry(key).or_default();
        let Some(interaction) = stream.pending.pop_front() else {
            return Err(format!(
                "cassette exhausted: all {} {port}::{method} calls already served (last seq {})",
                stream.served,
                stream.last_seq.map_or_else(|| "-".to_string(), |seq| seq.to_string()),
            ));
        };
        stream.served += 1;
        stream.last_seq = Some(interaction.seq);
        Ok(interaction)
    }
}
