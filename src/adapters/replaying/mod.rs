//! Replaying adapters that serve recorded interactions.

pub mod remote;

pub use remote::ReplayingRemote;

use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cassette::replayer::CassetteReplayer;
use crate::error::{RemoteError, RemoteResult};

/// Pull the next recorded output for `method` off the replayer.
pub(crate) fn next_output(replayer: &Mutex<CassetteReplayer>, method: &str) -> RemoteResult<Value> {
    let mut guard =
        replayer.lock().map_err(|_| RemoteError::Replay("replayer lock poisoned".into()))?;
    let interaction = guard.next_interaction("remote", method).map_err(RemoteError::Replay)?;
    Ok(interaction.output)
}

/// Decode an output recorded with the Ok/Err JSON convention.
///
/// Mirror of `recording::record_result`. Recorded errors come back as
/// [`RemoteError::Replay`] carrying the original message.
pub(crate) fn replay_result<T: DeserializeOwned>(output: Value, method: &str) -> RemoteResult<T> {
    match output {
        Value::Object(mut map) if map.contains_key("Ok") => {
            let value = map.remove("Ok").unwrap_or(Value::Null);
            serde_json::from_value(value)
                .map_err(|e| RemoteError::Replay(format!("{method}: bad recorded value: {e}")))
        }
        Value::Object(map) if map.contains_key("Err") => {
            let message = match map.get("Err") {
                Some(Value::String(msg)) => msg.clone(),
                other => other.map(Value::to_string).unwrap_or_default(),
            };
            Err(RemoteError::Replay(message))
        }
        other => Err(RemoteError::Replay(format!(
            "{method}: expected {{Ok: ..}} or {{Err: ..}}, found {other}"
        ))),
    }
}
