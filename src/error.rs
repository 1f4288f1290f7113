use thiserror::Error;

/// An action that cannot be performed under the current game state.
///
/// Expected in normal play (healing at full health, walking into a wall,
/// targeting an unseen cell). The reason is shown in the message log and
/// the turn is not consumed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Impossible(pub String);

impl Impossible {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self(reason.into())
    }
}
