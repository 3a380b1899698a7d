//! Dotted addressing of nested sessions.
//!
//! Every record names where it came from with two flat strings:
//!
//! - `message`: the logger component, then each task name, then the action,
//!   joined by `.` (e.g. `api.request.lookup.done`).
//! - `session`: one component per task, joined by `.` (e.g. `3.1`).
//!
//! The action never has a session component; every task in between has exactly
//! one. That pairing is what lets [`Address::decode`] rebuild the task path from
//! a plain log line.
//!
//! Names are not escaped. A task name or action containing `.` encodes fine but
//! cannot be decoded back into the same tasks.

use serde::{Deserialize, Serialize};

/// One level of a nested session: the name it was created with and its
/// session component.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub session: String,
}

impl Task {
    pub fn new(name: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session: session.into(),
        }
    }
}

/// Error decoding a `(message, session)` pair.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("message `{0}` has no separate source and action")]
    TooFewComponents(String),
    #[error("message without tasks carries session `{0}`")]
    UnexpectedSession(String),
    #[error("message has {tasks} task components but session has {sessions}")]
    SessionMismatch { tasks: usize, sessions: usize },
}

/// The encoded `(message, session)` pair for a task path and action.
///
/// `message` here excludes the logger component; see [`Address::wire_message`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub message: String,
    pub session: String,
}

/// Task path and action recovered from a wire message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAddress {
    pub tasks: Vec<Task>,
    pub action: String,
}

impl Address {
    /// Encodes `tasks` (outermost first) and `action`.
    pub fn encode(tasks: &[Task], action: &str) -> Self {
        let message = tasks
            .iter()
            .map(|task| task.name.as_str())
            .chain(std::iter::once(action))
            .collect::<Vec<_>>()
            .join(".");
        let session = tasks
            .iter()
            .map(|task| task.session.as_str())
            .collect::<Vec<_>>()
            .join(".");
        Self { message, session }
    }

    /// Prefixes the message with the logger component, as written on the wire.
    pub fn wire_message(&self, source: &str) -> String {
        format!("{source}.{}", self.message)
    }

    /// Decodes a wire message (component first) and its session string.
    ///
    /// - one component: rejected, there is no way to tell source from action.
    /// - two components: `source.action`, which must come with an empty session.
    /// - more: the first component is the source, the last is the action, and
    ///   the ones in between pair up with the session components in order.
    pub fn decode(wire_message: &str, session: &str) -> Result<DecodedAddress, AddressError> {
        let components: Vec<&str> = wire_message.split('.').collect();
        match components.as_slice() {
            [] | [_] => Err(AddressError::TooFewComponents(wire_message.to_owned())),
            [_source, action] => {
                if !session.is_empty() {
                    return Err(AddressError::UnexpectedSession(session.to_owned()));
                }
                Ok(DecodedAddress {
                    tasks: Vec::new(),
                    action: (*action).to_owned(),
                })
            }
            [_source, names @ .., action] => {
                let sessions: Vec<&str> = session.split('.').collect();
                if names.len() != sessions.len() {
                    return Err(AddressError::SessionMismatch {
                        tasks: names.len(),
                        sessions: sessions.len(),
                    });
                }
                let tasks = names
                    .iter()
                    .zip(sessions)
                    .map(|(name, session)| Task::new(*name, session))
                    .collect();
                Ok(DecodedAddress {
                    tasks,
                    action: (*action).to_owned(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Address, AddressError, Task};

    fn tasks() -> Vec<Task> {
        vec![Task::new("task-1", "1"), Task::new("task-2", "2")]
    }

    #[test]
    fn encodes_tasks_and_action() {
        let address = Address::encode(&tasks(), "action");
        assert_eq!(address.message, "task-1.task-2.action");
        assert_eq!(address.session, "1.2");
    }

    #[test]
    fn encodes_root_level_action() {
        let address = Address::encode(&[], "action");
        assert_eq!(address.message, "action");
        assert_eq!(address.session, "");
        assert_eq!(address.wire_message("source"), "source.action");
    }

    #[test]
    fn decode_inverts_encode() {
        let address = Address::encode(&tasks(), "action");
        let decoded = Address::decode(&address.wire_message("source"), &address.session).unwrap();
        assert_eq!(decoded.tasks, tasks());
        assert_eq!(decoded.action, "action");
    }

    #[test]
    fn decode_root_level_message() {
        let decoded = Address::decode("source.action", "").unwrap();
        assert!(decoded.tasks.is_empty());
        assert_eq!(decoded.action, "action");
    }

    #[test]
    fn decode_rejects_single_component() {
        assert_eq!(
            Address::decode("action", ""),
            Err(AddressError::TooFewComponents("action".into()))
        );
    }

    #[test]
    fn decode_rejects_session_without_tasks() {
        assert_eq!(
            Address::decode("source.action", "1"),
            Err(AddressError::UnexpectedSession("1".into()))
        );
    }

    #[test]
    fn decode_rejects_mismatched_session() {
        assert_eq!(
            Address::decode("source.a.b.action", "1"),
            Err(AddressError::SessionMismatch {
                tasks: 2,
                sessions: 1
            })
        );
    }

    #[test]
    fn dotted_names_do_not_round_trip() {
        let tasks = vec![Task::new("with.dot", "1")];
        let address = Address::encode(&tasks, "action");
        let decoded = Address::decode(&address.wire_message("source"), &address.session);
        assert!(decoded.is_err());
    }
}
