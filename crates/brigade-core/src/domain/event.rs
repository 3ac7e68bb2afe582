//! Event scope and classification.
//!
//! The transport delivers one event at a time as a scope (metadata map)
//! plus a `Connection`. Classification turns the stringly-typed scope into
//! an `EventKind` before any registry mutation happens, so a malformed
//! event can never leave the registry half-updated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ids::{Capability, WorkerId};
use crate::error::DispatchError;
use crate::ports::Connection;

/// Wire-level event type strings. These are the transport's contract and
/// must not be renamed.
pub const TYPE_ON_DUTY: &str = "staff.onduty";
pub const TYPE_OFF_DUTY: &str = "staff.offduty";
pub const TYPE_ORDER: &str = "order";

/// `speciality` appears on the wire either as a single string (orders)
/// or as a list (duty-start). The untagged enum accepts both shapes;
/// classification decides which shape is legal for which event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Speciality {
    One(String),
    Many(Vec<String>),
}

/// Event metadata as handed over by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speciality: Option<Speciality>,
}

impl Scope {
    pub fn duty_start(id: impl Into<String>, capabilities: &[&str]) -> Self {
        Self {
            kind: TYPE_ON_DUTY.to_string(),
            id: Some(id.into()),
            speciality: Some(Speciality::Many(
                capabilities.iter().map(|s| s.to_string()).collect(),
            )),
        }
    }

    pub fn duty_end(id: impl Into<String>) -> Self {
        Self {
            kind: TYPE_OFF_DUTY.to_string(),
            id: Some(id.into()),
            speciality: None,
        }
    }

    pub fn order(capability: impl Into<String>) -> Self {
        Self {
            kind: TYPE_ORDER.to_string(),
            id: None,
            speciality: Some(Speciality::One(capability.into())),
        }
    }
}

/// One event as delivered to the handler: metadata plus the originator's
/// message channel. For duty-start events the channel becomes the stored
/// worker handle; for orders it is the requester's side of the relay.
pub struct Event {
    pub scope: Scope,
    pub conn: Arc<dyn Connection>,
}

impl Event {
    pub fn new(scope: Scope, conn: Arc<dyn Connection>) -> Self {
        Self { scope, conn }
    }
}

/// Classified event. Unknown types and missing fields are rejected here
/// with `InvalidEvent` rather than silently ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    DutyStart {
        id: WorkerId,
        capabilities: Vec<Capability>,
    },
    DutyEnd {
        id: WorkerId,
    },
    Order {
        capability: Capability,
    },
}

impl EventKind {
    /// Classify a scope.
    ///
    /// Shape rules (chosen once, applied uniformly):
    /// - duty-start: `speciality` is a set; a single string is accepted and
    ///   treated as a one-element set. An empty set is legal (the worker is
    ///   on duty but unreachable via capability search).
    /// - order: `speciality` is exactly one capability; a list is rejected.
    pub fn classify(scope: &Scope) -> Result<Self, DispatchError> {
        match scope.kind.as_str() {
            TYPE_ON_DUTY => {
                let id = require_id(scope)?;
                let capabilities = match &scope.speciality {
                    Some(Speciality::Many(all)) => {
                        all.iter().map(Capability::new).collect()
                    }
                    Some(Speciality::One(s)) => vec![Capability::new(s)],
                    None => {
                        return Err(DispatchError::InvalidEvent(
                            "duty-start scope has no speciality".to_string(),
                        ));
                    }
                };
                Ok(Self::DutyStart { id, capabilities })
            }
            TYPE_OFF_DUTY => Ok(Self::DutyEnd {
                id: require_id(scope)?,
            }),
            TYPE_ORDER => match &scope.speciality {
                Some(Speciality::One(s)) => Ok(Self::Order {
                    capability: Capability::new(s),
                }),
                Some(Speciality::Many(_)) => Err(DispatchError::InvalidEvent(
                    "order scope must carry a single speciality".to_string(),
                )),
                None => Err(DispatchError::InvalidEvent(
                    "order scope has no speciality".to_string(),
                )),
            },
            other => Err(DispatchError::InvalidEvent(format!(
                "unrecognized event type: {other}"
            ))),
        }
    }
}

fn require_id(scope: &Scope) -> Result<WorkerId, DispatchError> {
    scope
        .id
        .as_deref()
        .map(WorkerId::new)
        .ok_or_else(|| {
            DispatchError::InvalidEvent(format!("{} scope has no id", scope.kind))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn classifies_duty_start_with_capability_set() {
        let scope = Scope::duty_start("w1", &["grill", "fry"]);
        let kind = EventKind::classify(&scope).unwrap();
        assert_eq!(
            kind,
            EventKind::DutyStart {
                id: WorkerId::new("w1"),
                capabilities: vec![Capability::new("grill"), Capability::new("fry")],
            }
        );
    }

    #[test]
    fn duty_start_accepts_single_speciality_as_one_element_set() {
        let scope = Scope {
            kind: TYPE_ON_DUTY.to_string(),
            id: Some("w1".to_string()),
            speciality: Some(Speciality::One("grill".to_string())),
        };
        let kind = EventKind::classify(&scope).unwrap();
        assert_eq!(
            kind,
            EventKind::DutyStart {
                id: WorkerId::new("w1"),
                capabilities: vec![Capability::new("grill")],
            }
        );
    }

    #[test]
    fn duty_start_with_empty_set_is_legal() {
        let scope = Scope::duty_start("w1", &[]);
        let kind = EventKind::classify(&scope).unwrap();
        assert_eq!(
            kind,
            EventKind::DutyStart {
                id: WorkerId::new("w1"),
                capabilities: vec![],
            }
        );
    }

    #[test]
    fn classifies_order() {
        let scope = Scope::order("grill");
        let kind = EventKind::classify(&scope).unwrap();
        assert_eq!(
            kind,
            EventKind::Order {
                capability: Capability::new("grill"),
            }
        );
    }

    #[rstest]
    #[case::unknown_type(Scope { kind: "table.cleanup".to_string(), id: None, speciality: None })]
    #[case::duty_start_without_id(Scope { kind: TYPE_ON_DUTY.to_string(), id: None, speciality: Some(Speciality::Many(vec![])) })]
    #[case::duty_start_without_speciality(Scope { kind: TYPE_ON_DUTY.to_string(), id: Some("w1".to_string()), speciality: None })]
    #[case::duty_end_without_id(Scope { kind: TYPE_OFF_DUTY.to_string(), id: None, speciality: None })]
    #[case::order_without_speciality(Scope { kind: TYPE_ORDER.to_string(), id: None, speciality: None })]
    #[case::order_with_speciality_list(Scope { kind: TYPE_ORDER.to_string(), id: None, speciality: Some(Speciality::Many(vec!["grill".to_string()])) })]
    fn rejects_malformed_scopes(#[case] scope: Scope) {
        let err = EventKind::classify(&scope).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidEvent(_)));
    }

    #[test]
    fn scope_round_trips_through_wire_shape() {
        let json = serde_json::json!({
            "type": "staff.onduty",
            "id": "w1",
            "speciality": ["grill", "fry"],
        });
        let scope: Scope = serde_json::from_value(json).unwrap();
        assert_eq!(scope.kind, TYPE_ON_DUTY);
        assert_eq!(scope.id.as_deref(), Some("w1"));

        let order_json = serde_json::json!({ "type": "order", "speciality": "grill" });
        let order: Scope = serde_json::from_value(order_json).unwrap();
        assert_eq!(
            order.speciality,
            Some(Speciality::One("grill".to_string()))
        );
    }
}
