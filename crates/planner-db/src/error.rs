use std::fmt;

use uuid::Uuid;

/// A row addressed by id does not exist.
///
/// Query functions return this wrapped in `anyhow::Error`; callers that need
/// to tell a missing row apart from a database failure use
/// [`anyhow::Error::downcast_ref`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFound {
    pub entity: Entity,
    pub id: Uuid,
}

/// The kind of row a [`NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Solution,
    UseCase,
    Prerequisite,
    PocPlan,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Solution => "solution",
            Self::UseCase => "use case",
            Self::Prerequisite => "prerequisite",
            Self::PocPlan => "poc plan",
        };
        f.write_str(s)
    }
}

impl NotFound {
    pub fn new(entity: Entity, id: Uuid) -> Self {
        Self { entity, id }
    }
}

/// Whether `err` (or anything it wraps) is a [`NotFound`].
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<NotFound>().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_entity_and_id() {
        let id = Uuid::nil();
        let err = NotFound::new(Entity::UseCase, id);
        assert_eq!(err.to_string(), format!("use case {id} not found"));
    }

    #[test]
    fn detected_through_anyhow() {
        let err: anyhow::Error = NotFound::new(Entity::Solution, Uuid::nil()).into();
        assert!(is_not_found(&err));
        assert!(!is_not_found(&anyhow::anyhow!("connection refused")));
    }
}
