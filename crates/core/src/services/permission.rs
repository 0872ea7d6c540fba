//! Authorization policy.
//!
//! Reads are public. Writes need an authenticated principal, and writes to an
//! existing post or comment additionally need that principal to be its author.
//!
//! The checks are pure functions over the principal and the target so that
//! handlers can run the collection check before loading anything and the
//! object check once the record is known.

use yatube_common::{AppError, AppResult};
use yatube_db::entities::user;

/// Kind of access a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Safe methods: `GET`, `HEAD`, `OPTIONS`.
    Read,
    /// Everything else.
    Write,
}

impl Operation {
    /// Classify an HTTP method name.
    #[must_use]
    pub fn from_method(method: &str) -> Self {
        match method {
            "GET" | "HEAD" | "OPTIONS" => Self::Read,
            _ => Self::Write,
        }
    }

    /// Whether this is a read.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Read)
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Access granted.
    Allow,
    /// No principal on a write.
    Unauthenticated,
    /// Principal present but not the author.
    Forbidden,
}

impl Decision {
    /// Whether access is granted.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Turn a denial into the matching error.
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Unauthenticated => Err(AppError::Unauthorized),
            Self::Forbidden => Err(AppError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            )),
        }
    }
}

/// Collection-level check, run before any record is identified.
#[must_use]
pub const fn collection_access(op: Operation, principal: Option<&user::Model>) -> Decision {
    if op.is_read() || principal.is_some() {
        Decision::Allow
    } else {
        Decision::Unauthenticated
    }
}

/// Object-level check against a record owned by `author_id`.
#[must_use]
pub fn object_access(op: Operation, principal: Option<&user::Model>, author_id: i32) -> Decision {
    if op.is_read() {
        return Decision::Allow;
    }
    match principal {
        None => Decision::Unauthenticated,
        Some(user) if user.id == author_id => Decision::Allow,
        Some(_) => Decision::Forbidden,
    }
}

/// Require a principal regardless of the operation.
pub fn require_authenticated(principal: Option<&user::Model>) -> AppResult<&user::Model> {
    principal.ok_or(AppError::Unauthorized)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_user(id: i32) -> user::Model {
        user::Model {
            id,
            username: format!("user{id}"),
            password: "hash".to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            date_joined: Utc::now().into(),
        }
    }

    #[test]
    fn test_method_classification() {
        for method in ["GET", "HEAD", "OPTIONS"] {
            assert_eq!(Operation::from_method(method), Operation::Read);
        }
        for method in ["POST", "PUT", "PATCH", "DELETE"] {
            assert_eq!(Operation::from_method(method), Operation::Write);
        }
    }

    #[test]
    fn test_collection_access() {
        let user = create_test_user(1);

        assert_eq!(collection_access(Operation::Read, None), Decision::Allow);
        assert_eq!(
            collection_access(Operation::Write, None),
            Decision::Unauthenticated
        );
        assert_eq!(
            collection_access(Operation::Write, Some(&user)),
            Decision::Allow
        );
    }

    #[test]
    fn test_object_access() {
        let author = create_test_user(1);
        let other = create_test_user(2);

        assert_eq!(object_access(Operation::Read, None, 1), Decision::Allow);
        assert_eq!(object_access(Operation::Read, Some(&other), 1), Decision::Allow);
        assert_eq!(
            object_access(Operation::Write, None, 1),
            Decision::Unauthenticated
        );
        assert_eq!(
            object_access(Operation::Write, Some(&other), 1),
            Decision::Forbidden
        );
        assert_eq!(
            object_access(Operation::Write, Some(&author), 1),
            Decision::Allow
        );
    }

    #[test]
    fn test_decisions_map_to_distinct_errors() {
        assert!(Decision::Allow.into_result().is_ok());
        assert!(matches!(
            Decision::Unauthenticated.into_result(),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            Decision::Forbidden.into_result(),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_authenticated() {
        let user = create_test_user(3);
        assert_eq!(require_authenticated(Some(&user)).unwrap().id, 3);
        assert!(matches!(
            require_authenticated(None),
            Err(AppError::Unauthorized)
        ));
    }
}
