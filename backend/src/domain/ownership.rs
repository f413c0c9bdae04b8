//! Ownership checks shared by every user-owned entity.
//!
//! A record owned by someone else is reported exactly like a missing record,
//! so ids cannot be probed to discover other users' data.

use super::{Error, UserId};

/// Entities that belong to exactly one user.
pub trait Owned {
    /// The owning user's id.
    fn owner(&self) -> UserId;
}

/// Keep `record` only when `user` owns it.
///
/// # Examples
/// ```
/// use study_assistant::domain::{owned_by, Owned, UserId};
///
/// struct Note(UserId);
/// impl Owned for Note {
///     fn owner(&self) -> UserId { self.0 }
/// }
///
/// let alice = UserId::random();
/// let bob = UserId::random();
/// assert!(owned_by(Some(Note(alice)), alice).is_some());
/// assert!(owned_by(Some(Note(alice)), bob).is_none());
/// ```
pub fn owned_by<T: Owned>(record: Option<T>, user: UserId) -> Option<T> {
    record.filter(|found| found.owner() == user)
}

/// Require that `record` exists and is owned by `user`, else `404 {what} not found`.
pub fn require_owned<T: Owned>(record: Option<T>, user: UserId, what: &str) -> Result<T, Error> {
    owned_by(record, user).ok_or_else(|| Error::not_found(format!("{what} not found")))
}
