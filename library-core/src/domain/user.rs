//! User domain model

use serde::Serialize;

use super::credential::{Argon2Params, Credential};
use super::ids::UserId;
use super::result::Result;

/// Shortest password accepted by `change_password`, in characters
pub const MIN_PASSWORD_LEN: usize = 6;

/// A library member who can log in and borrow books
///
/// `role` is a free-form tag such as "reader" or "librarian".
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: String,
    #[serde(skip)]
    credential: Credential,
    blocked: bool,
}

impl User {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        role: impl Into<String>,
        password: &str,
        params: &Argon2Params,
    ) -> Result<Self> {
        Ok(Self {
            id,
            email: email.into(),
            role: role.into(),
            credential: Credential::hash(password, params)?,
            blocked: false,
        })
    }

    /// Succeeds iff the account is not blocked and the password verifies
    pub fn login(&self, password: &str) -> bool {
        !self.blocked && self.credential.verify(password)
    }

    /// Replace the password
    ///
    /// Returns false and leaves the stored credential untouched when the user
    /// is blocked, the old password does not verify, or the new one is
    /// shorter than [`MIN_PASSWORD_LEN`].
    pub fn change_password(&mut self, old_password: &str, new_password: &str) -> bool {
        if self.blocked || !self.credential.verify(old_password) {
            return false;
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return false;
        }

        match self.credential.rehash(new_password) {
            Ok(credential) => {
                self.credential = credential;
                true
            }
            Err(e) => {
                tracing::warn!(user_id = %self.id, error = %e, "failed to hash new password");
                false
            }
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn block(&mut self) {
        self.blocked = true;
    }

    pub fn unblock(&mut self) {
        self.blocked = false;
    }
}
