//! Session initialisation: the board is only fetched once the profile of
//! the signed-in user is known.

use shared::domain::{ProfileSummary, UserId};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    ProfileLoading {
        user_id: UserId,
    },
    Ready {
        profile: ProfileSummary,
    },
    NoProfile {
        user_id: UserId,
    },
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::ProfileLoading { .. } => "profile_loading",
            SessionState::Ready { .. } => "ready",
            SessionState::NoProfile { .. } => "no_profile",
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            SessionState::Uninitialized => None,
            SessionState::ProfileLoading { user_id } | SessionState::NoProfile { user_id } => {
                Some(*user_id)
            }
            SessionState::Ready { profile } => Some(profile.user_id),
        }
    }

    /// User id, but only once the profile is loaded.
    pub fn ready_user(&self) -> Option<UserId> {
        match self {
            SessionState::Ready { profile } => Some(profile.user_id),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready { .. })
    }

    /// Any state may restart loading, e.g. on user switch.
    pub fn begin(&mut self, user_id: UserId) {
        *self = SessionState::ProfileLoading { user_id };
    }

    /// Applies a profile lookup result. Results for a user that is no
    /// longer loading are stale and ignored.
    pub fn complete(&mut self, user_id: UserId, profile: Option<ProfileSummary>) -> bool {
        if *self != (SessionState::ProfileLoading { user_id }) {
            return false;
        }
        *self = match profile {
            Some(profile) => SessionState::Ready { profile },
            None => SessionState::NoProfile { user_id },
        };
        true
    }

    /// The lookup itself failed; go back to the start.
    pub fn fail(&mut self, user_id: UserId) -> bool {
        if *self != (SessionState::ProfileLoading { user_id }) {
            return false;
        }
        *self = SessionState::Uninitialized;
        true
    }

    pub fn reset(&mut self) {
        *self = SessionState::Uninitialized;
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
