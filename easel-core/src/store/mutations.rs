//! State slices and the mutations that replace them.
//!
//! Each mutation is a synchronous, total replacement of one field. There is no
//! partial merge: callers pass complete values.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::types::{Pictures, PublicPictures, UserProfile};
use crate::backend::User;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub current_user: Option<User>,
    pub user_profile: Option<UserProfile>,
    /// Plan payload from the internal API, stored verbatim.
    pub plan: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PicturesState {
    pub pictures: Pictures,
    pub public_pictures: PublicPictures,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootState {
    pub auth: AuthState,
    pub pictures: PicturesState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetUser(Option<User>),
    SetProfile(Option<UserProfile>),
    SetPlan(Option<Value>),
    SetPictures(Pictures),
    SetPublicPictures(PublicPictures),
}

/// Tag of a [`Mutation`], broadcast to views after every commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationType {
    SetUser,
    SetProfile,
    SetPlan,
    SetPictures,
    SetPublicPictures,
}

impl MutationType {
    pub fn as_str(self) -> &'static str {
        match self {
            MutationType::SetUser => "SET_USER",
            MutationType::SetProfile => "SET_PROFILE",
            MutationType::SetPlan => "SET_PLAN",
            MutationType::SetPictures => "SET_PICTURES",
            MutationType::SetPublicPictures => "SET_PUBLIC_PICTURES",
        }
    }
}

impl fmt::Display for MutationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Mutation {
    pub fn kind(&self) -> MutationType {
        match self {
            Mutation::SetUser(_) => MutationType::SetUser,
            Mutation::SetProfile(_) => MutationType::SetProfile,
            Mutation::SetPlan(_) => MutationType::SetPlan,
            Mutation::SetPictures(_) => MutationType::SetPictures,
            Mutation::SetPublicPictures(_) => MutationType::SetPublicPictures,
        }
    }

    pub fn apply(self, state: &mut RootState) {
        match self {
            Mutation::SetUser(user) => state.auth.current_user = user,
            Mutation::SetProfile(profile) => state.auth.user_profile = profile,
            Mutation::SetPlan(plan) => state.auth.plan = plan,
            Mutation::SetPictures(pictures) => state.pictures.pictures = pictures,
            Mutation::SetPublicPictures(public) => state.pictures.public_pictures = public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::DbRecord;

    #[test]
    fn set_pictures_replaces_whole_collection() {
        let mut state = RootState::default();
        let mut first = Pictures::new();
        first.insert("a".into(), DbRecord::new("data:a"));
        first.insert("b".into(), DbRecord::new("data:b"));
        Mutation::SetPictures(first).apply(&mut state);

        let mut second = Pictures::new();
        second.insert("c".into(), DbRecord::new("data:c"));
        Mutation::SetPictures(second).apply(&mut state);

        let keys: Vec<_> = state.pictures.pictures.keys().cloned().collect();
        assert_eq!(keys, vec!["c".to_string()]);
    }

    #[test]
    fn mutations_only_touch_their_own_field() {
        let mut state = RootState::default();
        let user = User {
            uid: "u1".into(),
            email: None,
        };
        Mutation::SetUser(Some(user.clone())).apply(&mut state);
        Mutation::SetPlan(Some(serde_json::json!({"type": "DEFAULT_PLAN"}))).apply(&mut state);

        assert_eq!(state.auth.current_user, Some(user));
        assert!(state.auth.user_profile.is_none());
        assert!(state.pictures.pictures.is_empty());
    }

    #[test]
    fn kind_matches_wire_name() {
        let kind = Mutation::SetPublicPictures(Default::default()).kind();
        assert_eq!(kind.to_string(), "SET_PUBLIC_PICTURES");
        assert_eq!(Mutation::SetUser(None).kind(), MutationType::SetUser);
    }
}
