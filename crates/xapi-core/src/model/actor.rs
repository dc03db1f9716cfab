//! Actors: agents and groups.

use serde::{Deserialize, Serialize};

/// An account on some system, identified by its home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Canonical home page of the system the account is on.
    pub home_page: String,

    /// Unique id or login name of the account.
    pub name: String,
}

/// Who performed the action. Either an Agent or a Group.
///
/// Exactly one inverse functional identifier (`mbox`, `mbox_sha1sum`,
/// `openid`, `account`) identifies an agent; this type does not enforce it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbox: Option<String>,

    #[serde(rename = "mbox_sha1sum", skip_serializing_if = "Option::is_none")]
    pub mbox_sha1sum: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,

    /// Group members. Only meaningful when `object_type` is `Group`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Vec<Actor>>,
}

impl Actor {
    /// Agent identified by a `mailto:` IRI.
    pub fn mbox(name: impl Into<String>, email: &str) -> Self {
        Self {
            name: Some(name.into()),
            mbox: Some(format!("mailto:{}", email.trim_start_matches("mailto:"))),
            ..Self::default()
        }
    }

    /// Agent identified by an account.
    pub fn account(home_page: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            account: Some(Account {
                home_page: home_page.into(),
                name: name.into(),
            }),
            ..Self::default()
        }
    }
}
