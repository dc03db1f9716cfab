//! xAPI data model.
//!
//! Plain serde types mirroring the JSON shapes of the xAPI 1.0.3 data and
//! communication specifications. Optional properties are skipped when absent
//! so that serialized statements stay minimal.

pub mod activity;
pub mod actor;
pub mod context;
pub mod result;
pub mod statement;
pub mod verb;

pub use activity::{Activity, ActivityDefinition};
pub use actor::{Account, Actor};
pub use context::{Context, ContextActivities, StatementReference};
pub use result::{Score, XapiResult};
pub use statement::{About, PartialStatement, Statement, StatementResult};
pub use verb::Verb;

/// Free-form extension map keyed by IRI.
pub type Extensions = serde_json::Map<String, serde_json::Value>;

/// Language tag to display string, kept in insertion order.
pub type LanguageMap = indexmap::IndexMap<String, String>;
