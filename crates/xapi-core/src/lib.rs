//! # xapi-core
//!
//! Binds a course to a Learning Record Store session and tracks it with
//! xAPI statements.
//!
//! A launch (explicit values, an async producer or a launch URL) is resolved
//! once. A static token makes the session ready immediately; a cmi5 fetch
//! URL is exchanged for a token, the launch data is read and the cmi5
//! `initialized` statement is sent before anything else may be.
//!
//! ## Key Concepts
//!
//! - **XapiCourse**: the dispatcher: send statements, read and write state
//! - **SessionOutcome**: ready, inert or error; computed once per course
//! - **ContextComposer**: merges the launch context template into statements
//! - **LrsClient**: the xAPI REST resources over a pluggable `Transport`

pub mod client;
pub mod compose;
pub mod course;
pub mod error;
pub mod language_map;
pub mod launch;
pub mod logging;
pub mod model;
pub mod session;
pub mod statements;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use client::{DocumentOptions, LrsClient, LrsConfig};
pub use course::{CourseConfig, XapiCourse, XapiCourseBuilder};
pub use error::{TransportError, XapiError};
pub use launch::{LaunchInput, LaunchParameters};
pub use session::{InitState, SessionEvent, SessionOutcome};
pub use transport::{LrsResponse, Transport, UreqTransport};
