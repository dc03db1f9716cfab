//! Picks the one source launch parameters come from.

use futures::future::BoxFuture;
use std::future::Future;

use super::params::{LaunchInput, LaunchParameters};
use crate::error::XapiError;

/// Asynchronous source of launch input, e.g. a settings lookup.
pub type LaunchProducer = BoxFuture<'static, Option<LaunchInput>>;

/// Result of [`LaunchResolver::resolve`].
pub enum Resolution {
    /// Known now. `None` means the course was not launched.
    Resolved(Option<LaunchParameters>),

    /// Known once the producer completes; validated then.
    Pending(LaunchProducer),
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Resolved(params) => f.debug_tuple("Resolved").field(params).finish(),
            Resolution::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Chooses between explicit input, an async producer and a location query.
///
/// Priority: explicit > producer > location > none. Only the winning source
/// is consulted; the others are dropped unread.
#[derive(Default)]
pub struct LaunchResolver {
    explicit: Option<LaunchInput>,
    producer: Option<LaunchProducer>,
    location: Option<String>,
}

impl LaunchResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn explicit(mut self, input: impl Into<LaunchInput>) -> Self {
        self.explicit = Some(input.into());
        self
    }

    pub fn producer<F>(mut self, producer: F) -> Self
    where
        F: Future<Output = Option<LaunchInput>> + Send + 'static,
    {
        self.producer = Some(Box::pin(producer));
        self
    }

    /// URL or query string carrying launch parameters.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Resolve synchronous sources now.
    ///
    /// Malformed or partial explicit/location input fails here, before any
    /// session exists.
    pub fn resolve(self) -> Result<Resolution, XapiError> {
        if let Some(input) = self.explicit {
            return input.into_parameters().map(Resolution::Resolved);
        }
        if let Some(producer) = self.producer {
            return Ok(Resolution::Pending(producer));
        }
        if let Some(location) = self.location {
            return LaunchInput::from_query(&location)?
                .into_parameters()
                .map(Resolution::Resolved);
        }
        Ok(Resolution::Resolved(None))
    }
}
