//! Course sessions: one initialization chain, one cached outcome, and the
//! events describing how it got there.

mod events;
mod initializer;
mod outcome;
mod state;

pub use events::{InitState, SessionEvent, SessionEvents};
pub use initializer::{init_record, SessionInitializer};
pub use outcome::{OutcomeCell, SessionHandle, SessionOutcome};
pub use state::{SessionId, SessionShared};
