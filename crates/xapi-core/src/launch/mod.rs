//! Launch handling: where the session's parameters come from and how a
//! cmi5 fetch-URL launch is turned into credentials and launch data.

pub mod cmi5;
pub mod data;
pub mod exchange;
pub mod params;
pub mod resolver;

pub use data::{EntitlementKey, LaunchData, LaunchDataFetcher, LaunchMode, MoveOn, LAUNCH_DATA_STATE_ID};
pub use exchange::AuthorizationExchanger;
pub use params::{LaunchAuth, LaunchInput, LaunchParameters};
pub use resolver::{LaunchProducer, LaunchResolver, Resolution};
