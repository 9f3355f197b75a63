//! Interlocking scenario sandbox: author timed state changes for a station
//! layout and project the consistent layout state at any tick.

pub mod appearance;
pub mod codec;
pub mod coupling;
pub mod error;
pub mod event;
pub mod generator;
pub mod lenient;
pub mod names;
pub mod reachability;
pub mod resolver;
pub mod session;
pub mod snapshot;
pub mod states;
pub mod store;
pub mod topology;
pub mod types;
