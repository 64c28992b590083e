//! Network reachability observer.
//!
//! Consumes a stream of network-path descriptors, classifies each one into a
//! five-way [`ConnectivityStatus`], and publishes the latest value to
//! pollers, callback subscribers, and a JSON event stream. The `reachd`
//! binary runs the observer against the OS interface table; library users
//! can feed any path sequence through the channel instead.

pub mod config;
pub mod error;
pub mod events;
pub mod monitor;
pub mod observer;
pub mod path;
pub mod status;

pub use error::MonitorError;
pub use observer::{ConnectivityObserver, StatusSnapshot, SubscriptionHandle};
pub use path::{InterfaceKind, NetworkPath};
pub use status::ConnectivityStatus;
