//! Change tracking.
//!
//! Permission sources announce changes through content-free signals. The
//! engine subscribes to two such feeds (global and role permissions) and the
//! handlers do nothing but mark the store stale; reloading is deferred to the
//! next decision request.

mod feed;
mod tracker;

pub use feed::{ChangeFeed, ChangeHandler, ChangeNotifier, Subscription};
pub use tracker::ChangeTracker;
