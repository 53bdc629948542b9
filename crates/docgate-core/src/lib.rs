//! docgate core library: per-client admission control.
//!
//! The [`AdmissionController`] keeps one [`ClientState`] per client
//! identifier (usually the remote IP) and admits at most one request per
//! refill interval for each of them. Idle entries are reclaimed by a
//! background sweep started with [`spawn_reclaimer`].
//!
//! # Modules
//!
//! - [`admission`]: the controller and its per-client state.
//! - [`reclaim`]: the cancellable background sweep task.
//! - [`clock`]: time source seam ([`SystemClock`], [`ManualClock`] for tests).
//! - [`config`]: [`LimiterConfig`], fixed at construction.
//! - [`error`]: [`CoreError`] and [`CoreResult`].

pub mod admission;
pub mod clock;
pub mod config;
pub mod error;
pub mod reclaim;

pub use admission::{AdmissionController, ClientState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LimiterConfig;
pub use error::{CoreError, CoreResult};
pub use reclaim::spawn_reclaimer;
