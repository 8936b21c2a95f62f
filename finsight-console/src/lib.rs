//! Finsight console service layer
//!
//! Ties the pure report engine to the outside world: HTTP-backed record
//! services, generation-counted stores, periodic refresh tasks, and the
//! session context injected into report assembly.

pub mod poller;
pub mod service;
pub mod session;
pub mod store;

pub use poller::{RefreshScheduler, RefreshTask};
pub use service::{RecordSource, RegistrationLogService, SubscriptionService};
pub use session::{CurrentUser, CurrentUserProvider, StaticUserProvider};
pub use store::{RecordStore, RefreshOutcome};
