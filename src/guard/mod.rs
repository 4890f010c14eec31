pub mod clock;
pub mod key;
pub mod stats;
pub mod store;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::SubmissionKey;
pub use stats::{GuardStats, StatsSnapshot};
pub use store::{Decision, DuplicateGuard, GuardConfig};
pub use sweeper::{GuardSweeper, SweeperHandle};
