mod poller;
mod progress;

pub use poller::{PollerHandle, PollerSnapshot, PollerState, TrainingPoller};
pub use progress::{PollOutcome, TrainingProgress};
