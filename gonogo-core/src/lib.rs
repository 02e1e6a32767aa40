pub mod phase;
pub mod stimulus;
pub mod summary;
pub mod trial;

pub use phase::{Phase, TaskPhase};
pub use stimulus::{Stimulus, StimulusColor};
pub use summary::SessionSummary;
pub use trial::{RecordPhase, ResponseRecord, TrialSpec, TrialState, response_correct};
