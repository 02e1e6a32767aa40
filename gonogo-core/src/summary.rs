use serde::{Deserialize, Serialize};

/// Performance summary shown on the results screen, computed once over the
/// main-phase records when the session reaches that state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// round(100 * correct / total) over main-phase records.
    pub accuracy_pct: u32,
    pub correct: usize,
    pub total: usize,
    /// Mean reaction time over correct target responses, rounded to the
    /// nearest millisecond. `None` when no such trial exists.
    pub mean_rt_ms: Option<u64>,
}
