use serde::{Deserialize, Serialize};

use crate::stimulus::StimulusColor;

/// Immutable description of one go/no-go trial. `is_target` alone decides
/// correct behavior; `color` is what gets shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSpec {
    pub color: StimulusColor,
    pub is_target: bool,
}

/// Trial state machine sub-states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    /// Fixation cue shown; input ignored.
    Fixation,
    /// Colored square shown; first response signal wins, window is bounded.
    Stimulus,
    /// Record appended; inter-trial wait before the next fixation.
    Complete,
}

/// Which phase a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordPhase {
    Practice,
    Main,
}

impl RecordPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordPhase::Practice => "practice",
            RecordPhase::Main => "main",
        }
    }
}

/// One row of exported data per completed trial.
///
/// Field order is the canonical export column order; the CSV writer derives
/// its header from the serialized record, so reordering fields here reorders
/// the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub participant: String,
    /// 1-based, resets at each phase boundary.
    pub trial: usize,
    pub phase: RecordPhase,
    pub color: StimulusColor,
    pub target: bool,
    /// Label of the key that was pressed, set iff `reaction_time` is set.
    pub response: Option<String>,
    /// Milliseconds from stimulus onset to the response signal.
    pub reaction_time: Option<u64>,
    pub correct: bool,
    /// ISO-8601 UTC, millisecond precision.
    pub timestamp: String,
}

impl ResponseRecord {
    pub fn responded(&self) -> bool {
        self.reaction_time.is_some()
    }
}

/// A trial is correct iff the participant responded to a target or withheld
/// for a non-target.
pub fn response_correct(responded: bool, is_target: bool) -> bool {
    (responded && is_target) || (!responded && !is_target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correctness_rule_covers_all_cases() {
        assert!(response_correct(true, true));
        assert!(!response_correct(true, false));
        assert!(!response_correct(false, true));
        assert!(response_correct(false, false));
    }

    #[test]
    fn record_serializes_in_export_order() {
        let record = ResponseRecord {
            participant: "participant_1700000000000".to_string(),
            trial: 1,
            phase: RecordPhase::Practice,
            color: StimulusColor::Green,
            target: true,
            response: Some("spacebar".to_string()),
            reaction_time: Some(312),
            correct: true,
            timestamp: "2026-08-08T10:00:00.000Z".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"phase\":\"practice\""));
        assert!(json.contains("\"color\":\"green\""));
        let participant = json.find("participant").unwrap();
        let timestamp = json.find("timestamp").unwrap();
        assert!(participant < timestamp);
    }
}
