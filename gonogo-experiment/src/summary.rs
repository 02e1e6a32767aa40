use gonogo_core::{RecordPhase, ResponseRecord, SessionSummary};

/// Summary statistics over the main-phase records. Accuracy counts every
/// main trial; mean reaction time counts only correct target responses.
pub fn summarize(records: &[ResponseRecord]) -> SessionSummary {
    let main: Vec<&ResponseRecord> = records
        .iter()
        .filter(|r| r.phase == RecordPhase::Main)
        .collect();

    let total = main.len();
    let correct = main.iter().filter(|r| r.correct).count();
    let accuracy_pct = if total == 0 {
        0
    } else {
        (100.0 * correct as f64 / total as f64).round() as u32
    };

    let rts: Vec<u64> = main
        .iter()
        .filter(|r| r.target && r.correct)
        .filter_map(|r| r.reaction_time)
        .collect();
    let mean_rt_ms = if rts.is_empty() {
        None
    } else {
        Some((rts.iter().sum::<u64>() as f64 / rts.len() as f64).round() as u64)
    };

    SessionSummary {
        accuracy_pct,
        correct,
        total,
        mean_rt_ms,
    }
}

/// (correct, total) over practice records, for the feedback screen.
pub fn practice_score(records: &[ResponseRecord]) -> (usize, usize) {
    let practice: Vec<&ResponseRecord> = records
        .iter()
        .filter(|r| r.phase == RecordPhase::Practice)
        .collect();
    let correct = practice.iter().filter(|r| r.correct).count();
    (correct, practice.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gonogo_core::StimulusColor;
    use pretty_assertions::assert_eq;

    fn record(
        phase: RecordPhase,
        target: bool,
        reaction_time: Option<u64>,
        correct: bool,
    ) -> ResponseRecord {
        ResponseRecord {
            participant: "participant_test".to_string(),
            trial: 1,
            phase,
            color: if target {
                StimulusColor::Green
            } else {
                StimulusColor::Red
            },
            target,
            response: reaction_time.map(|_| "spacebar".to_string()),
            reaction_time,
            correct,
            timestamp: "2026-08-08T10:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn mean_rt_rounds_to_nearest_millisecond() {
        let mut records = Vec::new();
        for rt in [300, 320, 280, 310, 290, 305] {
            records.push(record(RecordPhase::Main, true, Some(rt), true));
        }
        // 1805 / 6 = 300.833... -> 301
        let summary = summarize(&records);
        assert_eq!(summary.mean_rt_ms, Some(301));
        assert_eq!(summary.accuracy_pct, 100);
        assert_eq!(summary.total, 6);
    }

    #[test]
    fn mean_rt_skips_incorrect_and_non_target_trials() {
        let records = vec![
            record(RecordPhase::Main, true, Some(400), true),
            // Incorrect target (no response) contributes nothing.
            record(RecordPhase::Main, true, None, false),
            // A non-target response never enters the mean, correct or not.
            record(RecordPhase::Main, false, Some(100), false),
            record(RecordPhase::Main, false, None, true),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.mean_rt_ms, Some(400));
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.accuracy_pct, 50);
    }

    #[test]
    fn mean_rt_is_none_when_no_correct_target_response_exists() {
        let records = vec![
            record(RecordPhase::Main, true, None, false),
            record(RecordPhase::Main, false, None, true),
        ];
        assert_eq!(summarize(&records).mean_rt_ms, None);
    }

    #[test]
    fn practice_records_never_enter_the_summary() {
        let records = vec![
            record(RecordPhase::Practice, true, Some(250), true),
            record(RecordPhase::Main, true, Some(350), true),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.mean_rt_ms, Some(350));
    }

    #[test]
    fn empty_record_set_summarizes_to_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.accuracy_pct, 0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.mean_rt_ms, None);
    }

    #[test]
    fn practice_score_counts_practice_only() {
        let records = vec![
            record(RecordPhase::Practice, true, Some(250), true),
            record(RecordPhase::Practice, false, Some(100), false),
            record(RecordPhase::Main, true, Some(350), true),
        ];
        assert_eq!(practice_score(&records), (1, 2));
    }
}
