use chrono::{SecondsFormat, Utc};
use gonogo_core::{
    Phase, RecordPhase, ResponseRecord, SessionSummary, StimulusColor, TrialSpec, TrialState,
    response_correct,
};
use gonogo_timing::Timer;
use rand::Rng;
use tracing::{debug, error, info};

use crate::config::TaskConfig;
use crate::summary::{practice_score, summarize};
use crate::trials::{generate_main_trials, practice_sequence};

/// Events the session reacts to: the two user signals, plus the deadline
/// expirations `update()` detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    AdvancePressed,
    ResponsePressed,
    FixationElapsed,
    ResponseWindowElapsed,
    InterTrialElapsed,
    PhaseComplete,
}

/// Live trial bookkeeping. Every deadline is derived from these timestamps,
/// so starting a new trial retires the previous response window wholesale —
/// a stale window can never fire against the wrong trial.
#[derive(Debug, Clone)]
pub struct ActiveTrial {
    /// Zero-based index into the current phase's trial list.
    pub index: usize,
    pub spec: TrialSpec,
    pub state: TrialState,
    pub fixation_start_ns: u64,
    pub stimulus_start_ns: Option<u64>,
    /// First accepted response; the sole per-trial response flag.
    pub response_ns: Option<u64>,
    /// Set when the record is appended; anchors the inter-trial wait.
    pub complete_ns: Option<u64>,
}

/// The task runner: a single-threaded state machine over phases and trial
/// sub-states. `update()` scans the live deadlines against the timer and
/// returns the due events; `handle_event()` applies transitions. The caller
/// owns the loop (and the input source), so the whole lifecycle is drivable
/// from tests with a manual clock.
pub struct TaskSession<P, T>
where
    P: Phase,
    T: Timer<Timestamp = u64>,
{
    pub phase: P,
    pub timer: T,
    pub config: TaskConfig,
    participant: String,
    practice_list: Vec<TrialSpec>,
    main_list: Vec<TrialSpec>,
    current: Option<ActiveTrial>,
    /// Zero-based, monotone within a phase, reset on phase entry.
    phase_trial_index: usize,
    /// Append-only, completion order.
    records: Vec<ResponseRecord>,
    summary: Option<SessionSummary>,
}

impl<P, T> TaskSession<P, T>
where
    P: Phase,
    T: Timer<Timestamp = u64>,
{
    pub fn new<R: Rng>(config: TaskConfig, timer: T, mut rng: R) -> Self {
        let participant = format!("participant_{}", Utc::now().timestamp_millis());
        let main_list = generate_main_trials(&mut rng, config.main_trials, config.target_probability);
        Self::with_lists(config, timer, participant, practice_sequence(), main_list)
    }

    /// Seam for tests and replays: fixed lists, fixed participant id.
    pub fn with_lists(
        config: TaskConfig,
        timer: T,
        participant: String,
        practice_list: Vec<TrialSpec>,
        main_list: Vec<TrialSpec>,
    ) -> Self {
        Self {
            phase: P::default(),
            timer,
            config,
            participant,
            practice_list,
            main_list,
            current: None,
            phase_trial_index: 0,
            records: Vec::new(),
            summary: None,
        }
    }

    /// Scan deadlines and report what is due. Pure with respect to wall
    /// time: same state + same clock reading, same events.
    pub fn update(&mut self) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        if !self.phase.is_trial_phase() {
            return events;
        }

        let now = self.timer.now();
        match &self.current {
            Some(trial) => match trial.state {
                TrialState::Fixation => {
                    if now.saturating_sub(trial.fixation_start_ns)
                        >= self.config.fixation_ms * 1_000_000
                    {
                        events.push(TaskEvent::FixationElapsed);
                    }
                }
                TrialState::Stimulus => {
                    if let Some(start) = trial.stimulus_start_ns {
                        if now.saturating_sub(start) >= self.config.response_window_ms * 1_000_000 {
                            events.push(TaskEvent::ResponseWindowElapsed);
                        }
                    }
                }
                TrialState::Complete => {
                    if let Some(done) = trial.complete_ns {
                        if now.saturating_sub(done) >= self.config.inter_trial_ms * 1_000_000 {
                            events.push(TaskEvent::InterTrialElapsed);
                        }
                    }
                }
            },
            None => {
                if self.phase_trial_index >= self.trial_list().len() {
                    events.push(TaskEvent::PhaseComplete);
                }
            }
        }

        events
    }

    /// Apply one event. Returns whether the event had any effect; stale or
    /// out-of-phase events fall through harmlessly.
    pub fn handle_event(&mut self, event: TaskEvent) -> bool {
        match event {
            TaskEvent::AdvancePressed if self.phase.awaits_advance() => self.advance_phase(),

            TaskEvent::ResponsePressed if self.phase.accepts_response() => self.record_response(),

            TaskEvent::FixationElapsed if self.in_trial_state(TrialState::Fixation) => {
                let now = self.timer.now();
                if let Some(trial) = self.current.as_mut() {
                    trial.state = TrialState::Stimulus;
                    trial.stimulus_start_ns = Some(now);
                    debug!(trial = trial.index, color = ?trial.spec.color, "stimulus onset");
                }
                true
            }

            TaskEvent::ResponseWindowElapsed if self.in_trial_state(TrialState::Stimulus) => {
                // Window elapsed with no accepted response.
                self.finish_trial()
            }

            TaskEvent::InterTrialElapsed if self.in_trial_state(TrialState::Complete) => {
                self.current = None;
                self.phase_trial_index += 1;
                if self.phase_trial_index < self.trial_list().len() {
                    self.start_trial();
                }
                true
            }

            TaskEvent::PhaseComplete
                if self.phase.is_trial_phase() && self.current.is_none() =>
            {
                self.advance_phase()
            }

            _ => false,
        }
    }

    fn advance_phase(&mut self) -> bool {
        if let Some(next) = self.phase.next() {
            self.phase = next;
            self.phase_trial_index = 0;
            self.current = None;
            info!(phase = ?self.phase, "phase entered");

            if self.phase.is_trial_phase() {
                self.start_trial();
            }
            if self.phase.is_results() {
                self.finalize();
            }
            true
        } else {
            false
        }
    }

    fn start_trial(&mut self) {
        let Some(spec) = self.trial_list().get(self.phase_trial_index).copied() else {
            return;
        };
        let now = self.timer.now();
        debug!(trial = self.phase_trial_index, ?spec, "fixation onset");
        self.current = Some(ActiveTrial {
            index: self.phase_trial_index,
            spec,
            state: TrialState::Fixation,
            fixation_start_ns: now,
            stimulus_start_ns: None,
            response_ns: None,
            complete_ns: None,
        });
    }

    /// Accept a response signal. Only the first press inside the stimulus
    /// window counts; everything else is ignored.
    fn record_response(&mut self) -> bool {
        let now = self.timer.now();
        let Some(trial) = self.current.as_mut() else {
            return false;
        };
        if trial.state != TrialState::Stimulus || trial.response_ns.is_some() {
            return false;
        }
        trial.response_ns = Some(now);
        self.finish_trial()
    }

    /// Exit the stimulus sub-state: append exactly one record, then hold in
    /// `Complete` for the inter-trial wait.
    fn finish_trial(&mut self) -> bool {
        let now = self.timer.now();
        let record_phase = if self.phase.is_practice() {
            RecordPhase::Practice
        } else {
            RecordPhase::Main
        };
        let list: &[TrialSpec] = if self.phase.is_practice() {
            &self.practice_list
        } else {
            &self.main_list
        };

        let Some(trial) = self.current.as_mut() else {
            return false;
        };
        // Malformed-state guard: the index must still name a trial in the
        // phase list. Failing it aborts only this record write.
        let Some(spec) = list.get(trial.index).copied() else {
            error!(trial = trial.index, "no trial at index, record dropped");
            return false;
        };

        let reaction_time = trial
            .response_ns
            .map(|r| r.saturating_sub(trial.stimulus_start_ns.unwrap_or(r)) / 1_000_000);
        let responded = reaction_time.is_some();
        let correct = response_correct(responded, spec.is_target);

        let record = ResponseRecord {
            participant: self.participant.clone(),
            trial: trial.index + 1,
            phase: record_phase,
            color: spec.color,
            target: spec.is_target,
            response: responded.then(|| self.config.response_key_label.clone()),
            reaction_time,
            correct,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        debug!(
            trial = trial.index,
            responded,
            correct,
            rt_ms = ?record.reaction_time,
            "record appended"
        );

        trial.state = TrialState::Complete;
        trial.complete_ns = Some(now);
        self.records.push(record);
        true
    }

    fn finalize(&mut self) {
        let summary = summarize(&self.records);
        info!(
            accuracy_pct = summary.accuracy_pct,
            mean_rt_ms = ?summary.mean_rt_ms,
            records = self.records.len(),
            "session complete"
        );
        self.summary = Some(summary);
    }

    fn trial_list(&self) -> &[TrialSpec] {
        if self.phase.is_practice() {
            &self.practice_list
        } else if self.phase.is_main() {
            &self.main_list
        } else {
            &[]
        }
    }

    fn in_trial_state(&self, state: TrialState) -> bool {
        self.current.as_ref().is_some_and(|t| t.state == state)
    }

    pub fn participant_id(&self) -> &str {
        &self.participant
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn practice_score(&self) -> (usize, usize) {
        practice_score(&self.records)
    }

    pub fn current_trial_state(&self) -> Option<TrialState> {
        self.current.as_ref().map(|t| t.state)
    }

    pub fn current_stimulus(&self) -> Option<StimulusColor> {
        self.current.as_ref().map(|t| t.spec.color)
    }

    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        if !self.phase.is_trial_phase() {
            return None;
        }
        let total = self.trial_list().len();
        Some(((self.phase_trial_index + 1).min(total), total))
    }
}
