/// Defines task phases and behavior
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    /// Response key is live (trial phases only; sub-state gating is the
    /// session's job).
    fn accepts_response(&self) -> bool;
    /// Screen waits for an explicit advance action.
    fn awaits_advance(&self) -> bool;
    fn next(&self) -> Option<Self>;

    fn is_practice(&self) -> bool {
        false
    }
    fn is_main(&self) -> bool {
        false
    }

    fn is_welcome(&self) -> bool {
        false
    }

    fn is_instructions(&self) -> bool {
        false
    }

    fn is_feedback(&self) -> bool {
        false
    }

    fn is_results(&self) -> bool {
        false
    }

    fn is_trial_phase(&self) -> bool {
        self.is_practice() || self.is_main()
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum TaskPhase {
    Welcome,
    Instructions,
    Practice,
    PracticeFeedback,
    Main,
    Results,
}

impl Default for TaskPhase {
    fn default() -> Self {
        TaskPhase::Welcome
    }
}

impl Phase for TaskPhase {
    fn accepts_response(&self) -> bool {
        matches!(self, Self::Practice | Self::Main)
    }

    fn awaits_advance(&self) -> bool {
        matches!(
            self,
            Self::Welcome | Self::Instructions | Self::PracticeFeedback
        )
    }

    fn next(&self) -> Option<Self> {
        use TaskPhase::*;
        Some(match self {
            Welcome => Instructions,
            Instructions => Practice,
            Practice => PracticeFeedback,
            PracticeFeedback => Main,
            Main => Results,
            Results => return None,
        })
    }

    fn is_practice(&self) -> bool {
        matches!(self, TaskPhase::Practice)
    }

    fn is_main(&self) -> bool {
        matches!(self, TaskPhase::Main)
    }

    fn is_welcome(&self) -> bool {
        matches!(self, TaskPhase::Welcome)
    }

    fn is_instructions(&self) -> bool {
        matches!(self, TaskPhase::Instructions)
    }

    fn is_feedback(&self) -> bool {
        matches!(self, TaskPhase::PracticeFeedback)
    }

    fn is_results(&self) -> bool {
        matches!(self, TaskPhase::Results)
    }
}
