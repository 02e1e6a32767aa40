use serde::{Deserialize, Serialize};

/// Defines stimuli and their render data
pub trait Stimulus: Copy + Clone + Send + Sync + std::fmt::Debug {
    fn cache_id(&self) -> usize;
}

/// The task's two stimulus colors. Instructions tell participants to respond
/// to green and withhold for red; target classification is carried separately
/// on the trial spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusColor {
    Green,
    Red,
}

impl StimulusColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            StimulusColor::Green => "green",
            StimulusColor::Red => "red",
        }
    }

    /// RGBA used by the renderer for the stimulus square.
    pub fn rgba(&self) -> [u8; 4] {
        match self {
            StimulusColor::Green => [0, 170, 0, 255],
            StimulusColor::Red => [200, 0, 0, 255],
        }
    }
}

impl Stimulus for StimulusColor {
    fn cache_id(&self) -> usize {
        match self {
            StimulusColor::Green => 0,
            StimulusColor::Red => 1,
        }
    }
}
