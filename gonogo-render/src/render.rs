use std::time::Duration;

use ab_glyph::FontArc;
use anyhow::Result;
use gonogo_cache::{Atom, get_text, intern_text, text_count};
use gonogo_core::{Phase, SessionSummary, Stimulus, StimulusColor, TrialState};
use gonogo_timing::Timer;
use tiny_skia::{Color, Paint, Pixmap, PixmapPaint, Rect, Transform};

use crate::text::{TextCache, render_text_pixmap};

const TITLE_PX: f32 = 36.0;
const BODY_PX: f32 = 24.0;
const HINT_PX: f32 = 20.0;
const DYNAMIC_PX: f32 = 26.0;
const STIMULUS_PX: u32 = 120;
const FIXATION_PX: u32 = 40;
const LINE_GAP: f32 = 44.0;

#[repr(usize)]
#[derive(Debug, Clone, Copy)]
enum CacheIndex {
    // Static text labels
    WelcomeTitle = 0,
    WelcomeBody = 1,
    AdvanceHint = 2,
    InstructionsTitle = 3,
    InstructionsGo = 4,
    InstructionsKey = 5,
    InstructionsNoGo = 6,
    PracticeHint = 7,
    PracticeDoneTitle = 8,
    MainHint = 9,
    ResultsTitle = 10,
    ResultsThanks = 11,
    SaveHint = 12,
    PracticeTag = 13,

    // Stimulus squares, offset by StimulusColor::cache_id()
    GoStim = 14,
    NoGoStim = 15,

    FixationCross = 16,
}

impl CacheIndex {
    const STATIC_COUNT: usize = 17;
}

/// What the view needs from the session each frame. The renderer never
/// reaches into session internals; the app projects the session into this.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub trial_state: Option<TrialState>,
    pub stimulus: Option<StimulusColor>,
    pub progress: Option<(usize, usize)>,
    pub practice_score: Option<(usize, usize)>,
    pub summary: Option<SessionSummary>,
}

pub struct FrameStats {
    pub clear: Duration,
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
    pub redrawn: bool,
}

pub fn practice_feedback_line(correct: usize, total: usize) -> String {
    format!("You got {correct} out of {total} trials correct.")
}

pub fn accuracy_line(summary: &SessionSummary) -> String {
    format!(
        "Accuracy: {}% ({}/{})",
        summary.accuracy_pct, summary.correct, summary.total
    )
}

pub fn mean_rt_line(summary: &SessionSummary) -> String {
    match summary.mean_rt_ms {
        Some(rt) => format!("Average Reaction Time: {rt} ms"),
        None => "Average Reaction Time: N/A".to_string(),
    }
}

pub fn progress_line(current: usize, total: usize) -> String {
    format!("Trial: {current}/{total}")
}

/// Software renderer: offscreen tiny-skia canvas, prerendered static
/// pixmaps, interned-text cache for the dynamic lines. The canvas is only
/// redrawn when the scene changes; every frame still copies it out so the
/// surface can be re-acquired at any time.
pub struct SkiaRenderer<P: Phase> {
    width: u32,
    height: u32,
    center: (f32, f32),

    font: FontArc,
    static_cache: Vec<Pixmap>,
    text_cache: TextCache,

    canvas: Pixmap,
    last_scene: Option<(P, ViewState)>,
}

impl<P: Phase> SkiaRenderer<P> {
    pub fn new(width: u32, height: u32, font: FontArc, max_trials: usize) -> Self {
        // Progress labels are fully predictable; intern them up front so the
        // per-trial render path never allocates a new atom.
        for current in 0..=max_trials {
            intern_text(&progress_line(current, max_trials));
        }

        let mut renderer = Self {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            font: font.clone(),
            static_cache: Vec::with_capacity(CacheIndex::STATIC_COUNT),
            text_cache: TextCache::new(font, DYNAMIC_PX),
            canvas: Self::blank_canvas(width, height),
            last_scene: None,
        };
        renderer.init_static_cache();
        renderer
    }

    fn blank_canvas(width: u32, height: u32) -> Pixmap {
        let mut canvas = Pixmap::new(width.max(1), height.max(1)).expect("pixmap");
        canvas.fill(Color::from_rgba8(0, 0, 0, 255));
        canvas
    }

    fn init_static_cache(&mut self) {
        let labels: [(CacheIndex, &str, f32); 14] = [
            (CacheIndex::WelcomeTitle, "Welcome to the Behavioral Task", TITLE_PX),
            (
                CacheIndex::WelcomeBody,
                "Thank you for participating in this study.",
                BODY_PX,
            ),
            (CacheIndex::AdvanceHint, "Press ENTER to continue", HINT_PX),
            (CacheIndex::InstructionsTitle, "Instructions", TITLE_PX),
            (
                CacheIndex::InstructionsGo,
                "Respond as quickly as possible when you see a GREEN square.",
                BODY_PX,
            ),
            (
                CacheIndex::InstructionsKey,
                "Press SPACEBAR when you see a green square.",
                BODY_PX,
            ),
            (
                CacheIndex::InstructionsNoGo,
                "Do NOT respond to red squares.",
                BODY_PX,
            ),
            (
                CacheIndex::PracticeHint,
                "Press ENTER to start the practice trials",
                HINT_PX,
            ),
            (CacheIndex::PracticeDoneTitle, "Practice Complete", TITLE_PX),
            (
                CacheIndex::MainHint,
                "Press ENTER to begin the main task",
                HINT_PX,
            ),
            (CacheIndex::ResultsTitle, "Task Complete!", TITLE_PX),
            (
                CacheIndex::ResultsThanks,
                "Thank you for participating.",
                BODY_PX,
            ),
            (
                CacheIndex::SaveHint,
                "Press S to save your data, ESC to exit",
                HINT_PX,
            ),
            (CacheIndex::PracticeTag, "PRACTICE", HINT_PX),
        ];

        let white = Color::from_rgba8(255, 255, 255, 255);
        let mut cache = vec![Pixmap::new(1, 1).expect("pixmap"); CacheIndex::STATIC_COUNT];
        for (index, label, size) in labels {
            cache[index as usize] = render_text_pixmap(label, size, &self.font, white);
        }
        cache[CacheIndex::GoStim as usize] = Self::render_square(StimulusColor::Green.rgba());
        cache[CacheIndex::NoGoStim as usize] = Self::render_square(StimulusColor::Red.rgba());
        cache[CacheIndex::FixationCross as usize] = Self::render_fixation_cross();
        self.static_cache = cache;
    }

    fn render_square(rgba: [u8; 4]) -> Pixmap {
        let mut pm = Pixmap::new(STIMULUS_PX, STIMULUS_PX).expect("pixmap");
        let mut paint = Paint::default();
        paint.anti_alias = false;
        paint.set_color(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        let rect =
            Rect::from_xywh(0.0, 0.0, STIMULUS_PX as f32, STIMULUS_PX as f32).expect("rect");
        pm.fill_rect(rect, &paint, Transform::identity(), None);
        pm
    }

    fn render_fixation_cross() -> Pixmap {
        let size = FIXATION_PX;
        let mut pm = Pixmap::new(size, size).expect("pixmap");
        let mut paint = Paint::default();
        paint.anti_alias = false;
        paint.set_color(Color::from_rgba8(255, 255, 255, 255));

        let mid = (size as f32 - 2.0) * 0.5;
        let horizontal = Rect::from_xywh(0.0, mid, size as f32, 2.0).expect("rect");
        pm.fill_rect(horizontal, &paint, Transform::identity(), None);
        let vertical = Rect::from_xywh(mid, 0.0, 2.0, size as f32).expect("rect");
        pm.fill_rect(vertical, &paint, Transform::identity(), None);
        pm
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        self.canvas = Self::blank_canvas(new_width, new_height);
        self.last_scene = None;
    }

    /// Drop the cached scene so the next frame redraws unconditionally.
    pub fn invalidate(&mut self) {
        self.last_scene = None;
    }

    pub fn render_frame<T: Timer>(
        &mut self,
        phase: P,
        view: &ViewState,
        frame_buffer: &mut [u8],
        timer: &T,
    ) -> Result<FrameStats> {
        let redrawn = self
            .last_scene
            .as_ref()
            .is_none_or(|(p, v)| *p != phase || v != view);

        let mut clear = Duration::ZERO;
        let mut draw = Duration::ZERO;
        if redrawn {
            let t = timer.now();
            self.canvas.fill(Color::from_rgba8(0, 0, 0, 255));
            clear = timer.elapsed(t);

            let t = timer.now();
            self.draw_scene(phase, view);
            draw = timer.elapsed(t);

            self.last_scene = Some((phase, view.clone()));
        }

        let t = timer.now();
        let data = self.canvas.data();
        if frame_buffer.len() == data.len() {
            frame_buffer.copy_from_slice(data);
        }
        let copy = timer.elapsed(t);

        Ok(FrameStats {
            clear,
            draw,
            copy,
            total: clear + draw + copy,
            redrawn,
        })
    }

    fn draw_scene(&mut self, phase: P, view: &ViewState) {
        let (cx, cy) = self.center;

        if phase.is_welcome() {
            self.blit_cached(CacheIndex::WelcomeTitle as usize, (cx, cy - 2.0 * LINE_GAP));
            self.blit_cached(CacheIndex::WelcomeBody as usize, (cx, cy));
            self.blit_cached(CacheIndex::AdvanceHint as usize, (cx, cy + 3.0 * LINE_GAP));
        } else if phase.is_instructions() {
            self.blit_cached(
                CacheIndex::InstructionsTitle as usize,
                (cx, cy - 3.0 * LINE_GAP),
            );
            self.blit_cached(CacheIndex::InstructionsGo as usize, (cx, cy - LINE_GAP));
            self.blit_cached(CacheIndex::InstructionsKey as usize, (cx, cy));
            self.blit_cached(CacheIndex::InstructionsNoGo as usize, (cx, cy + LINE_GAP));
            self.blit_cached(
                CacheIndex::PracticeHint as usize,
                (cx, cy + 3.0 * LINE_GAP),
            );
        } else if phase.is_trial_phase() {
            match view.trial_state {
                Some(TrialState::Fixation) => {
                    self.blit_cached(CacheIndex::FixationCross as usize, (cx, cy));
                }
                Some(TrialState::Stimulus) => {
                    if let Some(color) = view.stimulus {
                        self.blit_cached(CacheIndex::GoStim as usize + color.cache_id(), (cx, cy));
                    }
                }
                // Blank inter-trial gap.
                Some(TrialState::Complete) | None => {}
            }
            if let Some((current, total)) = view.progress {
                let intern_id = intern_text(&progress_line(current, total));
                self.blit_interned_text(intern_id, (70.0, 30.0));
            }
            if phase.is_practice() {
                self.blit_cached(CacheIndex::PracticeTag as usize, (cx, 30.0));
            }
        } else if phase.is_feedback() {
            self.blit_cached(
                CacheIndex::PracticeDoneTitle as usize,
                (cx, cy - 2.0 * LINE_GAP),
            );
            if let Some((correct, total)) = view.practice_score {
                let intern_id = intern_text(&practice_feedback_line(correct, total));
                self.blit_interned_text(intern_id, (cx, cy));
            }
            self.blit_cached(CacheIndex::MainHint as usize, (cx, cy + 3.0 * LINE_GAP));
        } else if phase.is_results() {
            self.blit_cached(CacheIndex::ResultsTitle as usize, (cx, cy - 3.0 * LINE_GAP));
            self.blit_cached(CacheIndex::ResultsThanks as usize, (cx, cy - LINE_GAP));
            if let Some(summary) = &view.summary {
                let accuracy_id = intern_text(&accuracy_line(summary));
                let rt_id = intern_text(&mean_rt_line(summary));
                self.blit_interned_text(accuracy_id, (cx, cy + LINE_GAP));
                self.blit_interned_text(rt_id, (cx, cy + 2.0 * LINE_GAP));
            }
            self.blit_cached(CacheIndex::SaveHint as usize, (cx, cy + 4.0 * LINE_GAP));
        }
    }

    fn blit_cached(&mut self, index: usize, center: (f32, f32)) {
        let Some(pm) = self.static_cache.get(index) else {
            return;
        };
        let x = (center.0 - pm.width() as f32 * 0.5).round() as i32;
        let y = (center.1 - pm.height() as f32 * 0.5).round() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            pm.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn blit_interned_text(&mut self, intern_id: usize, center: (f32, f32)) {
        if intern_id >= text_count() {
            return;
        }
        let atom = Atom::from(get_text(intern_id).as_str());
        let pm = self.text_cache.get_or_render(atom);
        let x = (center.0 - pm.width() as f32 * 0.5).round() as i32;
        let y = (center.1 - pm.height() as f32 * 0.5).round() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            (*pm).as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_line_spells_out_the_score() {
        assert_eq!(
            practice_feedback_line(2, 4),
            "You got 2 out of 4 trials correct."
        );
    }

    #[test]
    fn summary_lines_cover_both_rt_cases() {
        let with_rt = SessionSummary {
            accuracy_pct: 85,
            correct: 34,
            total: 40,
            mean_rt_ms: Some(301),
        };
        assert_eq!(accuracy_line(&with_rt), "Accuracy: 85% (34/40)");
        assert_eq!(mean_rt_line(&with_rt), "Average Reaction Time: 301 ms");

        let without_rt = SessionSummary {
            accuracy_pct: 40,
            correct: 16,
            total: 40,
            mean_rt_ms: None,
        };
        assert_eq!(mean_rt_line(&without_rt), "Average Reaction Time: N/A");
    }

    #[test]
    fn progress_label_matches_the_trial_counter() {
        assert_eq!(progress_line(12, 40), "Trial: 12/40");
    }
}
