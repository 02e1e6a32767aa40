use criterion::{Criterion, criterion_group, criterion_main};
use gonogo_core::{StimulusColor, TaskPhase, TrialState};
use gonogo_render::{SkiaRenderer, ViewState, load_interface_font};
use gonogo_timing::HighPrecisionTimer;

fn bench_screens(c: &mut Criterion) {
    let font = load_interface_font().expect("interface font");
    let mut renderer: SkiaRenderer<TaskPhase> = SkiaRenderer::new(1280, 720, font, 40);
    let timer = HighPrecisionTimer::new();
    let mut frame = vec![0u8; (1280 * 720 * 4) as usize];

    let stimulus_view = ViewState {
        trial_state: Some(TrialState::Stimulus),
        stimulus: Some(StimulusColor::Green),
        progress: Some((12, 40)),
        practice_score: None,
        summary: None,
    };
    c.bench_function("render_stimulus_screen", |b| {
        b.iter(|| {
            renderer.invalidate();
            renderer
                .render_frame(TaskPhase::Main, &stimulus_view, &mut frame, &timer)
                .unwrap();
        })
    });

    let welcome_view = ViewState {
        trial_state: None,
        stimulus: None,
        progress: None,
        practice_score: None,
        summary: None,
    };
    c.bench_function("render_welcome_screen", |b| {
        b.iter(|| {
            renderer.invalidate();
            renderer
                .render_frame(TaskPhase::Welcome, &welcome_view, &mut frame, &timer)
                .unwrap();
        })
    });

    c.bench_function("render_unchanged_scene", |b| {
        b.iter(|| {
            renderer
                .render_frame(TaskPhase::Welcome, &welcome_view, &mut frame, &timer)
                .unwrap();
        })
    });
}

criterion_group!(benches, bench_screens);
criterion_main!(benches);
