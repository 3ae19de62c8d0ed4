use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nback_core::Judgment;
use nback_experiment::{ConfigField, ExperimentConfig, SessionEvent, SessionState};
use nback_render::{load_font, SkiaRenderer};
use nback_timing::HighPrecisionTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn harness() -> Option<(SkiaRenderer, Vec<u8>, HighPrecisionTimer)> {
    let font = match load_font(None) {
        Ok(font) => font,
        Err(e) => {
            eprintln!("skipping render benchmarks: {e:#}");
            return None;
        }
    };
    let renderer = SkiaRenderer::new(WIDTH, HEIGHT, font).ok()?;
    let fb = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    Some((renderer, fb, HighPrecisionTimer::new()))
}

/// A finished 100-trial session with every judgeable trial answered.
fn finished_session() -> SessionState {
    let mut rng = StdRng::seed_from_u64(11);
    let config = ExperimentConfig {
        trial_count: 100,
        max_response_ms: 500,
        ..ExperimentConfig::default()
    };
    let (mut state, _) = SessionState::new(config).reduce(SessionEvent::Start, &mut rng);
    while state.is_running() {
        let (next, _) = state.reduce(SessionEvent::Judge(Judgment::Same), &mut rng);
        let (next, _) = next.reduce(SessionEvent::Tick, &mut rng);
        state = next;
    }
    state
}

fn running_session() -> SessionState {
    let mut rng = StdRng::seed_from_u64(12);
    let (state, _) = SessionState::new(ExperimentConfig::default()).reduce(SessionEvent::Start, &mut rng);
    let (state, _) = state.reduce(SessionEvent::Tick, &mut rng);
    state
}

pub fn bench_frames(c: &mut Criterion) {
    let Some((mut renderer, mut fb, mut timer)) = harness() else {
        return;
    };
    let mut g = c.benchmark_group("render_frame");
    g.sample_size(40);

    for (name, state) in [("running", running_session()), ("results", finished_session())] {
        g.bench_function(name, |b| {
            b.iter(|| {
                let stats =
                    renderer.render_frame(&state, ConfigField::TrialCount, &mut fb, &mut timer);
                black_box(stats.map(|s| s.total))
            })
        });
    }

    g.finish();
}

criterion_group!(benches, bench_frames);
criterion_main!(benches);
