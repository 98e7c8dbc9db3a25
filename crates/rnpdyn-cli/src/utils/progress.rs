use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use rnpdyn::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// The bar plus the analysis phase it is currently rendering.
struct FrameBar {
    bar: ProgressBar,
    phase: &'static str,
    frames_done: u64,
}

impl FrameBar {
    fn apply(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                self.phase = name;
                self.frames_done = 0;
                self.bar.reset();
                self.bar.set_length(0);
                self.bar.set_style(CliProgressHandler::spinner_style());
                self.bar.set_prefix(name);
                self.bar.set_message(format!("{}: preparing frames", name));
                self.bar
                    .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::TaskStart { total_steps } => {
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_style(CliProgressHandler::frame_style());
                self.bar.set_length(total_steps);
                self.bar.set_position(0);
            }
            Progress::TaskIncrement => self.bar.inc(1),
            Progress::TaskFinish => {
                let total = self.bar.length().unwrap_or(0).max(self.bar.position());
                self.bar.set_position(total);
                self.frames_done = total;
                self.bar.finish();
            }
            Progress::PhaseFinish => {
                self.bar.disable_steady_tick();
                self.bar.set_style(CliProgressHandler::spinner_style());
                self.bar.finish_with_message(format!(
                    "✓ {} ({} frames)",
                    self.phase, self.frames_done
                ));
            }
            Progress::Message(msg) if self.bar.is_finished() => self.bar.set_message(msg),
            Progress::Message(msg) => self.bar.println(format!("  {}: {}", self.phase, msg)),
        }
    }
}

/// Renders engine progress as one frame bar per analysis phase.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<FrameBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A handler that tracks state but never draws, for `--quiet` runs.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target)
            .with_style(Self::spinner_style())
            .with_message("Loading frames...");
        bar.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(FrameBar {
                bar,
                phase: "",
                frames_done: 0,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);
        Box::new(move |progress: Progress| match state.lock() {
            Ok(mut frame_bar) => frame_bar.apply(progress),
            Err(_) => warn!("Progress state mutex was poisoned; dropping event."),
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn frame_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix:<10} [{bar:40.cyan/blue}] frame {pos}/{len} ({frame_rate}, {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key(
            "frame_rate",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1} frames/s", state.per_sec());
            },
        )
        .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.1}s left", state.eta().as_secs_f64());
        })
        .progress_chars("=> ")
    }

    #[cfg(test)]
    fn bar(&self) -> ProgressBar {
        self.state.lock().unwrap().bar.clone()
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
