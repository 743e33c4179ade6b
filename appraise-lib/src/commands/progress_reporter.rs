use crate::pipeline::Progress;
use core::fmt::{Debug, Formatter};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

const TICK: Duration = Duration::from_millis(100);

/// What the progress line is currently following.
enum Status {
    Idle,
    Label(Box<dyn Fn() -> String + Send + Sync>),
    Counter(Box<dyn Fn() -> (u64, u64, String) + Send + Sync>),
}

/// A progress line on standard error that appears only once a run has lasted `delay`.
///
/// Quick runs over cached artifacts print nothing. Must be created inside a tokio runtime.
pub struct ProgressReporter {
    bar: ProgressBar,
    status: Arc<Mutex<Status>>,
    follower: JoinHandle<()>,
    counter_style: ProgressStyle,
    label_style: ProgressStyle,
}

impl ProgressReporter {
    #[must_use]
    pub fn new(delay: Duration, use_colors: bool) -> Self {
        let bar = ProgressBar::hidden();
        let status = Arc::new(Mutex::new(Status::Idle));

        let prefix = if use_colors { "{prefix:>12.bold.cyan}" } else { "{prefix:>12}" };
        let counter_style = ProgressStyle::with_template(&format!("{prefix} [{{bar:25}}] {{pos}}/{{len}} {{msg}}"))
            .expect("invalid progress template")
            .progress_chars("=> ");
        let label_style = ProgressStyle::with_template(&format!("{prefix} {{spinner}} {{msg}}")).expect("invalid progress template");

        Self {
            follower: tokio::spawn(follow(bar.clone(), Arc::clone(&status), delay)),
            bar,
            status,
            counter_style,
            label_style,
        }
    }
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        self.bar.set_prefix(phase.to_string());
    }

    fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {
        *self.status.lock().expect("lock poisoned") = Status::Counter(callback);
        self.bar.disable_steady_tick();
        self.bar.set_style(self.counter_style.clone());
    }

    fn set_indeterminate(&self, callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {
        *self.status.lock().expect("lock poisoned") = Status::Label(callback);
        self.bar.set_style(self.label_style.clone());
        self.bar.enable_steady_tick(TICK);
    }

    fn done(&self) {
        self.follower.abort();
        self.bar.finish_and_clear();
    }
}

impl Debug for ProgressReporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgressReporter").field("bar", &self.bar).finish_non_exhaustive()
    }
}

/// Reveal the bar after `delay`, then mirror the followed callback into it until aborted.
async fn follow(bar: ProgressBar, status: Arc<Mutex<Status>>, delay: Duration) {
    tokio::time::sleep(delay).await;
    bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));

    let mut interval = tokio::time::interval(TICK);
    #[expect(clippy::infinite_loop, reason = "aborted by done()")]
    loop {
        let _ = interval.tick().await;

        match &*status.lock().expect("lock poisoned") {
            Status::Idle => {}
            Status::Label(label) => bar.set_message(label()),
            Status::Counter(counter) => {
                let (total, completed, label) = counter();
                bar.set_length(total);
                bar.set_position(completed);
                bar.set_message(label);
            }
        }
    }
}
