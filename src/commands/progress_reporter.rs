use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use repo_trending::fetch::Progress;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::task::JoinHandle;

type CountsCallback = Box<dyn Fn() -> (u64, u64, String) + Send + Sync>;
type MessageCallback = Box<dyn Fn() -> String + Send + Sync>;

/// Redraw period of the bar.
const TICK: Duration = Duration::from_millis(100);

const BAR_TEMPLATE: &str = "{prefix:>10.bold.cyan} [{bar:25}] {pos}/{len} {msg}";
const BAR_TEMPLATE_PLAIN: &str = "{prefix:>10} [{bar:25}] {pos}/{len} {msg}";
const SPINNER_TEMPLATE: &str = "{prefix:>10.bold.cyan} {spinner} {msg}";
const SPINNER_TEMPLATE_PLAIN: &str = "{prefix:>10} {spinner} {msg}";
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the bar currently shows.
enum View {
    Idle,
    Counts(CountsCallback),
    Spinner { since: Instant, message: MessageCallback },
}

struct Shared {
    show_after: Instant,
    shown: AtomicBool,
    view: Mutex<View>,
}

impl Shared {
    /// Reveal the bar once the delay has passed. Returns whether it is visible.
    fn reveal(&self, bar: &ProgressBar) -> bool {
        if self.shown.load(Ordering::Relaxed) {
            return true;
        }
        if Instant::now() < self.show_after {
            return false;
        }

        self.shown.store(true, Ordering::Relaxed);
        bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        true
    }

    fn redraw(&self, bar: &ProgressBar) {
        match &*lock(&self.view) {
            View::Idle => {}
            View::Counts(callback) => {
                let (total, done, message) = callback();
                if total > 0 {
                    bar.set_length(total);
                    bar.set_position(done);
                }
                bar.set_message(message);
            }
            View::Spinner { since, message } => {
                bar.set_message(format!("{}s: {}", since.elapsed().as_secs(), message()));
            }
        }
    }
}

/// A progress bar on stderr that only appears once a crawl has run longer than a delay.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    shared: Arc<Shared>,
    ticker: Arc<JoinHandle<()>>,
    use_colors: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(delay: Duration, use_colors: bool) -> Self {
        let bar = ProgressBar::hidden();
        let shared = Arc::new(Shared {
            show_after: Instant::now() + delay,
            shown: AtomicBool::new(false),
            view: Mutex::new(View::Idle),
        });

        let ticker = tokio::spawn(tick(bar.clone(), Arc::clone(&shared)));

        Self {
            bar,
            shared,
            ticker: Arc::new(ticker),
            use_colors,
        }
    }

    fn bar_style(&self) -> ProgressStyle {
        let template = if self.use_colors { BAR_TEMPLATE } else { BAR_TEMPLATE_PLAIN };
        ProgressStyle::default_bar()
            .template(template)
            .expect("could not create progress bar style")
            .progress_chars("=> ")
    }

    fn spinner_style(&self) -> ProgressStyle {
        let template = if self.use_colors { SPINNER_TEMPLATE } else { SPINNER_TEMPLATE_PLAIN };
        ProgressStyle::default_spinner()
            .template(template)
            .expect("could not create spinner style")
            .tick_strings(SPINNER_FRAMES)
    }
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        self.bar.set_prefix(phase.to_string());
    }

    fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {
        *lock(&self.shared.view) = View::Counts(callback);
        self.bar.disable_steady_tick();
        self.bar.set_length(0);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style());
    }

    fn set_indeterminate(&self, callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {
        *lock(&self.shared.view) = View::Spinner {
            since: Instant::now(),
            message: callback,
        };
        self.bar.enable_steady_tick(TICK);
        self.bar.set_style(self.spinner_style());
    }

    fn done(&self) {
        self.ticker.abort();
        *lock(&self.shared.view) = View::Idle;
        if self.shared.shown.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}

impl Debug for ProgressReporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("bar", &self.bar)
            .field("shown", &self.shared.shown)
            .field("use_colors", &self.use_colors)
            .finish_non_exhaustive()
    }
}

async fn tick(bar: ProgressBar, shared: Arc<Shared>) {
    let mut interval = tokio::time::interval(TICK);
    #[expect(clippy::infinite_loop, reason = "task runs until aborted")]
    loop {
        let _ = interval.tick().await;
        if shared.reveal(&bar) {
            shared.redraw(&bar);
        }
    }
}
