use std::io::{self, Write};

use notemark_core::{Checkpoint, Progress};

const PENDING_PREFIX: &str = "\u{2192}";
const DONE_PREFIX: &str = "\u{2713}";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Step display for terminal runs. Prints the whole step list up front with a
/// pending arrow on each line, then rewrites a line in place with a dimmed
/// check mark as the step completes. Everything goes to stderr so the
/// rendered HTML can flow to stdout.
pub struct StepTracker {
    steps: Vec<String>,
    completed: Vec<bool>,
    shown: bool,
    quiet: bool,
}

impl StepTracker {
    pub fn new(steps: Vec<String>) -> Self {
        let completed = vec![false; steps.len()];
        Self {
            steps,
            completed,
            shown: false,
            quiet: false,
        }
    }

    /// A tracker that swallows every step.
    pub fn silent() -> Self {
        let mut tracker = Self::new(Vec::new());
        tracker.quiet = true;
        tracker
    }

    /// Marks a step as completed. Messages outside the step list are printed
    /// as extra pending lines; completing a step twice does nothing.
    pub fn done(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        self.show_pending();
        let mut err = io::stderr();
        let Some(idx) = self.steps.iter().position(|step| step == message) else {
            let _ = writeln!(err, "{PENDING_PREFIX} {message}");
            return;
        };
        if self.completed[idx] {
            return;
        }
        // Move up to the step's line, rewrite it, and return to the bottom.
        let lines_up = self.steps.len() - idx;
        let _ = write!(err, "\x1b[{lines_up}A\r");
        let _ = writeln!(err, "{DIM}{DONE_PREFIX} {message}{RESET}\x1b[K");
        if lines_up > 1 {
            let _ = write!(err, "\x1b[{}B", lines_up - 1);
        }
        let _ = err.flush();
        self.completed[idx] = true;
    }

    fn show_pending(&mut self) {
        if self.shown || self.steps.is_empty() {
            return;
        }
        let mut err = io::stderr();
        for message in &self.steps {
            let _ = writeln!(err, "{PENDING_PREFIX} {message}");
        }
        let _ = err.flush();
        self.shown = true;
    }
}

impl Progress for StepTracker {
    fn checkpoint(&mut self, checkpoint: Checkpoint) {
        // A new parse run starts a fresh display, even on a reused tracker.
        if checkpoint == Checkpoint::ParseStart && self.shown {
            self.completed.fill(false);
            self.shown = false;
        }
        self.done(checkpoint.message());
    }
}
