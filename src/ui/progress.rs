//! Progress indicators for long-running operations
//!
//! Uses `linya` for allocation-free progress bars. The parallel variant
//! wraps the drawing state in a mutex so rayon workers can report progress.

use std::sync::Mutex;

use linya::{Bar, Progress};

/// Single sequential progress bar
pub struct TaskProgress {
  progress: Progress,
  bar: Bar,
}

impl TaskProgress {
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}

/// Shared progress for parallel workers
pub struct ParallelProgress {
  progress: Mutex<Progress>,
}

impl ParallelProgress {
  pub fn new() -> Self {
    Self {
      progress: Mutex::new(Progress::new()),
    }
  }

  /// Add a new bar with a label and total
  pub fn add_bar(&self, total: usize, label: impl Into<String>) -> Bar {
    self.progress.lock().unwrap().bar(total, label.into())
  }

  /// Increment a bar by 1
  pub fn inc(&self, bar: &Bar) {
    self.progress.lock().unwrap().inc_and_draw(bar, 1);
  }
}

impl Default for ParallelProgress {
  fn default() -> Self {
    Self::new()
  }
}
