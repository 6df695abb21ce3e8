//! Navigation seam: the router is external, this crate only decides where to go.

mod guard;

pub use guard::{guard_route, RouteDecision};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

/// The application's router.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn push(&self, path: &str);
}

/// Navigate to `target` unless already there. Returns whether a push happened.
pub fn redirect_unless_at(navigator: &dyn Navigator, target: &str) -> bool {
    if navigator.current_path() == target {
        debug!(target, "Already at redirect target");
        return false;
    }
    info!(target, "Redirecting");
    navigator.push(target);
    true
}

/// Navigator that only tracks the current path and the pushes made.
#[derive(Debug)]
pub struct MemoryNavigator {
    current: RwLock<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(initial.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Paths pushed so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.current.read().clone()
    }

    fn push(&self, path: &str) {
        *self.current.write() = path.to_string();
        self.history.lock().push(path.to_string());
    }
}
