//! Scanner warnings with colored terminal output.
//!
//! Provides deduplication so a document with many broken regions reports
//! each distinct problem once. Used by the scanner when it has to degrade
//! input (unterminated tags, unterminated data elements) and cleared by the
//! CLI between documents.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already recorded (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// When set, warnings are recorded but not printed.
static QUIET: AtomicBool = AtomicBool::new(false);

fn key(component: &str, message: &str) -> String {
    format!("[{component}] {message}")
}

/// Warn about degraded input (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Scanner", "unterminated comment at end of input");
/// ```
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
pub fn warn_once(component: &str, message: &str) {
    let is_new = WARNED
        .lock()
        .unwrap()
        .get_or_insert_with(HashSet::new)
        .insert(key(component, message));

    if is_new && !QUIET.load(Ordering::Relaxed) {
        eprintln!("{YELLOW}[tagstream {component}] ⚠ {message}{RESET}");
    }
}

/// Whether `warn_once` has already been called with this message.
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    WARNED
        .lock()
        .unwrap()
        .as_ref()
        .is_some_and(|set| set.contains(&key(component, message)))
}

/// Suppress (or re-enable) printing. Warnings are still recorded.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

/// Clear all recorded warnings (call when scanning a new document)
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap();
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
