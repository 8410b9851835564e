//! Display surfaces for chat output.
//!
//! A surface receives styled entries in order and can drop the single pending
//! indicator.  It never hands entries back to the session.
//!
//! - [`PlainTextSurface`] writes to stdout with optional ANSI styling.
//! - [`MemorySurface`] records entries for headless use.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// ANSI escape code for dim text (used for the pending indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for replies).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for yellow text (used for notices).
const ANSI_YELLOW: &str = "\x1b[33m";

/// How an entry should be styled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Text the user submitted.
    User,
    /// A reply, or the greeting.
    Assistant,
    /// The transient "reply awaited" marker.
    Pending,
    /// A failed submission.
    Error,
    /// Session information that is neither a reply nor a failure.
    Notice,
}

/// One line of output on a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The style of the entry.
    pub kind: EntryKind,
    /// The entry text.
    pub text: String,
}

impl Entry {
    /// Create an entry.
    pub fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// A user entry.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(EntryKind::User, text)
    }

    /// An assistant entry.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Assistant, text)
    }

    /// A pending indicator entry.
    pub fn pending(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Pending, text)
    }

    /// An error entry.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Error, text)
    }

    /// A notice entry.
    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Notice, text)
    }
}

/// Trait for display surfaces.
///
/// Surfaces are append-only and should keep the newest entry in view after
/// every append.  At most one pending entry is shown at a time.
pub trait Surface: Send + Sync {
    /// Append an entry.
    fn append(&self, entry: Entry);

    /// Remove the pending indicator if one is shown.
    fn remove_pending(&self);
}

impl<S: Surface + ?Sized> Surface for Arc<S> {
    fn append(&self, entry: Entry) {
        self.as_ref().append(entry)
    }

    fn remove_pending(&self) {
        self.as_ref().remove_pending()
    }
}

///////////////////////////////////////////// Terminal /////////////////////////////////////////////

/// Plain text surface with optional ANSI styling.
///
/// When `echo_user` is false, user entries are not printed; the line editor
/// has already shown them.
pub struct PlainTextSurface {
    use_color: bool,
    echo_user: bool,
    pending: Mutex<Option<usize>>,
}

impl PlainTextSurface {
    /// Creates a new PlainTextSurface with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextSurface with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            use_color,
            echo_user: true,
            pending: Mutex::new(None),
        }
    }

    /// Sets whether user entries are printed.
    pub fn with_echo_user(mut self, echo_user: bool) -> Self {
        self.echo_user = echo_user;
        self
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for PlainTextSurface {
    fn append(&self, entry: Entry) {
        let mut stdout = io::stdout().lock();
        let _ = match entry.kind {
            EntryKind::User if !self.echo_user => Ok(()),
            EntryKind::User => writeln!(stdout, "You: {}", entry.text),
            EntryKind::Assistant => {
                writeln!(stdout, "{}", self.styled(ANSI_CYAN, &entry.text))
            }
            EntryKind::Pending => {
                // left on the current line so it can be erased in place
                *self.pending.lock() = Some(entry.text.chars().count());
                write!(stdout, "{}", self.styled(ANSI_DIM, &entry.text))
            }
            EntryKind::Error => {
                writeln!(stdout, "{}", self.styled(ANSI_RED, &entry.text))
            }
            EntryKind::Notice => {
                writeln!(stdout, "{}", self.styled(ANSI_YELLOW, &entry.text))
            }
        };
        let _ = stdout.flush();
    }

    fn remove_pending(&self) {
        let Some(width) = self.pending.lock().take() else {
            return;
        };
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\r{}\r", " ".repeat(width));
        let _ = stdout.flush();
    }
}

////////////////////////////////////////////// Memory //////////////////////////////////////////////

/// A surface that records entries in memory.
///
/// The scroll position follows the newest entry, as a visible chat window
/// would.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: Vec<Entry>,
    scrolled_to: Option<usize>,
}

impl MemorySurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every entry, oldest first.
    pub fn entries(&self) -> Vec<Entry> {
        self.state.lock().entries.clone()
    }

    /// Number of entries currently shown.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// True if nothing is shown.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// The newest entry, if any.
    pub fn last(&self) -> Option<Entry> {
        self.state.lock().entries.last().cloned()
    }

    /// Entries of the given kind, oldest first.
    pub fn entries_of(&self, kind: EntryKind) -> Vec<Entry> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect()
    }

    /// True if a pending indicator is shown.
    pub fn has_pending(&self) -> bool {
        self.state
            .lock()
            .entries
            .iter()
            .any(|entry| entry.kind == EntryKind::Pending)
    }

    /// Index of the entry currently scrolled into view.
    pub fn scrolled_to(&self) -> Option<usize> {
        self.state.lock().scrolled_to
    }
}

impl Surface for MemorySurface {
    fn append(&self, entry: Entry) {
        let mut state = self.state.lock();
        state.entries.push(entry);
        state.scrolled_to = Some(state.entries.len() - 1);
    }

    fn remove_pending(&self) {
        let mut state = self.state.lock();
        if let Some(index) = state
            .entries
            .iter()
            .position(|entry| entry.kind == EntryKind::Pending)
        {
            state.entries.remove(index);
            if state.entries.is_empty() {
                state.scrolled_to = None;
            } else {
                state.scrolled_to = Some(state.entries.len() - 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_default_has_color() {
        let surface = PlainTextSurface::new();
        assert!(surface.use_color);
        assert!(surface.echo_user);
    }

    #[test]
    fn surface_without_color() {
        let surface = PlainTextSurface::with_color(false).with_echo_user(false);
        assert!(!surface.use_color);
        assert!(!surface.echo_user);
        assert_eq!(surface.styled(ANSI_RED, "plain"), "plain");
    }

    #[test]
    fn plain_surface_tracks_pending_width() {
        let surface = PlainTextSurface::with_color(false);
        surface.append(Entry::pending("..."));
        assert_eq!(*surface.pending.lock(), Some(3));
        surface.remove_pending();
        assert_eq!(*surface.pending.lock(), None);
    }

    #[test]
    fn memory_surface_scrolls_to_newest() {
        let surface = MemorySurface::new();
        assert_eq!(surface.scrolled_to(), None);
        surface.append(Entry::assistant("hello"));
        surface.append(Entry::user("hi"));
        assert_eq!(surface.scrolled_to(), Some(1));
        assert_eq!(surface.last(), Some(Entry::user("hi")));
    }

    #[test]
    fn memory_surface_removes_only_pending() {
        let surface = MemorySurface::new();
        surface.append(Entry::user("q"));
        surface.append(Entry::pending("..."));
        assert!(surface.has_pending());
        surface.remove_pending();
        assert!(!surface.has_pending());
        assert_eq!(surface.entries(), vec![Entry::user("q")]);

        // nothing pending: no-op
        surface.remove_pending();
        assert_eq!(surface.len(), 1);
    }
}
