//! Request tracking for view-owned data loads.
//!
//! A view holds one `RequestTracker` per section it renders. The tracker
//! decides whether a load may start, so a section that is already loading or
//! loaded is never fetched twice.

/// Load state of a single section
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

/// State machine: `Idle -> Loading -> Loaded | Failed`
#[derive(Debug, Clone)]
pub struct RequestTracker<T> {
    state: LoadState<T>,
}

impl<T> Default for RequestTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestTracker<T> {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    /// Move to `Loading`.
    ///
    /// Returns false (and leaves the state alone) if a load is in flight or
    /// has already completed.
    pub fn begin(&mut self) -> bool {
        match self.state {
            LoadState::Idle | LoadState::Failed(_) => {
                self.state = LoadState::Loading;
                true
            }
            LoadState::Loading | LoadState::Loaded(_) => false,
        }
    }

    /// Record a successful load. Ignored unless a load is in flight.
    pub fn complete(&mut self, value: T) {
        if matches!(self.state, LoadState::Loading) {
            self.state = LoadState::Loaded(value);
        }
    }

    /// Record a failed load. Ignored unless a load is in flight.
    pub fn fail(&mut self, message: impl Into<String>) {
        if matches!(self.state, LoadState::Loading) {
            self.state = LoadState::Failed(message.into());
        }
    }

    /// Forget any result so the next `begin` refetches
    pub fn reset(&mut self) {
        self.state = LoadState::Idle;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
