//! Request state machine for locate/load operations.
//!
//! Every user-initiated request gets a fresh generation. A result is applied
//! only while its generation is the one in flight; anything older was
//! superseded and is dropped.

/// What the dashboard is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    /// Waiting for a position fix
    Locating(u64),
    /// Waiting for snapshot + forecast
    Loading(u64),
}

impl FetchState {
    pub fn is_busy(self) -> bool {
        !matches!(self, FetchState::Idle)
    }

    /// True if a position result for `generation` should be applied.
    pub fn accepts_location(self, generation: u64) -> bool {
        self == FetchState::Locating(generation)
    }

    /// True if a load result for `generation` should be applied.
    pub fn accepts_load(self, generation: u64) -> bool {
        self == FetchState::Loading(generation)
    }

    /// State after a position arrives and the load is issued under the same
    /// generation.
    pub fn on_located(self) -> Self {
        match self {
            FetchState::Locating(g) => FetchState::Loading(g),
            other => other,
        }
    }

    /// State after the in-flight request finishes (either way).
    pub fn on_done(self) -> Self {
        FetchState::Idle
    }
}

/// Issues generations and tracks the request in flight.
#[derive(Debug, Default)]
pub struct FetchTracker {
    state: FetchState,
    last_issued: u64,
}

impl FetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Start a locate request, superseding anything in flight.
    pub fn begin_locate(&mut self) -> u64 {
        let generation = self.next_generation();
        self.state = FetchState::Locating(generation);
        generation
    }

    /// Start a load request, superseding anything in flight.
    pub fn begin_load(&mut self) -> u64 {
        let generation = self.next_generation();
        self.state = FetchState::Loading(generation);
        generation
    }

    /// Move a located request on to loading. Returns `false` if the result
    /// is stale.
    pub fn located(&mut self, generation: u64) -> bool {
        if !self.state.accepts_location(generation) {
            return false;
        }
        self.state = self.state.on_located();
        true
    }

    /// Finish a locate that failed. Returns `false` if the result is stale.
    pub fn locate_failed(&mut self, generation: u64) -> bool {
        if !self.state.accepts_location(generation) {
            return false;
        }
        self.state = self.state.on_done();
        true
    }

    /// Finish a load. Returns `false` if the result is stale.
    pub fn loaded(&mut self, generation: u64) -> bool {
        if !self.state.accepts_load(generation) {
            return false;
        }
        self.state = self.state.on_done();
        true
    }

    fn next_generation(&mut self) -> u64 {
        self.last_issued += 1;
        self.last_issued
    }
}
