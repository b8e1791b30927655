//! Matcher configuration

/// Default limit on nested scopes the matcher scans through
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How a statement sequence is scanned for the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Single pass with an alignment cursor. A broken alignment only re-anchors
    /// if the breaking statement itself matches the first template statement,
    /// so an occurrence overlapping a failed partial run can be missed.
    #[default]
    Greedy,
    /// Try a full template window at every candidate index.
    Exhaustive,
}

/// What happens to captures recorded along comparisons that end up failing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePolicy {
    /// Keep them; capture lists only ever grow during a call.
    #[default]
    Retain,
    /// Roll back to the start of the current alignment run whenever a
    /// comparison fails or a run is abandoned.
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub scan: ScanMode,
    pub captures: CapturePolicy,
    pub max_depth: usize,
}

impl MatchOptions {
    pub fn new() -> Self {
        Self {
            scan: ScanMode::default(),
            captures: CapturePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_scan(mut self, scan: ScanMode) -> Self {
        self.scan = scan;
        self
    }

    pub fn with_captures(mut self, captures: CapturePolicy) -> Self {
        self.captures = captures;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::new()
    }
}
