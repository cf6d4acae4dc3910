//! Options controlling one `get_with_fallback` call.

use std::time::Duration;

/// Per-call knobs for a fallback-chain lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackOptions {
    /// Restricts the walk to these tier names, in order. `None` walks every
    /// tier the handler was built with, in construction order.
    pub tiers: Option<Vec<String>>,
    /// Whether the emergency stale pass may run once every tier's fresh
    /// lookup has failed or returned nothing usable.
    pub allow_stale: bool,
    /// Whether a record still missing required fields after its completion
    /// fetch (served with synthesized defaults, marked partial) is
    /// acceptable to return, versus being treated like a miss. A record
    /// with every required field present is always returned regardless of
    /// this flag — it's only ever consulted for a record that needed, and
    /// didn't fully recover from, repair.
    pub partial_acceptable: bool,
    /// Overrides the resource kind's own required-field list for this call.
    pub required_fields: Option<Vec<String>>,
    /// Upper bound on how old a value the emergency stale pass may serve.
    pub max_stale_age: Duration,
    /// Deadline for a single tier's guarded call (circuit + retries
    /// included).
    pub timeout: Duration,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        Self {
            tiers: None,
            allow_stale: true,
            partial_acceptable: true,
            required_fields: None,
            max_stale_age: Duration::from_secs(24 * 3600),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FallbackOptions {
    pub fn builder() -> FallbackOptionsBuilder {
        FallbackOptionsBuilder::new()
    }
}

/// Builder for [`FallbackOptions`].
#[derive(Debug, Clone)]
pub struct FallbackOptionsBuilder {
    options: FallbackOptions,
}

impl FallbackOptionsBuilder {
    pub fn new() -> Self {
        Self { options: FallbackOptions::default() }
    }

    pub fn tiers(mut self, tiers: Vec<String>) -> Self {
        self.options.tiers = Some(tiers);
        self
    }

    pub fn allow_stale(mut self, allow: bool) -> Self {
        self.options.allow_stale = allow;
        self
    }

    pub fn partial_acceptable(mut self, acceptable: bool) -> Self {
        self.options.partial_acceptable = acceptable;
        self
    }

    pub fn required_fields(mut self, fields: Vec<String>) -> Self {
        self.options.required_fields = Some(fields);
        self
    }

    pub fn max_stale_age(mut self, max_age: Duration) -> Self {
        self.options.max_stale_age = max_age;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn build(self) -> FallbackOptions {
        self.options
    }
}

impl Default for FallbackOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
