use crate::{Factory, ResourceConfig, Runner};
use std::collections::HashMap;
use std::time::Duration;

/// A builder for a [`Runner`].
#[derive(Default)]
pub struct Builder {
    factories: HashMap<&'static str, Factory>,
    test_timeout: Option<Duration>,
}

impl Builder {
    /// Constructs a new `Builder` with no registered schemes.
    pub fn new() -> Self {
        Default::default()
    }

    /// Routes every scheme of `config` to its factory.
    ///
    /// A scheme registered twice keeps the last factory.
    pub fn register(mut self, config: ResourceConfig) -> Self {
        for scheme in config.scheme {
            if self.factories.insert(scheme, config.factory).is_some() {
                tracing::debug!(scheme, "replacing resource factory");
            }
        }
        self
    }

    /// Sets how long a single resource test may take, on top of whatever
    /// deadline the caller's context carries.
    ///
    /// - `None` means only the caller's context applies.
    /// - Defaults to `None`.
    ///
    /// # Panics
    ///
    /// Panics if `test_timeout` is the zero `Duration`.
    pub fn test_timeout(mut self, test_timeout: Option<Duration>) -> Self {
        assert_ne!(
            test_timeout,
            Some(Duration::from_secs(0)),
            "test_timeout must be positive"
        );
        self.test_timeout = test_timeout;
        self
    }

    /// Consumes the builder, returning a new runner.
    pub fn build(self) -> Runner {
        Runner::new_inner(self.factories, self.test_timeout)
    }
}
