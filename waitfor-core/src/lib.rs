//! Resource interface for waitfor readiness checks.
//!
//! A *resource* is anything that can be probed for readiness: a database, a
//! queue, an HTTP endpoint. Each adapter crate implements [`Resource`] for
//! one kind of target and exposes a [`ResourceConfig`] pairing the URL
//! schemes it understands with a [`Factory`] that builds it. A [`Runner`]
//! collects those configs into a scheme dispatch table.
//!
//! ```no_run
//! use waitfor::{async_trait, BoxError, Context, Error, Resource, ResourceConfig, Runner};
//! use url::Url;
//!
//! struct Always;
//!
//! #[async_trait]
//! impl Resource for Always {
//!     async fn test(&self, _ctx: &Context) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! fn new(url: Option<Url>) -> Result<Box<dyn Resource>, Error> {
//!     url.ok_or(Error::invalid_argument("url"))?;
//!     Ok(Box::new(Always))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let runner = Runner::builder()
//!         .register(ResourceConfig::new(&["always"], new))
//!         .build();
//!     runner.test(&Context::background(), &["always://here"]).await
//! }
//! ```

#![warn(missing_docs)]

mod config;
mod context;
mod error;
mod runner;

pub use async_trait::async_trait;
pub use config::Builder;
pub use context::{Context, ContextError};
pub use error::{BoxError, Error};
pub use runner::Runner;
pub use url;

use url::Url;

/// Something that can be probed for readiness.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Makes a single attempt to reach the resource, bounded by `ctx`.
    ///
    /// Implementations must not retry; the caller owns any polling policy.
    async fn test(&self, ctx: &Context) -> Result<(), BoxError>;
}

/// Builds a [`Resource`] from a parsed URL.
///
/// `None` stands for a missing URL and must be rejected with
/// [`Error::InvalidArgument`].
pub type Factory = fn(Option<Url>) -> Result<Box<dyn Resource>, Error>;

/// Registration value pairing URL schemes with the factory that handles them.
#[derive(Clone, Debug)]
pub struct ResourceConfig {
    /// URL schemes routed to [`factory`](Self::factory).
    pub scheme: Vec<&'static str>,
    /// Constructor for resources of these schemes.
    pub factory: Factory,
}

impl ResourceConfig {
    /// Pairs `scheme` with `factory`.
    pub fn new(scheme: &[&'static str], factory: Factory) -> Self {
        Self {
            scheme: scheme.to_vec(),
            factory,
        }
    }
}
