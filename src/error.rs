use crate::dsn::DsnError;
use thiserror::Error;
use waitfor::ContextError;

/// The error type returned by [`MySql::check`](crate::MySql::check).
///
/// Every variant carries the underlying failure unmodified.
#[derive(Error, Debug)]
pub enum Error {
    /// The connection string could not be turned into driver options.
    #[error(transparent)]
    DriverOpen(#[from] DsnError),
    /// The driver could not connect to or ping the server.
    #[error(transparent)]
    Connectivity(#[from] sqlx::Error),
    /// The context was cancelled or expired before the ping completed.
    #[error(transparent)]
    Context(#[from] ContextError),
}
