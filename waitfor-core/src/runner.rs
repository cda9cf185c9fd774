use crate::{Builder, Context, Error, Factory, Resource};
use futures_util::future::try_join_all;
use std::collections::HashMap;
use std::time::Duration;
use tracing::Instrument;
use url::Url;

/// Dispatches resource URLs to the factories registered for their scheme
/// and tests them.
///
/// A runner makes exactly one attempt per resource and call; polling until
/// everything is ready is left to the caller.
pub struct Runner {
    factories: HashMap<&'static str, Factory>,
    test_timeout: Option<Duration>,
}

impl Runner {
    /// Returns a [`Builder`] to register resource configs with.
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn new_inner(
        factories: HashMap<&'static str, Factory>,
        test_timeout: Option<Duration>,
    ) -> Self {
        Self {
            factories,
            test_timeout,
        }
    }

    /// Whether some registered factory handles `scheme`.
    pub fn supports(&self, scheme: &str) -> bool {
        self.factories.contains_key(scheme)
    }

    /// Parses `location` and builds the resource registered for its scheme.
    pub fn resolve(&self, location: &str) -> Result<Box<dyn Resource>, Error> {
        let url = Url::parse(location)?;
        let factory = self
            .factories
            .get(url.scheme())
            .ok_or_else(|| Error::UnsupportedScheme(url.scheme().to_owned()))?;
        factory(Some(url))
    }

    /// Tests every resource in `locations` once, concurrently.
    ///
    /// All locations are resolved before any of them is contacted, so an
    /// unknown scheme or a malformed URL fails without network traffic. The
    /// first failing test aborts the rest and is returned.
    pub async fn test<S>(&self, ctx: &Context, locations: &[S]) -> Result<(), Error>
    where
        S: AsRef<str>,
    {
        let resources = locations
            .iter()
            .map(|location| {
                let location = location.as_ref();
                self.resolve(location)
                    .map(|resource| (redact(location), resource))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let checks = resources.into_iter().map(|(url, resource)| {
            let ctx = ctx.child(self.test_timeout);
            let span = tracing::debug_span!("resource", %url);
            async move {
                tracing::trace!("testing resource");
                match resource.test(&ctx).await {
                    Ok(()) => {
                        tracing::debug!("resource is ready");
                        Ok(())
                    }
                    Err(source) => {
                        tracing::debug!(error = %source, "resource is not ready");
                        Err(Error::Resource { url, source })
                    }
                }
            }
            .instrument(span)
        });

        try_join_all(checks).await.map(|_| ())
    }
}

/// Masks the password of `location`, if it has one.
fn redact(location: &str) -> String {
    match Url::parse(location) {
        Ok(mut url) if url.password().is_some() => {
            // cannot fail: a url with a password has a host
            let _ = url.set_password(Some("xxxxx"));
            url.into()
        }
        Ok(url) => url.into(),
        Err(_) => location.to_owned(),
    }
}
