//! Where the user is. The request is bounded by a timeout; every failure
//! surfaces as a `LocationFailure` the caller has to report.

use async_trait::async_trait;
use common::{GeoLocation, LocationFailure};
use std::time::Duration;
use tracing::{info, warn};

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_location(&self) -> Result<GeoLocation, LocationFailure>;
}

/// Location taken from config, env or CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredLocation(pub Option<GeoLocation>);

#[async_trait]
impl LocationProvider for ConfiguredLocation {
    async fn request_location(&self) -> Result<GeoLocation, LocationFailure> {
        match self.0 {
            None => Err(LocationFailure::Unsupported),
            Some(loc) if !loc.is_valid() => Err(LocationFailure::Unavailable),
            Some(loc) => Ok(loc),
        }
    }
}

/// Ask `provider` for a fix, giving up after `timeout`.
pub async fn locate<P>(provider: &P, timeout: Duration) -> Result<GeoLocation, LocationFailure>
where
    P: LocationProvider + ?Sized,
{
    match tokio::time::timeout(timeout, provider.request_location()).await {
        Ok(Ok(loc)) => {
            info!("Location acquired: {}", loc);
            Ok(loc)
        }
        Ok(Err(failure)) => {
            warn!("Location request failed: {}", failure);
            Err(failure)
        }
        Err(_) => {
            warn!("Location request timed out after {:?}", timeout);
            Err(LocationFailure::Timeout)
        }
    }
}
