//! Position sources used by "use my location" and at startup.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::{error::GeolocationError, model::Coordinates};

/// Upper bound on how long a position request may take.
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a previously obtained position is reused.
pub const POSITION_MAX_AGE: Duration = Duration::from_secs(5 * 60);

#[async_trait]
pub trait Geolocator: Send + Sync + std::fmt::Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// Always reports the same position (configured by the user).
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: Coordinates,
}

impl FixedGeolocator {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.position)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocator;

#[async_trait]
impl Geolocator for UnsupportedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Wraps another geolocator with a request timeout and a position cache.
#[derive(Debug)]
pub struct CachedGeolocator<G> {
    inner: G,
    timeout: Duration,
    max_age: Duration,
    last_fix: Mutex<Option<(Instant, Coordinates)>>,
}

impl<G: Geolocator> CachedGeolocator<G> {
    pub fn new(inner: G) -> Self {
        Self::with_limits(inner, GEOLOCATION_TIMEOUT, POSITION_MAX_AGE)
    }

    pub fn with_limits(inner: G, timeout: Duration, max_age: Duration) -> Self {
        Self { inner, timeout, max_age, last_fix: Mutex::new(None) }
    }
}

#[async_trait]
impl<G: Geolocator> Geolocator for CachedGeolocator<G> {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        let cached = *self.last_fix.lock();
        if let Some((_, position)) = cached.filter(|(at, _)| at.elapsed() <= self.max_age) {
            tracing::debug!("reusing cached position {position}");
            return Ok(position);
        }

        let position = tokio::time::timeout(self.timeout, self.inner.locate())
            .await
            .map_err(|_| GeolocationError::Timeout)??;

        *self.last_fix.lock() = Some((Instant::now(), position));
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingGeolocator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geolocator for CountingGeolocator {
        async fn locate(&self) -> Result<Coordinates, GeolocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinates::new(10.0, 20.0))
        }
    }

    #[derive(Debug)]
    struct StalledGeolocator;

    #[async_trait]
    impl Geolocator for StalledGeolocator {
        async fn locate(&self) -> Result<Coordinates, GeolocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinates::new(0.0, 0.0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn position_is_cached_for_max_age() {
        let geo = CachedGeolocator::new(CountingGeolocator::default());

        geo.locate().await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        geo.locate().await.unwrap();
        assert_eq!(geo.inner.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(POSITION_MAX_AGE).await;
        geo.locate().await.unwrap();
        assert_eq!(geo.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out() {
        let geo = CachedGeolocator::new(StalledGeolocator);
        assert_eq!(geo.locate().await, Err(GeolocationError::Timeout));
    }

    #[tokio::test]
    async fn unsupported_reports_unsupported() {
        let geo = CachedGeolocator::new(UnsupportedGeolocator);
        assert_eq!(geo.locate().await, Err(GeolocationError::Unsupported));
    }
}
