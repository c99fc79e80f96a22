//! Test doubles for the collaborator traits, used by unit and behaviour
//! tests across the workspace.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geo::Coord;

use crate::{
    GeocodeError, Geocoder, HazardSnapshot, HazardStore, HazardStoreError, RouteCandidate,
    RouteProviderError, Router,
};

/// `Geocoder` answering from a fixed table of exact, case-insensitive names.
#[derive(Debug, Default)]
pub struct StubGeocoder {
    places: HashMap<String, Coord>,
    reverse_label: Option<String>,
    failure: Option<GeocodeError>,
    delay: Option<Duration>,
    resolve_calls: AtomicUsize,
    reverse_calls: AtomicUsize,
}

impl StubGeocoder {
    /// A geocoder that knows no places.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a place.
    #[must_use]
    pub fn with_place(mut self, name: &str, location: Coord) -> Self {
        self.places.insert(name.to_lowercase(), location);
        self
    }

    /// Label returned by `reverse_resolve`.
    #[must_use]
    pub fn with_reverse_label(mut self, label: impl Into<String>) -> Self {
        self.reverse_label = Some(label.into());
        self
    }

    /// Fail every call with `error`.
    #[must_use]
    pub fn with_failure(mut self, error: GeocodeError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Sleep for `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of forward lookups made so far.
    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// Number of reverse lookups made so far.
    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn resolve(&self, query: &str) -> Result<Coord, GeocodeError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.places
            .get(&query.trim().to_lowercase())
            .copied()
            .ok_or_else(|| GeocodeError::NotFound {
                query: query.to_owned(),
            })
    }

    async fn reverse_resolve(&self, location: Coord) -> Result<String, GeocodeError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.reverse_label
            .clone()
            .ok_or_else(|| GeocodeError::NotFound {
                query: format!("{}, {}", location.y, location.x),
            })
    }
}

#[derive(Debug, Clone)]
enum StubResponse {
    Candidates(Vec<RouteCandidate>),
    Error(RouteProviderError),
}

/// `Router` returning a pre-configured answer.
#[derive(Debug)]
pub struct StubRouter {
    response: StubResponse,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(Coord, Coord)>>,
}

impl StubRouter {
    fn from_response(response: StubResponse) -> Self {
        Self {
            response,
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A router answering with `candidates`, even when empty.
    #[must_use]
    pub fn with_candidates(candidates: Vec<RouteCandidate>) -> Self {
        Self::from_response(StubResponse::Candidates(candidates))
    }

    /// A router failing with `error`.
    #[must_use]
    pub fn with_error(error: RouteProviderError) -> Self {
        Self::from_response(StubResponse::Error(error))
    }

    /// Sleep for `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Endpoints of the most recent call.
    pub fn last_request(&self) -> Option<(Coord, Coord)> {
        self.last_request.lock().ok().and_then(|guard| *guard)
    }
}

#[async_trait]
impl Router for StubRouter {
    async fn route(
        &self,
        origin: Coord,
        destination: Coord,
    ) -> Result<Vec<RouteCandidate>, RouteProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some((origin, destination));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.response {
            StubResponse::Candidates(candidates) => Ok(candidates.clone()),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}

/// `HazardStore` returning a clone of a fixed snapshot.
#[derive(Debug, Clone)]
pub struct MemoryHazardStore {
    snapshot: HazardSnapshot,
}

impl MemoryHazardStore {
    /// Wrap `snapshot`.
    #[must_use]
    pub fn new(snapshot: HazardSnapshot) -> Self {
        Self { snapshot }
    }
}

impl HazardStore for MemoryHazardStore {
    fn snapshot(&self, _now: DateTime<Utc>) -> Result<HazardSnapshot, HazardStoreError> {
        Ok(self.snapshot.clone())
    }
}
