//! Route advisory orchestration.
//!
//! [`RouteAdvisor::advise`] resolves both endpoints, asks the [`Router`] for
//! candidates under a timeout, selects and estimates the best route against a
//! caller-supplied [`HazardSnapshot`], and assembles the [`Advisory`].

mod config;
mod error;
mod response;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo::Coord;

use crate::{
    EvaluateError, Gazetteer, GazetteerResolver, Geocoder, GeocoderResolver, HazardSnapshot,
    LiteralResolver, Resolver, ResolverChain, RiskClassifier, RouteCandidate, RouteEvaluator,
    RouteProviderError, Router, TransportEstimator, assemble_warnings,
};

pub use config::{
    AdvisorConfig, DEFAULT_GEOCODE_TIMEOUT, DEFAULT_ORIGIN, DEFAULT_ORIGIN_LABEL,
    DEFAULT_ROUTE_TIMEOUT,
};
pub use error::{AdviseError, EndpointRole};
pub use response::{AdviseRequest, Advisory, Endpoint, FallbackReason, RouteSource};

/// Builds route advisories from a geocoder, a router and hazard snapshots.
///
/// The advisor holds no mutable state; concurrent calls to
/// [`advise`](Self::advise) are independent.
pub struct RouteAdvisor<G, R> {
    geocoder: Arc<G>,
    router: R,
    config: AdvisorConfig,
    gazetteer: Option<Arc<Gazetteer>>,
    resolvers: ResolverChain,
    evaluator: RouteEvaluator,
    estimator: TransportEstimator,
}

impl<G, R> RouteAdvisor<G, R>
where
    G: Geocoder + 'static,
    R: Router,
{
    /// Create an advisor resolving endpoints as literal coordinates first and
    /// through `geocoder` second.
    #[must_use]
    pub fn new(geocoder: Arc<G>, router: R, config: AdvisorConfig) -> Self {
        let evaluator = RouteEvaluator::new(RiskClassifier::new(config.classifier))
            .with_stride(config.sampling_stride);
        let estimator = TransportEstimator::new(config.multipliers)
            .with_motorcycle_factor(config.motorcycle_factor);
        let resolvers = build_chain(&geocoder, &config, None);
        Self {
            geocoder,
            router,
            config,
            gazetteer: None,
            resolvers,
            evaluator,
            estimator,
        }
    }

    /// Consult `gazetteer` between literal parsing and the geocoder.
    #[must_use]
    pub fn with_gazetteer(mut self, gazetteer: Arc<Gazetteer>) -> Self {
        self.resolvers = build_chain(&self.geocoder, &self.config, Some(&gazetteer));
        self.gazetteer = Some(gazetteer);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Local gazetteer, if one was supplied.
    #[must_use]
    pub fn gazetteer(&self) -> Option<&Gazetteer> {
        self.gazetteer.as_deref()
    }

    /// Produce an advisory for `request` against `snapshot` at `now`.
    ///
    /// # Errors
    ///
    /// - [`AdviseError::InvalidInput`] for a blank destination, literal
    ///   coordinates out of range, or identical endpoints.
    /// - [`AdviseError::DestinationNotFound`] when no resolver matches the
    ///   destination.
    /// - [`AdviseError::OutOfServiceArea`] when an endpoint lies outside the
    ///   configured area.
    /// - [`AdviseError::NoRouteFound`] when the router answers with no route.
    /// - [`AdviseError::Estimate`] when the selected route has no positive
    ///   distance or duration. Zero-length provider routes are discarded
    ///   first, so this only arises from degenerate fallback geometry.
    pub async fn advise(
        &self,
        request: &AdviseRequest,
        snapshot: &HazardSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Advisory, AdviseError> {
        let destination_text = request.destination.trim();
        if destination_text.is_empty() {
            return Err(AdviseError::invalid_input("destination must not be blank"));
        }
        let origin_text = request
            .origin
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());
        for text in origin_text.into_iter().chain(std::iter::once(destination_text)) {
            LiteralResolver::parse(text).map_err(|err| AdviseError::invalid_input(err.to_string()))?;
        }

        let origin = self.resolve_origin(origin_text).await;
        let destination_coord = self
            .resolvers
            .resolve(destination_text)
            .await
            .map_err(|err| {
                log::info!("destination {destination_text:?} not resolved: {err}");
                AdviseError::DestinationNotFound {
                    query: destination_text.to_owned(),
                }
            })?;
        let destination = Endpoint::new(destination_coord, destination_text);

        self.ensure_in_area(EndpointRole::Origin, origin.coord())?;
        self.ensure_in_area(EndpointRole::Destination, destination_coord)?;
        if origin.coord() == destination_coord {
            return Err(AdviseError::invalid_input(
                "origin and destination are the same place",
            ));
        }

        let (candidates, route_source) = self.candidates(origin.coord(), destination_coord).await?;
        let selection = self
            .evaluator
            .select_best(candidates, request.avoid_risk, snapshot, now)
            .map_err(|EvaluateError::NoCandidates| AdviseError::NoRouteFound)?;
        let route = selection.candidate;
        let transport_options =
            self.estimator
                .estimate(route.distance_km(), route.duration_min(), selection.risk)?;
        let warnings = assemble_warnings(selection.risk, &route.envelope(), snapshot, now);

        Ok(Advisory {
            origin,
            destination,
            risk_level: selection.risk,
            risk_score: selection.score,
            distance_km: route.distance_km(),
            duration_min: route.duration_min(),
            transport_options,
            route_geometry: route.coordinates(),
            route_source,
            warnings,
            avoid_risk: request.avoid_risk,
            snapshot_version: snapshot.version(),
        })
    }

    async fn resolve_origin(&self, text: Option<&str>) -> Endpoint {
        if let Some(text) = text {
            match self.resolvers.resolve(text).await {
                Ok(coord) => return Endpoint::new(coord, text),
                Err(err) => log::info!("origin {text:?} not resolved, using default: {err}"),
            }
        }
        let coord = self.config.default_origin;
        Endpoint::new(coord, self.default_origin_label(coord).await)
    }

    async fn default_origin_label(&self, coord: Coord) -> String {
        match tokio::time::timeout(
            self.config.geocode_timeout,
            self.geocoder.reverse_resolve(coord),
        )
        .await
        {
            Ok(Ok(label)) if !label.trim().is_empty() => label,
            Ok(Ok(_)) => self.config.default_origin_label.clone(),
            Ok(Err(err)) => {
                log::debug!("reverse geocoding the default origin failed: {err}");
                self.config.default_origin_label.clone()
            }
            Err(_) => {
                log::debug!("reverse geocoding the default origin timed out");
                self.config.default_origin_label.clone()
            }
        }
    }

    fn ensure_in_area(&self, endpoint: EndpointRole, coord: Coord) -> Result<(), AdviseError> {
        if self.config.service_area.contains(coord) {
            Ok(())
        } else {
            Err(AdviseError::OutOfServiceArea {
                endpoint,
                lat: coord.y,
                lon: coord.x,
            })
        }
    }

    async fn candidates(
        &self,
        origin: Coord,
        destination: Coord,
    ) -> Result<(Vec<RouteCandidate>, RouteSource), AdviseError> {
        let timeout = self.config.route_timeout;
        let reason = match tokio::time::timeout(timeout, self.router.route(origin, destination)).await
        {
            Ok(Ok(candidates)) if candidates.is_empty() => return Err(AdviseError::NoRouteFound),
            Ok(Ok(candidates)) => {
                let total = candidates.len();
                let usable: Vec<_> = candidates.into_iter().filter(has_extent).collect();
                if !usable.is_empty() {
                    return Ok((usable, RouteSource::Provider));
                }
                log::warn!(
                    "routing provider returned {total} zero-length route(s), using straight line"
                );
                FallbackReason::ProviderError
            }
            Ok(Err(RouteProviderError::NoRoute)) => return Err(AdviseError::NoRouteFound),
            Ok(Err(err @ RouteProviderError::Timeout { .. })) => {
                log::warn!("routing provider timed out, using straight line: {err}");
                FallbackReason::Timeout
            }
            Ok(Err(err)) => {
                log::warn!("routing provider failed, using straight line: {err}");
                FallbackReason::ProviderError
            }
            Err(_) => {
                log::warn!(
                    "routing provider gave no answer within {}s, using straight line",
                    timeout.as_secs()
                );
                FallbackReason::Timeout
            }
        };
        let fallback = RouteCandidate::straight_line(origin, destination)
            .map_err(|err| AdviseError::invalid_input(err.to_string()))?;
        Ok((vec![fallback], RouteSource::Fallback { reason }))
    }
}

/// Provider routes must cover some distance and take some time to be
/// estimated; OSRM reports zero for endpoints snapped to the same node.
fn has_extent(candidate: &RouteCandidate) -> bool {
    candidate.distance_km() > 0.0 && candidate.duration_min() > 0.0
}

fn build_chain<G: Geocoder + 'static>(
    geocoder: &Arc<G>,
    config: &AdvisorConfig,
    gazetteer: Option<&Arc<Gazetteer>>,
) -> ResolverChain {
    let mut chain = ResolverChain::new().with(LiteralResolver);
    if let Some(gazetteer) = gazetteer {
        chain = chain.with(GazetteerResolver::new(Arc::clone(gazetteer)));
    }
    chain.with(GeocoderResolver::new(
        Arc::clone(geocoder),
        config.geocode_timeout,
        config.service_area,
    ))
}
