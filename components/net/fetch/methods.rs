/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use http::{HeaderMap, HeaderValue, StatusCode, header};
use log::debug;
use net_traits::request::{
    CorsSettings, CredentialsMode, Destination, OriginBehavior, RedirectMode, Request,
    RequestBuilder,
};
use net_traits::response::{Response, is_redirect_status};
use net_traits::{CancellationListener, ElementId, FetchObserver, NetworkError};
use url::{Origin, Url};

use crate::protocols::Requester;

/// Hop limit shared across one potentially-CORS-enabled fetch, counting both
/// same-origin re-entries and cross-origin continuations.
pub const MAX_REDIRECTS: u32 = 20;

/// Everything one fetch needs besides the request itself.
#[derive(Clone)]
pub struct FetchContext {
    /// Requesters in priority order; the first one supporting the target
    /// scheme wins.
    pub requesters: Arc<Vec<Box<dyn Requester>>>,
    pub observer: Option<Arc<dyn FetchObserver>>,
}

impl FetchContext {
    pub fn new(requesters: Vec<Box<dyn Requester>>) -> FetchContext {
        FetchContext {
            requesters: Arc::new(requesters),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> FetchContext {
        self.observer = Some(observer);
        self
    }
}

/// Selects a requester for `request` and dispatches through it, blocking the
/// calling thread until the response is ready.
///
/// `Ok(None)` is the defined "no requester for this scheme" sentinel; the
/// caller decides whether that is an error. A requester failure propagates as
/// an error, distinct from the sentinel.
pub fn load(
    request: &Request,
    cancel: &CancellationListener,
    context: &FetchContext,
) -> Result<Option<Response>, NetworkError> {
    if cancel.cancelled() {
        return Err(NetworkError::LoadCancelled);
    }
    let scheme = request.target.scheme();
    let Some(requester) = context
        .requesters
        .iter()
        .find(|requester| requester.supports_scheme(scheme))
    else {
        debug!("no requester supports scheme {}", scheme);
        return Ok(None);
    };

    if let Some(ref observer) = context.observer {
        observer.request_started(request);
    }
    let outcome = requester.request(request, cancel);
    if let Some(ref observer) = context.observer {
        observer.request_ended(request);
    }
    outcome.map(Some)
}

/// The potentially-CORS-enabled fetch.
///
/// Phase selection: requests whose origin matches the target, `data:`
/// targets, `about:blank`, and the whole `(None, Taint)` row of the gated
/// table take the trusted path with its manual redirect loop and no status
/// gate. Everything else is gated by `(setting, behavior)`:
///
/// * `(None, Fail)` fails before any request is issued;
/// * `Some(Anonymous)` issues one plain request with credentials omitted and
///   accepts only a 200;
/// * `Some(UseCredentials)` does the same with credentials included.
pub fn fetch_with_cors(
    request: Request,
    setting: Option<CorsSettings>,
    behavior: OriginBehavior,
    cancel: &CancellationListener,
    context: &FetchContext,
) -> Result<Response, NetworkError> {
    // The origin and policy flags of the original request outlive every hop:
    // phase selection always compares against the original origin, and
    // same-origin re-entry descriptors carry the original flags.
    let origin = request.origin.clone();
    let source = request.source;
    let destination = request.destination;
    let cookie_blocked = request.cookie_blocked;
    let same_origin_forced = request.same_origin_forced;

    let mut target = request.target;
    let mut hops = 0u32;

    // Outer loop: phase selection, re-entered from scratch whenever a
    // redirect lands back on the original origin.
    loop {
        if cancel.cancelled() {
            return Err(NetworkError::LoadCancelled);
        }

        let trusted = origin == target.origin() ||
            target.scheme() == "data" ||
            target.as_str() == "about:blank" ||
            (setting.is_none() && behavior == OriginBehavior::Taint);

        if !trusted {
            let Some(setting) = setting else {
                // (None, Fail): denied before any request is issued.
                return Err(NetworkError::Internal(format!(
                    "Cross-origin request to {} denied",
                    target
                )));
            };
            let credentials_mode = match setting {
                CorsSettings::Anonymous => CredentialsMode::Omit,
                CorsSettings::UseCredentials => CredentialsMode::Include,
            };
            let gated = descriptor(&target, &origin, source, destination)
                .credentials_mode(credentials_mode)
                .build();
            let response = load(&gated, cancel, context)?
                .ok_or_else(|| no_requester_error(&target))?;
            if response.status != StatusCode::OK {
                // Only an exact 200 passes the gate; the response is dropped.
                return Err(NetworkError::Internal(format!(
                    "Gated fetch of {} failed with status {}",
                    target,
                    response.status
                )));
            }
            return Ok(response);
        }

        // Trusted path: drive redirects by hand. The first dispatch of each
        // phase carries the original policy flags; cross-origin continuation
        // hops drop them.
        let mut inner = descriptor(&target, &origin, source, destination)
            .cookie_blocked(cookie_blocked)
            .same_origin_forced(same_origin_forced)
            .redirect_mode(RedirectMode::Manual)
            .build();
        loop {
            let response = load(&inner, cancel, context)?
                .ok_or_else(|| no_requester_error(&target))?;
            if !is_redirect_status(response.status) {
                // Whatever the status, trusted responses are returned as-is.
                return Ok(response);
            }

            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(NetworkError::TooManyRedirects);
            }
            target = redirect_target(&response, &target)?;

            if origin == target.origin() {
                // Back on the original origin: re-run phase selection.
                break;
            }
            // A cross-origin redirect continues here without re-applying the
            // gate. That asymmetry is inherited behavior, kept as-is.
            inner = descriptor(&target, &origin, source, destination)
                .redirect_mode(RedirectMode::Manual)
                .build();
        }
    }
}

fn descriptor(
    target: &Url,
    origin: &Origin,
    source: Option<ElementId>,
    destination: Destination,
) -> RequestBuilder {
    let mut headers = HeaderMap::new();
    set_default_accept(destination, &mut headers);
    let mut builder = RequestBuilder::new(target.clone())
        .origin(origin.clone())
        .destination(destination)
        .headers(headers);
    if let Some(source) = source {
        builder = builder.source(source);
    }
    builder
}

fn no_requester_error(target: &Url) -> NetworkError {
    NetworkError::Internal(format!("No requester for scheme {}", target.scheme()))
}

/// Resolves the next target of a redirect response against the previous one.
/// A missing `Location` header falls back to the previous target itself.
fn redirect_target(response: &Response, previous: &Url) -> Result<Url, NetworkError> {
    let Some(value) = response.headers.get(header::LOCATION) else {
        return Ok(previous.clone());
    };
    let location = value
        .to_str()
        .map_err(|_| NetworkError::Internal("Location header is not valid UTF-8".to_owned()))?;
    previous
        .join(location)
        .map_err(|error| NetworkError::Internal(format!("Invalid Location header: {}", error)))
}

/// Step 3 of <https://fetch.spec.whatwg.org/#concept-fetch>: a default
/// `Accept` value appropriate to the destination, when none is set yet.
pub fn set_default_accept(destination: Destination, headers: &mut HeaderMap) {
    if headers.contains_key(header::ACCEPT) {
        return;
    }
    let value = match destination {
        Destination::Image => "image/png,image/svg+xml,image/*;q=0.8,*/*;q=0.5",
        Destination::Style => "text/css,*/*;q=0.1",
        _ => "*/*",
    };
    headers.insert(header::ACCEPT, HeaderValue::from_static(value));
}
