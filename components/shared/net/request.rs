/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use http::HeaderMap;
use url::{Origin, Url};

use crate::{DownloadId, ElementId};

/// A request [destination](https://fetch.spec.whatwg.org/#concept-request-destination),
/// limited to the resource kinds this engine fetches.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Destination {
    None,
    Image,
    Object,
    Script,
    Style,
}

/// [Redirect mode](https://fetch.spec.whatwg.org/#concept-request-redirect-mode).
///
/// `Manual` is set on descriptors issued from inside the trusted fetch loop,
/// which follows redirects itself; requesters must then hand redirect
/// responses back instead of chasing them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirectMode {
    Follow,
    Manual,
}

/// Request [credentials mode](https://fetch.spec.whatwg.org/#concept-request-credentials-mode).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CredentialsMode {
    Omit,
    CredentialsSameOrigin,
    Include,
}

/// [CORS settings attribute](https://html.spec.whatwg.org/multipage/#attr-crossorigin-anonymous)
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CorsSettings {
    Anonymous,
    UseCredentials,
}

impl CorsSettings {
    /// <https://html.spec.whatwg.org/multipage/#cors-settings-attribute>
    pub fn from_enumerated_attribute(value: &str) -> CorsSettings {
        match value.to_ascii_lowercase().as_str() {
            "use-credentials" => CorsSettings::UseCredentials,
            // The attribute's invalid value default and missing-but-present
            // value default are both Anonymous.
            _ => CorsSettings::Anonymous,
        }
    }
}

/// What to do with a cross-origin response when no CORS setting applies:
/// hand it over tainted, or refuse to issue the request at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OriginBehavior {
    Taint,
    Fail,
}

/// An immutable description of one resource request.
///
/// Redirect handling never mutates a request; every hop builds a new
/// descriptor through [`RequestBuilder`].
#[derive(Clone, Debug)]
pub struct Request {
    pub id: DownloadId,
    /// The URL to fetch.
    pub target: Url,
    /// The origin of the requesting document, captured once at build time.
    /// Opaque origins compare equal only against this captured value, so it
    /// must never be recomputed from a URL.
    pub origin: Origin,
    /// The element on whose behalf the request is made. Lookup only; the
    /// request does not keep the element alive.
    pub source: Option<ElementId>,
    pub destination: Destination,
    pub headers: HeaderMap,
    /// Suppress cookie handling in the underlying transport.
    pub cookie_blocked: bool,
    /// Force the transport to treat the request as same-origin.
    pub same_origin_forced: bool,
    pub redirect_mode: RedirectMode,
    pub credentials_mode: CredentialsMode,
}

pub struct RequestBuilder {
    pub id: DownloadId,
    pub target: Url,
    pub origin: Origin,
    pub source: Option<ElementId>,
    pub destination: Destination,
    pub headers: HeaderMap,
    pub cookie_blocked: bool,
    pub same_origin_forced: bool,
    pub redirect_mode: RedirectMode,
    pub credentials_mode: CredentialsMode,
}

impl RequestBuilder {
    pub fn new(target: Url) -> RequestBuilder {
        let origin = target.origin();
        RequestBuilder {
            id: DownloadId::default(),
            target,
            origin,
            source: None,
            destination: Destination::None,
            headers: HeaderMap::new(),
            cookie_blocked: false,
            same_origin_forced: false,
            redirect_mode: RedirectMode::Follow,
            credentials_mode: CredentialsMode::CredentialsSameOrigin,
        }
    }

    /// <https://fetch.spec.whatwg.org/#concept-request-origin>
    pub fn origin(mut self, origin: Origin) -> RequestBuilder {
        self.origin = origin;
        self
    }

    pub fn source(mut self, source: ElementId) -> RequestBuilder {
        self.source = Some(source);
        self
    }

    /// <https://fetch.spec.whatwg.org/#concept-request-destination>
    pub fn destination(mut self, destination: Destination) -> RequestBuilder {
        self.destination = destination;
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> RequestBuilder {
        self.headers = headers;
        self
    }

    pub fn cookie_blocked(mut self, cookie_blocked: bool) -> RequestBuilder {
        self.cookie_blocked = cookie_blocked;
        self
    }

    pub fn same_origin_forced(mut self, same_origin_forced: bool) -> RequestBuilder {
        self.same_origin_forced = same_origin_forced;
        self
    }

    /// <https://fetch.spec.whatwg.org/#concept-request-redirect-mode>
    pub fn redirect_mode(mut self, redirect_mode: RedirectMode) -> RequestBuilder {
        self.redirect_mode = redirect_mode;
        self
    }

    /// <https://fetch.spec.whatwg.org/#concept-request-credentials-mode>
    pub fn credentials_mode(mut self, credentials_mode: CredentialsMode) -> RequestBuilder {
        self.credentials_mode = credentials_mode;
        self
    }

    pub fn build(self) -> Request {
        Request {
            id: self.id,
            target: self.target,
            origin: self.origin,
            source: self.source,
            destination: self.destination,
            headers: self.headers,
            cookie_blocked: self.cookie_blocked,
            same_origin_forced: self.same_origin_forced,
            redirect_mode: self.redirect_mode,
            credentials_mode: self.credentials_mode,
        }
    }
}
