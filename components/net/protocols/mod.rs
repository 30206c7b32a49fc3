/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Scheme-specific requesters. A fetch walks the requester list in priority
//! order and dispatches through the first one that supports the target's
//! scheme.

use net_traits::request::Request;
use net_traits::response::Response;
use net_traits::{CancellationListener, NetworkError};

mod about;
mod data;
mod file;

pub use about::AboutRequester;
pub use data::DataRequester;
pub use file::FileRequester;

/// A transport for one or more URL schemes.
pub trait Requester: Send + Sync {
    /// Whether this requester can dispatch requests for `scheme`.
    fn supports_scheme(&self, scheme: &str) -> bool;

    /// Performs the request, blocking the calling fetch worker until the
    /// response is ready. `cancel` is polled cooperatively; once it reports
    /// cancellation the requester should bail out with
    /// [`NetworkError::LoadCancelled`].
    fn request(
        &self,
        request: &Request,
        cancel: &CancellationListener,
    ) -> Result<Response, NetworkError>;
}

/// The built-in requesters, most specific first. Embedders prepend their own
/// transports (HTTP and friends) ahead of these.
pub fn default_requesters() -> Vec<Box<dyn Requester>> {
    vec![
        Box::new(AboutRequester),
        Box::new(DataRequester),
        Box::new(FileRequester),
    ]
}
