/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use headers::{ContentType, HeaderMapExt};
use net_traits::request::Request;
use net_traits::response::{Response, ResponseBody};
use net_traits::{CancellationListener, NetworkError};

use crate::protocols::Requester;

/// Synthesizes responses for `about:` URLs. Only `about:blank` resolves;
/// everything else is an error.
pub struct AboutRequester;

impl Requester for AboutRequester {
    fn supports_scheme(&self, scheme: &str) -> bool {
        scheme == "about"
    }

    fn request(
        &self,
        request: &Request,
        _cancel: &CancellationListener,
    ) -> Result<Response, NetworkError> {
        match request.target.path() {
            "blank" => {
                let mut response = Response::new(request.target.clone());
                response.headers.typed_insert(ContentType::html());
                response.body = ResponseBody::Done(Vec::new());
                Ok(response)
            },
            _ => Err(NetworkError::Internal("Unknown about: URL.".to_owned())),
        }
    }
}
