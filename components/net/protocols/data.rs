/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use data_url::DataUrl;
use http::HeaderValue;
use http::header::CONTENT_TYPE;
use net_traits::request::Request;
use net_traits::response::{Response, ResponseBody};
use net_traits::{CancellationListener, NetworkError};

use crate::protocols::Requester;

/// Decodes `data:` URLs per <https://fetch.spec.whatwg.org/#data-urls>.
pub struct DataRequester;

impl Requester for DataRequester {
    fn supports_scheme(&self, scheme: &str) -> bool {
        scheme == "data"
    }

    fn request(
        &self,
        request: &Request,
        _cancel: &CancellationListener,
    ) -> Result<Response, NetworkError> {
        let data_url = DataUrl::process(request.target.as_str())
            .map_err(|_| NetworkError::Internal("Failed to process data url".to_owned()))?;
        let (body, _fragment) = data_url
            .decode_to_vec()
            .map_err(|_| NetworkError::Internal("Failed to decode data url".to_owned()))?;

        let mut response = Response::new(request.target.clone());
        if let Ok(content_type) = HeaderValue::from_str(&data_url.mime_type().to_string()) {
            response.headers.insert(CONTENT_TYPE, content_type);
        }
        response.body = ResponseBody::Done(body);
        Ok(response)
    }
}
