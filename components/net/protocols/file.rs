/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fs;

use headers::{ContentType, HeaderMapExt};
use net_traits::request::Request;
use net_traits::response::{Response, ResponseBody};
use net_traits::{CancellationListener, NetworkError};

use crate::protocols::Requester;

/// Serves `file:` URLs from the local filesystem. Bodies are read whole; the
/// content type is guessed from the file extension.
pub struct FileRequester;

impl Requester for FileRequester {
    fn supports_scheme(&self, scheme: &str) -> bool {
        scheme == "file"
    }

    fn request(
        &self,
        request: &Request,
        cancel: &CancellationListener,
    ) -> Result<Response, NetworkError> {
        let path = request
            .target
            .to_file_path()
            .map_err(|_| NetworkError::Internal("Unsupported file URL.".to_owned()))?;
        if cancel.cancelled() {
            return Err(NetworkError::LoadCancelled);
        }
        let body = fs::read(&path).map_err(|error| NetworkError::Internal(error.to_string()))?;

        let mut response = Response::new(request.target.clone());
        let mime = mime_guess::from_path(&path).first_or_octet_stream();
        response.headers.typed_insert(ContentType::from(mime));
        response.body = ResponseBody::Done(body);
        Ok(response)
    }
}
