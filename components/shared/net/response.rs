/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use headers::{ContentType, HeaderMapExt};
use http::{HeaderMap, StatusCode};
use mime::Mime;
use url::Url;

/// The body of a settled response. Bodies are delivered whole; ownership of
/// the bytes moves with the response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResponseBody {
    Empty,
    Done(Vec<u8>),
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        match *self {
            ResponseBody::Empty => true,
            ResponseBody::Done(ref bytes) => bytes.is_empty(),
        }
    }

    /// The bytes received, or an empty slice.
    pub fn bytes(&self) -> &[u8] {
        match *self {
            ResponseBody::Empty => &[],
            ResponseBody::Done(ref bytes) => bytes,
        }
    }
}

/// A settled response to one resource request.
#[derive(Clone, Debug)]
pub struct Response {
    /// The final address, after any redirects were followed.
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl Response {
    /// An empty `200 OK` response for `url`.
    pub fn new(url: Url) -> Response {
        Response {
            url,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
        }
    }

    /// The effective MIME type: the `Content-Type` header when present,
    /// otherwise a guess from the file extension of the final URL, falling
    /// back to `application/octet-stream`.
    pub fn content_type(&self) -> Mime {
        if let Some(content_type) = self.headers.typed_get::<ContentType>() {
            return content_type.into();
        }
        mime_guess::from_path(self.url.path()).first_or_octet_stream()
    }
}

/// Whether `status` redirects the request elsewhere.
///
/// Exactly these five codes count; in particular 308 Permanent Redirect is
/// not among them, and such a response reaches the caller unchanged.
pub fn is_redirect_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 300 | 301 | 302 | 303 | 307)
}
