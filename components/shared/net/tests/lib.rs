/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use net_traits::request::{CorsSettings, CredentialsMode, Destination, RedirectMode, RequestBuilder};
use net_traits::response::{is_redirect_status, Response};
use net_traits::{CancellationListener, Download, DownloadState};
use url::Url;

fn pending_download(url: &str) -> Download {
    let request = RequestBuilder::new(Url::parse(url).unwrap()).build();
    Download::new(&request)
}

#[test]
fn test_download_starts_pending_and_shares_the_request_id() {
    let request = RequestBuilder::new(Url::parse("http://example.com/a.js").unwrap()).build();
    let download = Download::new(&request);
    assert_eq!(download.id(), request.id);
    assert_eq!(download.target().as_str(), "http://example.com/a.js");
    assert_eq!(download.state(), DownloadState::Pending);
}

#[test]
fn test_download_completes_from_pending() {
    let download = pending_download("http://example.com/a.js");
    assert!(download.complete());
    assert!(download.is_completed());
    assert!(!download.is_cancelled());
}

#[test]
fn test_cancel_wins_over_late_completion() {
    let download = pending_download("http://example.com/a.js");
    download.cancel();
    assert!(!download.complete());
    assert_eq!(download.state(), DownloadState::Cancelled);
}

#[test]
fn test_cancelling_a_completed_download_keeps_its_result() {
    let download = pending_download("http://example.com/a.js");
    assert!(download.complete());
    download.cancel();
    assert_eq!(download.state(), DownloadState::Completed);
}

#[test]
fn test_cancellation_listener_observes_the_download() {
    let download = pending_download("http://example.com/a.js");
    let listener = download.cancellation_listener();
    assert!(!listener.cancelled());
    download.cancel();
    assert!(listener.cancelled());
}

#[test]
fn test_default_cancellation_listener_never_cancels() {
    let listener = CancellationListener::default();
    assert!(!listener.cancelled());
}

#[test]
fn test_redirect_status_set() {
    for code in [300, 301, 302, 303, 307] {
        assert!(is_redirect_status(StatusCode::from_u16(code).unwrap()));
    }
    // 308 is deliberately not followed.
    for code in [200, 204, 304, 308, 404] {
        assert!(!is_redirect_status(StatusCode::from_u16(code).unwrap()));
    }
}

#[test]
fn test_content_type_prefers_the_header() {
    let mut response = Response::new(Url::parse("http://example.com/download.bin").unwrap());
    response.headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/css; charset=utf-8"),
    );
    let mime = response.content_type();
    assert_eq!(mime.type_(), mime::TEXT);
    assert_eq!(mime.subtype(), mime::CSS);
}

#[test]
fn test_content_type_falls_back_to_the_extension() {
    let response = Response::new(Url::parse("http://example.com/sheet.css").unwrap());
    let mime = response.content_type();
    assert_eq!(mime.type_(), mime::TEXT);
    assert_eq!(mime.subtype(), mime::CSS);
}

#[test]
fn test_content_type_defaults_to_octet_stream() {
    let response = Response::new(Url::parse("http://example.com/opaque").unwrap());
    assert_eq!(response.content_type(), mime::APPLICATION_OCTET_STREAM);
}

#[test]
fn test_request_builder_defaults() {
    let url = Url::parse("http://example.com/a.js").unwrap();
    let request = RequestBuilder::new(url.clone()).build();
    assert_eq!(request.target, url);
    assert_eq!(request.origin, url.origin());
    assert_eq!(request.destination, Destination::None);
    assert_eq!(request.redirect_mode, RedirectMode::Follow);
    assert_eq!(request.credentials_mode, CredentialsMode::CredentialsSameOrigin);
    assert!(!request.cookie_blocked);
    assert!(!request.same_origin_forced);
    assert!(request.source.is_none());
}

#[test]
fn test_cors_settings_enumerated_attribute() {
    assert_eq!(
        CorsSettings::from_enumerated_attribute("use-credentials"),
        CorsSettings::UseCredentials
    );
    assert_eq!(
        CorsSettings::from_enumerated_attribute("USE-Credentials"),
        CorsSettings::UseCredentials
    );
    assert_eq!(
        CorsSettings::from_enumerated_attribute("anonymous"),
        CorsSettings::Anonymous
    );
    // Invalid value default.
    assert_eq!(
        CorsSettings::from_enumerated_attribute(""),
        CorsSettings::Anonymous
    );
    assert_eq!(
        CorsSettings::from_enumerated_attribute("unknown"),
        CorsSettings::Anonymous
    );
}
