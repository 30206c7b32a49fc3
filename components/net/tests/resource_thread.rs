/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crossbeam_channel::unbounded;
use net::protocols::default_requesters;
use net::resource_thread::new_resource_thread;
use net_traits::request::{OriginBehavior, RequestBuilder};
use net_traits::{CoreResourceMsg, Download, NetworkError};
use url::Url;

#[test]
fn test_fetch_job_completes_and_reports_back() {
    let resource_thread = new_resource_thread(default_requesters(), None);
    let request = RequestBuilder::new(Url::parse("about:blank").unwrap()).build();
    let download = Download::new(&request);
    let (sender, receiver) = unbounded();

    resource_thread
        .send(CoreResourceMsg::Fetch {
            request,
            download: download.clone(),
            callback: Box::new(move |outcome| {
                let _ = sender.send(outcome);
            }),
        })
        .unwrap();

    let outcome = receiver.recv().unwrap();
    assert_eq!(outcome.unwrap().status.as_u16(), 200);
    assert!(download.is_completed());
    resource_thread.send(CoreResourceMsg::Exit).unwrap();
}

#[test]
fn test_cancelled_download_reports_load_cancelled() {
    let resource_thread = new_resource_thread(default_requesters(), None);
    let request = RequestBuilder::new(Url::parse("about:blank").unwrap()).build();
    let download = Download::new(&request);
    download.cancel();
    let (sender, receiver) = unbounded();

    resource_thread
        .send(CoreResourceMsg::Fetch {
            request,
            download: download.clone(),
            callback: Box::new(move |outcome| {
                let _ = sender.send(outcome);
            }),
        })
        .unwrap();

    let outcome = receiver.recv().unwrap();
    assert_eq!(outcome.unwrap_err(), NetworkError::LoadCancelled);
    assert!(download.is_cancelled());
    resource_thread.send(CoreResourceMsg::Exit).unwrap();
}

#[test]
fn test_fetch_with_cors_job_round_trip() {
    let resource_thread = new_resource_thread(default_requesters(), None);
    let request = RequestBuilder::new(Url::parse("data:text/plain,payload").unwrap())
        .origin(Url::parse("http://origin.example").unwrap().origin())
        .build();
    let download = Download::new(&request);
    let (sender, receiver) = unbounded();

    resource_thread
        .send(CoreResourceMsg::FetchWithCors {
            request,
            setting: None,
            behavior: OriginBehavior::Taint,
            download: download.clone(),
            callback: Box::new(move |outcome| {
                let _ = sender.send(outcome);
            }),
        })
        .unwrap();

    let response = receiver.recv().unwrap().unwrap();
    assert_eq!(response.body.bytes(), b"payload");
    assert!(download.is_completed());
    resource_thread.send(CoreResourceMsg::Exit).unwrap();
}
