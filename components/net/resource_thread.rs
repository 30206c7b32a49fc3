/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A thread that takes fetch jobs from documents and dispatches them to the
//! scheme requesters, delivering each outcome back through its callback.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, unbounded};
use net_traits::response::Response;
use net_traits::{
    CancellationListener, CoreResourceMsg, CoreResourceThread, Download, FetchCallback,
    FetchObserver, NetworkError,
};

use crate::fetch::methods::{FetchContext, fetch_with_cors, load, set_default_accept};
use crate::protocols::Requester;

/// Spawns the resource manager thread and returns a handle for submitting
/// fetch jobs to it.
pub fn new_resource_thread(
    requesters: Vec<Box<dyn Requester>>,
    observer: Option<Arc<dyn FetchObserver>>,
) -> CoreResourceThread {
    let (setup_chan, setup_port) = unbounded();
    let mut context = FetchContext::new(requesters);
    if let Some(observer) = observer {
        context = context.with_observer(observer);
    }
    thread::Builder::new()
        .name("ResourceManager".to_owned())
        .spawn(move || {
            ResourceManager::new(setup_port, context).start();
        })
        .expect("Thread spawning failed");
    setup_chan
}

struct ResourceManager {
    from_client: Receiver<CoreResourceMsg>,
    context: FetchContext,
}

impl ResourceManager {
    fn new(from_client: Receiver<CoreResourceMsg>, context: FetchContext) -> ResourceManager {
        ResourceManager {
            from_client,
            context,
        }
    }

    fn start(&mut self) {
        while let Ok(msg) = self.from_client.recv() {
            match msg {
                CoreResourceMsg::Fetch {
                    mut request,
                    download,
                    callback,
                } => {
                    set_default_accept(request.destination, &mut request.headers);
                    self.dispatch(download, callback, move |cancel, context| {
                        match load(&request, cancel, context)? {
                            Some(response) => Ok(response),
                            None => Err(NetworkError::Internal(format!(
                                "No requester for scheme {}",
                                request.target.scheme()
                            ))),
                        }
                    });
                },
                CoreResourceMsg::FetchWithCors {
                    request,
                    setting,
                    behavior,
                    download,
                    callback,
                } => {
                    self.dispatch(download, callback, move |cancel, context| {
                        fetch_with_cors(request, setting, behavior, cancel, context)
                    });
                },
                CoreResourceMsg::Exit => break,
            }
        }
    }

    /// Runs one fetch job on its own worker thread. The job's outcome is
    /// reconciled with the download state (a cancellation that won the race
    /// overrides the result), then the callback fires exactly once.
    fn dispatch<F>(&self, download: Download, callback: FetchCallback, job: F)
    where
        F: FnOnce(&CancellationListener, &FetchContext) -> Result<Response, NetworkError>
            + Send
            + 'static,
    {
        let context = self.context.clone();
        let cancel = download.cancellation_listener();
        thread::Builder::new()
            .name(format!("fetch for {}", download.target()))
            .spawn(move || {
                let mut outcome = job(&cancel, &context);
                if !download.complete() {
                    outcome = Err(NetworkError::LoadCancelled);
                }
                callback(outcome);
            })
            .expect("Thread spawning failed");
    }
}
