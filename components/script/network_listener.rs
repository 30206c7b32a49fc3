/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Forwarding of fetch completions from worker threads to the document
//! thread.

use std::sync::{Arc, Mutex};

use net_traits::response::Response;
use net_traits::{FetchCallback, NetworkError};

use crate::document::Document;
use crate::task::TaskSource;

/// A fetch completion handler. Invoked on the document thread, where the
/// document's interior state may be borrowed freely.
pub trait FetchResponseListener: Send + 'static {
    fn process_response(
        &mut self,
        document: &Document,
        outcome: Result<Response, NetworkError>,
    );
}

/// An off-thread wrapper around a listener: completions delivered on fetch
/// worker threads are re-queued as document tasks.
pub struct NetworkListener<L: FetchResponseListener> {
    pub context: Arc<Mutex<L>>,
    pub task_source: TaskSource,
}

impl<L: FetchResponseListener> NetworkListener<L> {
    pub fn notify_fetch(&self, outcome: Result<Response, NetworkError>) {
        let context = self.context.clone();
        self.task_source
            .queue(task!(process_fetch_response: move |document| {
                context.lock().unwrap().process_response(document, outcome);
            }));
    }

    /// The callback form handed to the resource thread. Fires exactly once.
    pub fn into_callback(self) -> FetchCallback {
        Box::new(move |outcome| self.notify_fetch(outcome))
    }
}
