/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Shared types for the resource-loading side of the engine: request and
//! response descriptors, download handles with cooperative cancellation, and
//! the messages understood by the resource thread.

use std::fmt;
use std::sync::{Arc, Mutex};

use crossbeam_channel::Sender;
use url::Url;
use uuid::Uuid;

use crate::request::{CorsSettings, OriginBehavior, Request};
use crate::response::Response;

pub mod request;
pub mod response;

/// A host-assigned key identifying a DOM element.
///
/// The DOM tree itself lives outside this workspace; elements are referred to
/// by id only, and all per-element state is kept in stores keyed by this type.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ElementId(pub u32);

/// An id to differentiate one download from another.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DownloadId(pub Uuid);

impl Default for DownloadId {
    fn default() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Network errors that have to be exported out of the loaders.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NetworkError {
    /// Could be any of the internal errors, like unsupported scheme, policy
    /// denial, transport failure, etc.
    Internal(String),
    LoadCancelled,
    /// The redirect chain exceeded the hop limit.
    TooManyRedirects,
}

/// The lifecycle of one fetch job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DownloadState {
    Pending,
    Completed,
    Cancelled,
}

/// A shareable handle to one in-flight or settled fetch job.
///
/// Exactly one writer performs each state transition: the fetch worker moves
/// `Pending` to `Completed`, the owner moves `Pending` to `Cancelled`.
/// Terminal states never change again.
#[derive(Clone, Debug)]
pub struct Download {
    id: DownloadId,
    target: Url,
    state: Arc<Mutex<DownloadState>>,
}

impl Download {
    /// Creates a pending download for `request`, sharing its id.
    pub fn new(request: &Request) -> Download {
        Download {
            id: request.id,
            target: request.target.clone(),
            state: Arc::new(Mutex::new(DownloadState::Pending)),
        }
    }

    pub fn id(&self) -> DownloadId {
        self.id
    }

    /// The URL as originally requested, before any redirects.
    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn state(&self) -> DownloadState {
        *self.state.lock().unwrap()
    }

    pub fn is_completed(&self) -> bool {
        self.state() == DownloadState::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == DownloadState::Cancelled
    }

    /// Requests cooperative cancellation. A download that has already
    /// completed keeps its result.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == DownloadState::Pending {
            *state = DownloadState::Cancelled;
        }
    }

    /// Marks the download completed, returning whether the transition
    /// happened. Returns false when the download was cancelled first, in
    /// which case the outcome must be reported as cancelled.
    pub fn complete(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state == DownloadState::Pending {
            *state = DownloadState::Completed;
            true
        } else {
            false
        }
    }

    /// A cancellation signal observing this download, for threading into the
    /// fetch layer.
    pub fn cancellation_listener(&self) -> CancellationListener {
        CancellationListener {
            state: Some(self.state.clone()),
        }
    }
}

/// A cooperative cancellation signal polled by the fetch layer between
/// dispatch steps. The default listener never cancels.
#[derive(Clone, Debug, Default)]
pub struct CancellationListener {
    state: Option<Arc<Mutex<DownloadState>>>,
}

impl CancellationListener {
    pub fn cancelled(&self) -> bool {
        match self.state {
            Some(ref state) => *state.lock().unwrap() == DownloadState::Cancelled,
            None => false,
        }
    }
}

/// Observer notified as requests are matched to a requester and dispatched.
pub trait FetchObserver: Send + Sync {
    /// A requester accepted `request`; dispatch is about to begin.
    fn request_started(&self, request: &Request);
    /// The request settled, successfully or not.
    fn request_ended(&self, request: &Request);
}

/// Completion delivery for one fetch job. Invoked exactly once, on the fetch
/// worker thread, whatever the outcome.
pub type FetchCallback = Box<dyn FnOnce(Result<Response, NetworkError>) + Send + 'static>;

pub enum CoreResourceMsg {
    /// Dispatch a plain load for `request`, settling `download` and
    /// delivering the outcome to `callback`.
    Fetch {
        request: Request,
        download: Download,
        callback: FetchCallback,
    },
    /// Dispatch a potentially-CORS-enabled fetch.
    FetchWithCors {
        request: Request,
        setting: Option<CorsSettings>,
        behavior: OriginBehavior,
        download: Download,
        callback: FetchCallback,
    },
    /// Break out of the resource thread's event loop.
    Exit,
}

/// A shareable handle to the resource thread.
pub type CoreResourceThread = Sender<CoreResourceMsg>;
