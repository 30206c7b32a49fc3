/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Per-element resource fetching with an at-most-one-live-download
//! discipline. One implementation serves image elements, object elements and
//! image form inputs alike; elements are distinguished only by their id and
//! resource kind.

use std::sync::{Arc, Mutex};

use log::warn;
use net_traits::request::{Destination, RequestBuilder};
use net_traits::response::Response;
use net_traits::{Download, DownloadId, ElementId, NetworkError};
use url::Url;

use crate::document::Document;
use crate::document_loader::{LoadBlocker, LoadType};
use crate::network_listener::{FetchResponseListener, NetworkListener};

/// The resource kinds fetched through bindings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResourceKind {
    Image,
    Object,
}

impl ResourceKind {
    fn destination(self) -> Destination {
        match self {
            ResourceKind::Image => Destination::Image,
            ResourceKind::Object => Destination::Object,
        }
    }

    fn load_type(self, url: Url) -> LoadType {
        match self {
            ResourceKind::Image => LoadType::Image(url),
            ResourceKind::Object => LoadType::Object(url),
        }
    }
}

/// Download state for one element: the live download, if any, and the last
/// completed result together with the source URL it was fetched for.
#[derive(Default)]
pub struct ResourceBinding {
    pub(crate) current: Option<Download>,
    pub(crate) result: Option<Response>,
    pub(crate) source: Option<Url>,
}

/// In-flight state of one binding fetch, processed on the document thread
/// when the download settles.
struct ResourceContext {
    element: ElementId,
    /// Identifies the download this context belongs to; completions of
    /// superseded downloads are recognized by comparing against the
    /// binding's current one.
    download_id: DownloadId,
    /// The source URL as requested, before any redirects.
    url: Url,
    blocker: Option<LoadBlocker>,
}

impl FetchResponseListener for ResourceContext {
    fn process_response(
        &mut self,
        document: &Document,
        outcome: Result<Response, NetworkError>,
    ) {
        // The pending-load entry settles exactly once, whatever happens
        // below and however stale this completion is.
        LoadBlocker::terminate(&mut self.blocker, document);

        let mut bindings = document.resource_bindings.borrow_mut();
        let Some(binding) = bindings.get_mut(&self.element) else {
            return;
        };
        // A completion that is no longer the element's current download was
        // superseded and must not touch the binding.
        if binding.current.as_ref().map(Download::id) != Some(self.download_id) {
            return;
        }
        match outcome {
            Ok(response) => {
                binding.result = Some(response);
                binding.source = Some(self.url.clone());
            },
            Err(error) => {
                // The element is left without a result; surfacing the
                // failure to the user is the owning element's concern.
                warn!("error loading resource {}: {:?}", self.url, error);
                binding.result = None;
                binding.source = None;
            },
        }
    }
}

impl Document {
    /// Points `element` at `candidate`, superseding any fetch already in
    /// flight for it.
    ///
    /// An absent or unparsable candidate resets the binding without raising:
    /// source selection errors are not load errors.
    pub fn update_resource(
        &self,
        element: ElementId,
        kind: ResourceKind,
        candidate: Option<&str>,
    ) {
        let resolved = candidate.and_then(|candidate| self.url().join(candidate).ok());

        let mut bindings = self.resource_bindings.borrow_mut();
        let binding = bindings.entry(element).or_default();

        let Some(url) = resolved else {
            if let Some(current) = binding.current.take() {
                if !current.is_completed() {
                    current.cancel();
                }
            }
            binding.result = None;
            binding.source = None;
            return;
        };

        // Re-selecting the source of a completed result is a no-op.
        if binding.result.is_some() && binding.source.as_ref() == Some(&url) {
            return;
        }

        // At most one live download per element.
        if let Some(current) = binding.current.as_ref() {
            if !current.is_completed() {
                current.cancel();
            }
        }

        let request = RequestBuilder::new(url.clone())
            .origin(self.origin().clone())
            .source(element)
            .destination(kind.destination())
            .build();
        let blocker = LoadBlocker::new(self, kind.load_type(url.clone()));
        let context = ResourceContext {
            element,
            download_id: request.id,
            url,
            blocker: Some(blocker),
        };
        let listener = NetworkListener {
            context: Arc::new(Mutex::new(context)),
            task_source: self.task_source(),
        };
        let download = self
            .loader_mut()
            .fetch_async_background(request, listener.into_callback());
        binding.current = Some(download);
    }

    /// The element's current download handle, if any fetch was registered.
    pub fn current_resource_download(&self, element: ElementId) -> Option<Download> {
        self.resource_bindings
            .borrow()
            .get(&element)
            .and_then(|binding| binding.current.clone())
    }
}
