/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tracking of pending loads in a document.
//!
//! <https://html.spec.whatwg.org/multipage/#the-end>

use std::thread;

use log::debug;
use net_traits::request::{CorsSettings, OriginBehavior, Request};
use net_traits::{CoreResourceMsg, CoreResourceThread, Download, FetchCallback};
use url::Url;

use crate::document::Document;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadType {
    Image(Url),
    Object(Url),
    Script(Url),
    Stylesheet(Url),
    PageSource(Url),
}

impl LoadType {
    pub fn url(&self) -> &Url {
        match *self {
            LoadType::Image(ref url) |
            LoadType::Object(ref url) |
            LoadType::Script(ref url) |
            LoadType::Stylesheet(ref url) |
            LoadType::PageSource(ref url) => url,
        }
    }
}

/// Canary value ensuring that manually added blocking loads (such as
/// parser-blocking scripts and host-driven stylesheet fetches) are always
/// removed by the time they finish.
#[derive(Debug)]
pub struct LoadBlocker {
    /// The load that is blocking the document's load event.
    load: Option<LoadType>,
}

impl LoadBlocker {
    /// Marks the document as blocked by `load` until `terminate` is called.
    pub fn new(document: &Document, load: LoadType) -> LoadBlocker {
        document.loader_mut().add_blocking_load(load.clone());
        LoadBlocker { load: Some(load) }
    }

    /// Removes the blocker's load from the document's list of blocking loads.
    /// Idempotent; only the first call settles the load.
    pub fn terminate(blocker: &mut Option<LoadBlocker>, document: &Document) {
        if let Some(this) = blocker.as_mut() {
            let load = this.load.take().unwrap();
            document.finish_load(load);
        }
        *blocker = None;
    }
}

impl Drop for LoadBlocker {
    fn drop(&mut self) {
        if !thread::panicking() {
            assert!(self.load.is_none(), "dropped a live load blocker");
        }
    }
}

/// Tracks the document's in-flight resource fetches and talks to the
/// resource thread on its behalf.
pub struct DocumentLoader {
    resource_thread: CoreResourceThread,
    blocking_loads: Vec<LoadType>,
}

impl DocumentLoader {
    pub fn new(resource_thread: CoreResourceThread) -> DocumentLoader {
        DocumentLoader::new_with_load(resource_thread, None)
    }

    /// `initial_load` is the page source fetch the document was created for,
    /// if the host tracks it through this loader.
    pub fn new_with_load(
        resource_thread: CoreResourceThread,
        initial_load: Option<Url>,
    ) -> DocumentLoader {
        DocumentLoader {
            resource_thread,
            blocking_loads: initial_load.into_iter().map(LoadType::PageSource).collect(),
        }
    }

    /// Adds a load to the list of blocking loads.
    pub fn add_blocking_load(&mut self, load: LoadType) {
        debug!(
            "adding blocking load {:?} ({} in flight)",
            load,
            self.blocking_loads.len()
        );
        self.blocking_loads.push(load);
    }

    /// Initiates a fetch whose completion blocks the document's load event.
    pub fn fetch_async(
        &mut self,
        load: LoadType,
        request: Request,
        callback: FetchCallback,
    ) -> Download {
        self.add_blocking_load(load);
        self.fetch_async_background(request, callback)
    }

    /// Initiates a potentially-CORS-enabled fetch whose completion blocks the
    /// document's load event.
    pub fn fetch_with_cors_async(
        &mut self,
        load: LoadType,
        request: Request,
        setting: Option<CorsSettings>,
        behavior: OriginBehavior,
        callback: FetchCallback,
    ) -> Download {
        self.add_blocking_load(load);
        let download = Download::new(&request);
        self.resource_thread
            .send(CoreResourceMsg::FetchWithCors {
                request,
                setting,
                behavior,
                download: download.clone(),
                callback,
            })
            .unwrap();
        download
    }

    /// Initiates a fetch that is not accounted here. Used when a
    /// [`LoadBlocker`] already carries the pending-load obligation.
    pub fn fetch_async_background(
        &mut self,
        request: Request,
        callback: FetchCallback,
    ) -> Download {
        let download = Download::new(&request);
        self.resource_thread
            .send(CoreResourceMsg::Fetch {
                request,
                download: download.clone(),
                callback,
            })
            .unwrap();
        download
    }

    /// Marks an in-progress load complete.
    pub fn finish_load(&mut self, load: LoadType) {
        debug!(
            "load {:?} finished ({} in flight)",
            load,
            self.blocking_loads.len()
        );
        let idx = self
            .blocking_loads
            .iter()
            .position(|unfinished| *unfinished == load);
        self.blocking_loads
            .remove(idx.unwrap_or_else(|| panic!("unknown completed load {:?}", load)));
    }

    pub fn is_blocked(&self) -> bool {
        !self.blocking_loads.is_empty()
    }

    pub fn blocking_load_count(&self) -> usize {
        self.blocking_loads.len()
    }

    /// The number of outstanding stylesheet fetches, which gate inline
    /// script execution.
    pub fn stylesheet_load_count(&self) -> usize {
        self.blocking_loads
            .iter()
            .filter(|load| matches!(load, LoadType::Stylesheet(_)))
            .count()
    }
}
