/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The document side of the engine: per-document resource bindings, the
//! script preparation and execution machinery, and the pending-load
//! accounting that drives the document's load event.
//!
//! Everything reachable from [`document::Document`] has document affinity and
//! must stay on the thread that created it. Fetches run elsewhere; their
//! completions come back as tasks queued on the document's [`task`] queue.

#[macro_use]
pub mod task;

pub mod document;
pub mod document_loader;
pub mod event;
pub mod network_listener;
pub mod resource_binding;
pub mod script_element;
