/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Resource fetching for the document engine: scheme requesters, the
//! potentially-CORS-enabled fetch algorithm, and the resource thread that
//! runs fetch jobs on behalf of documents.

pub mod fetch;
pub mod protocols;
pub mod resource_thread;
