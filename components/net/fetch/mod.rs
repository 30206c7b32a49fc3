/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! An implementation of the relevant parts of the
//! [Fetch](https://fetch.spec.whatwg.org/) algorithm.

pub mod methods;
