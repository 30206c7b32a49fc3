/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Event delivery types and the seam through which the host DOM receives
//! events fired by this crate.

use net_traits::ElementId;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventBubbles {
    Bubbles,
    DoesNotBubble,
}

impl From<bool> for EventBubbles {
    fn from(boolean: bool) -> Self {
        if boolean {
            EventBubbles::Bubbles
        } else {
            EventBubbles::DoesNotBubble
        }
    }
}

impl From<EventBubbles> for bool {
    fn from(bubbles: EventBubbles) -> Self {
        match bubbles {
            EventBubbles::Bubbles => true,
            EventBubbles::DoesNotBubble => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventCancelable {
    Cancelable,
    NotCancelable,
}

impl From<bool> for EventCancelable {
    fn from(boolean: bool) -> Self {
        if boolean {
            EventCancelable::Cancelable
        } else {
            EventCancelable::NotCancelable
        }
    }
}

impl From<EventCancelable> for bool {
    fn from(cancelable: EventCancelable) -> Self {
        match cancelable {
            EventCancelable::Cancelable => true,
            EventCancelable::NotCancelable => false,
        }
    }
}

/// Whether an event was [canceled](https://dom.spec.whatwg.org/#canceled-flag)
/// by any of its handlers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventStatus {
    Canceled,
    NotCanceled,
}

/// Where events produced by this crate are delivered.
///
/// The DOM tree lives in the host; this crate only names event targets by
/// their [`ElementId`]. A host that does not care about an event returns
/// [`EventStatus::NotCanceled`].
pub trait EventSink {
    fn fire_event(
        &self,
        target: ElementId,
        name: &str,
        bubbles: EventBubbles,
        cancelable: EventCancelable,
    ) -> EventStatus;

    /// The document's last blocking load finished.
    fn loads_complete(&self) {}
}
