/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use net_traits::ElementId;
use script::document::DocumentOptions;
use script::document_loader::{LoadBlocker, LoadType};
use script::event::{EventBubbles, EventCancelable};
use script::script_element::{ScriptEngine, ScriptError, ScriptOptions, ScriptSource};
use url::Url;

use crate::{harness, respond};

#[test]
fn test_simple_events_are_delivered_from_the_task_queue() {
    let h = harness(|request| Ok(respond(request, 200)));
    let element = ElementId(1);

    h.document.queue_simple_event(element, "error");
    assert!(h.events.all().is_empty());

    assert_eq!(h.drain(), 1);
    let events = h.events.all();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].target, element);
    assert_eq!(events[0].name, "error");
    assert_eq!(events[0].bubbles, EventBubbles::DoesNotBubble);
    assert_eq!(events[0].cancelable, EventCancelable::NotCancelable);
}

#[test]
fn test_queued_tasks_run_against_the_document() {
    let h = harness(|request| Ok(respond(request, 200)));
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();

    h.document.queue_task(move |document: &script::document::Document| {
        flag.store(document.url().path() == "/page.html", Ordering::SeqCst);
    });
    h.drain();
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn test_inhibited_documents_deliver_nothing() {
    let h = harness(|request| Ok(respond(request, 200)));
    h.document.inhibit_events();

    h.document.queue_simple_event(ElementId(1), "error");
    h.drain();
    assert!(h.events.all().is_empty());

    // The last blocking load clearing stays silent as well.
    let mut blocker = Some(h.document.delay_load(LoadType::Stylesheet(
        Url::parse("http://example.com/a.css").unwrap(),
    )));
    LoadBlocker::terminate(&mut blocker, &h.document);
    assert_eq!(h.document.blocking_load_count(), 0);
    assert_eq!(h.events.loads_complete_count(), 0);
}

#[test]
fn test_delay_load_blocks_the_document_until_terminated() {
    let h = harness(|request| Ok(respond(request, 200)));
    let url = Url::parse("http://example.com/style.css").unwrap();

    let mut blocker = Some(h.document.delay_load(LoadType::Stylesheet(url)));
    assert!(h.document.is_load_blocked());
    assert_eq!(h.document.blocking_load_count(), 1);
    assert_eq!(h.document.script_blocking_stylesheets_count(), 1);

    LoadBlocker::terminate(&mut blocker, &h.document);
    assert!(!h.document.is_load_blocked());
    assert_eq!(h.document.script_blocking_stylesheets_count(), 0);
    assert_eq!(h.events.loads_complete_count(), 1);

    // Terminating an already-settled blocker is a no-op.
    LoadBlocker::terminate(&mut blocker, &h.document);
    assert_eq!(h.events.loads_complete_count(), 1);
}

#[test]
#[should_panic(expected = "dropped a live load blocker")]
fn test_dropping_a_live_blocker_panics() {
    let h = harness(|request| Ok(respond(request, 200)));
    let blocker = h.document.delay_load(LoadType::Stylesheet(
        Url::parse("http://example.com/a.css").unwrap(),
    ));
    drop(blocker);
}

#[test]
fn test_out_of_order_scripts_keep_registration_order() {
    let h = harness(|request| Ok(respond(request, 200)));
    h.document.add_script(ElementId(4));
    h.document.add_script(ElementId(2));
    h.document.add_script(ElementId(9));
    assert_eq!(
        h.document.out_of_order_scripts(),
        vec![ElementId(4), ElementId(2), ElementId(9)]
    );
}

#[test]
fn test_engine_lookup_is_ascii_case_insensitive() {
    struct NoopEngine;
    impl ScriptEngine for NoopEngine {
        fn evaluate(
            &self,
            _script: &ScriptSource,
            _options: &ScriptOptions,
        ) -> Result<(), ScriptError> {
            Ok(())
        }
    }

    let mut options = DocumentOptions::default();
    options.register_script_engine("Text/JavaScript", Rc::new(NoopEngine));
    assert!(options.get_script_engine("text/javascript").is_some());
    assert!(options.get_script_engine("TEXT/JAVASCRIPT").is_some());
    assert!(options.get_script_engine("text/vbscript").is_none());
}
