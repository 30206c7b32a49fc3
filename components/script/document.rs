/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The per-document context: base URL and origin, the script-engine
//! registry, pending-load accounting, and the keyed stores backing resource
//! bindings and script states.

use std::cell::{Cell, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use net_traits::response::Response;
use net_traits::ElementId;
use url::{Origin, Url};

use crate::document_loader::{DocumentLoader, LoadBlocker, LoadType};
use crate::event::{EventBubbles, EventCancelable, EventSink, EventStatus};
use crate::resource_binding::ResourceBinding;
use crate::script_element::{ScriptEngine, ScriptState};
use crate::task::{TaskOnce, TaskSource};

/// Per-document configuration. Currently just the script engines the host
/// makes available, keyed by MIME type.
#[derive(Default)]
pub struct DocumentOptions {
    script_engines: HashMap<String, Rc<dyn ScriptEngine>>,
}

impl DocumentOptions {
    pub fn register_script_engine(&mut self, language: &str, engine: Rc<dyn ScriptEngine>) {
        self.script_engines
            .insert(language.to_ascii_lowercase(), engine);
    }

    /// Engine lookup by script language, ASCII case-insensitive.
    pub fn get_script_engine(&self, language: &str) -> Option<Rc<dyn ScriptEngine>> {
        self.script_engines
            .get(&language.to_ascii_lowercase())
            .cloned()
    }
}

/// One document. Single-threaded by construction; fetch completions reach it
/// only through its task queue.
pub struct Document {
    url: Url,
    /// The origin all requests made on the document's behalf carry, captured
    /// once at construction. Opaque origins stay comparable this way.
    origin: Origin,
    options: DocumentOptions,
    loader: RefCell<DocumentLoader>,
    task_source: TaskSource,
    events: Box<dyn EventSink>,
    events_inhibited: Cell<bool>,
    pub(crate) resource_bindings: RefCell<HashMap<ElementId, ResourceBinding>>,
    pub(crate) script_states: RefCell<HashMap<ElementId, ScriptState>>,
    out_of_order_scripts: RefCell<Vec<ElementId>>,
}

impl Document {
    pub fn new(
        url: Url,
        options: DocumentOptions,
        loader: DocumentLoader,
        task_source: TaskSource,
        events: Box<dyn EventSink>,
    ) -> Document {
        let origin = url.origin();
        Document {
            url,
            origin,
            options,
            loader: RefCell::new(loader),
            task_source,
            events,
            events_inhibited: Cell::new(false),
            resource_bindings: RefCell::new(HashMap::new()),
            script_states: RefCell::new(HashMap::new()),
            out_of_order_scripts: RefCell::new(Vec::new()),
        }
    }

    /// The document's URL, which doubles as the base for relative references.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub(crate) fn loader_mut(&self) -> RefMut<DocumentLoader> {
        self.loader.borrow_mut()
    }

    /// A handle for queueing tasks onto this document from other threads.
    pub fn task_source(&self) -> TaskSource {
        self.task_source.clone()
    }

    pub fn queue_task<T: TaskOnce + 'static>(&self, task: T) {
        self.task_source.queue(task);
    }

    /// Queues a task firing a non-bubbling, non-cancelable event at `target`.
    pub fn queue_simple_event(&self, target: ElementId, name: &'static str) {
        self.task_source.queue(task!(fire_simple_event: move |document| {
            document.fire_event(
                target,
                name,
                EventBubbles::DoesNotBubble,
                EventCancelable::NotCancelable,
            );
        }));
    }

    /// Delivers an event through the host sink, unless delivery has been
    /// inhibited.
    pub fn fire_event(
        &self,
        target: ElementId,
        name: &str,
        bubbles: EventBubbles,
        cancelable: EventCancelable,
    ) -> EventStatus {
        if self.events_inhibited.get() {
            return EventStatus::NotCanceled;
        }
        self.events.fire_event(target, name, bubbles, cancelable)
    }

    /// Stops all further event delivery. Used at teardown, when the host DOM
    /// may already be gone.
    pub fn inhibit_events(&self) {
        self.events_inhibited.set(true);
    }

    /// Registers a blocking load the host settles itself, such as a
    /// stylesheet fetch performed outside this crate.
    pub fn delay_load(&self, load: LoadType) -> LoadBlocker {
        LoadBlocker::new(self, load)
    }

    pub fn finish_load(&self, load: LoadType) {
        let blocked = {
            let mut loader = self.loader.borrow_mut();
            loader.finish_load(load);
            loader.is_blocked()
        };
        if !blocked && !self.events_inhibited.get() {
            self.events.loads_complete();
        }
    }

    pub fn is_load_blocked(&self) -> bool {
        self.loader.borrow().is_blocked()
    }

    pub fn blocking_load_count(&self) -> usize {
        self.loader.borrow().blocking_load_count()
    }

    /// The number of stylesheet fetches still in flight, which parser-driven
    /// inline scripts must wait out.
    pub fn script_blocking_stylesheets_count(&self) -> usize {
        self.loader.borrow().stylesheet_load_count()
    }

    /// Registers a script element for out-of-order (async or deferred)
    /// execution.
    pub fn add_script(&self, element: ElementId) {
        self.out_of_order_scripts.borrow_mut().push(element);
    }

    /// The out-of-order scripts in registration order.
    pub fn out_of_order_scripts(&self) -> Vec<ElementId> {
        self.out_of_order_scripts.borrow().clone()
    }

    /// Whether `element` holds a completed resource result.
    pub fn resource_is_complete(&self, element: ElementId) -> bool {
        self.resource_bindings
            .borrow()
            .get(&element)
            .is_some_and(|binding| binding.result.is_some())
    }

    /// Runs `callback` over the element's stored resource response, if one
    /// has completed.
    pub fn with_resource<R>(
        &self,
        element: ElementId,
        callback: impl FnOnce(&Response) -> R,
    ) -> Option<R> {
        self.resource_bindings
            .borrow()
            .get(&element)
            .and_then(|binding| binding.result.as_ref())
            .map(callback)
    }
}
