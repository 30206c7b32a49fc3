/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

mod document;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use http::StatusCode;
use net::protocols::Requester;
use net::resource_thread::new_resource_thread;
use net_traits::request::Request;
use net_traits::response::Response;
use net_traits::{CancellationListener, CoreResourceThread, ElementId, NetworkError};
use script::document::{Document, DocumentOptions};
use script::document_loader::DocumentLoader;
use script::event::{EventBubbles, EventCancelable, EventSink, EventStatus};
use script::script_element::{ScriptEngine, ScriptError, ScriptOptions, ScriptSource};
use script::task::{task_channel, TaskQueue};
use url::Url;

pub const DEFAULT_DOCUMENT_URL: &str = "http://example.com/page.html";

/// A requester serving scripted responses and recording every request it is
/// asked to dispatch.
pub struct MockRequester {
    scheme: &'static str,
    responder: Box<dyn Fn(&Request) -> Result<Response, NetworkError> + Send + Sync>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl Requester for MockRequester {
    fn supports_scheme(&self, scheme: &str) -> bool {
        scheme == self.scheme
    }

    fn request(
        &self,
        request: &Request,
        _cancel: &CancellationListener,
    ) -> Result<Response, NetworkError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

#[derive(Clone)]
pub struct RequestLog {
    requests: Arc<Mutex<Vec<Request>>>,
}

impl RequestLog {
    pub fn len(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn nth(&self, index: usize) -> Request {
        self.requests.lock().unwrap()[index].clone()
    }
}

/// An empty response for `request` with the given status.
pub fn respond(request: &Request, status: u16) -> Response {
    let mut response = Response::new(request.target.clone());
    response.status = StatusCode::from_u16(status).unwrap();
    response
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedEvent {
    pub target: ElementId,
    pub name: String,
    pub bubbles: EventBubbles,
    pub cancelable: EventCancelable,
}

/// Event recorder shared between a test and the document's sink. Events
/// whose names were registered through `cancel` report themselves canceled.
#[derive(Default)]
pub struct EventLog {
    events: RefCell<Vec<RecordedEvent>>,
    cancel_names: RefCell<Vec<String>>,
    loads_complete: Cell<usize>,
}

impl EventLog {
    pub fn cancel(&self, name: &str) {
        self.cancel_names.borrow_mut().push(name.to_owned());
    }

    pub fn stop_cancelling(&self, name: &str) {
        self.cancel_names.borrow_mut().retain(|cancelled| cancelled != name);
    }

    pub fn names(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|event| event.name.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    pub fn loads_complete_count(&self) -> usize {
        self.loads_complete.get()
    }
}

pub struct SharedSink(pub Rc<EventLog>);

impl EventSink for SharedSink {
    fn fire_event(
        &self,
        target: ElementId,
        name: &str,
        bubbles: EventBubbles,
        cancelable: EventCancelable,
    ) -> EventStatus {
        self.0.events.borrow_mut().push(RecordedEvent {
            target,
            name: name.to_owned(),
            bubbles,
            cancelable,
        });
        let cancel = cancelable == EventCancelable::Cancelable &&
            self.0.cancel_names.borrow().iter().any(|cancelled| cancelled == name);
        if cancel {
            EventStatus::Canceled
        } else {
            EventStatus::NotCanceled
        }
    }

    fn loads_complete(&self) {
        self.0.loads_complete.set(self.0.loads_complete.get() + 1);
    }
}

#[derive(Clone, Debug)]
pub struct Evaluation {
    pub element: ElementId,
    /// The script text for inline sources.
    pub text: Option<String>,
    /// The fetched URL for external sources.
    pub url: Option<Url>,
    pub encoding: Option<&'static encoding_rs::Encoding>,
}

#[derive(Default)]
pub struct EngineLog {
    evaluations: RefCell<Vec<Evaluation>>,
}

impl EngineLog {
    pub fn count(&self) -> usize {
        self.evaluations.borrow().len()
    }

    pub fn all(&self) -> Vec<Evaluation> {
        self.evaluations.borrow().clone()
    }
}

/// A script engine recording what it is asked to evaluate, optionally
/// failing every evaluation.
pub struct MockEngine {
    log: Rc<EngineLog>,
    fail: bool,
}

impl ScriptEngine for MockEngine {
    fn evaluate(
        &self,
        script: &ScriptSource,
        options: &ScriptOptions,
    ) -> Result<(), ScriptError> {
        let text = match *script {
            ScriptSource::Text(ref text) => Some(text.clone()),
            ScriptSource::External(_) => None,
        };
        self.log.evaluations.borrow_mut().push(Evaluation {
            element: options.element,
            text,
            url: options.url.clone(),
            encoding: options.encoding,
        });
        if self.fail {
            Err(ScriptError("mock engine failure".to_owned()))
        } else {
            Ok(())
        }
    }
}

/// A document wired to a real resource thread backed by a single mock
/// `http` requester, with recording hooks on every seam.
pub struct Harness {
    pub document: Document,
    pub queue: TaskQueue,
    pub events: Rc<EventLog>,
    pub engine: Rc<EngineLog>,
    pub requests: RequestLog,
    pub resource_thread: CoreResourceThread,
}

impl Harness {
    /// Blocks until `n` queued tasks have run.
    pub fn pump_tasks(&self, n: usize) {
        for _ in 0..n {
            assert!(self.queue.run_one(&self.document), "task queue closed");
        }
    }

    /// Runs whatever is queued right now without blocking.
    pub fn drain(&self) -> usize {
        self.queue.run_pending(&self.document)
    }
}

pub fn harness<F>(responder: F) -> Harness
where
    F: Fn(&Request) -> Result<Response, NetworkError> + Send + Sync + 'static,
{
    build_harness(DEFAULT_DOCUMENT_URL, false, responder)
}

pub fn harness_at<F>(url: &str, responder: F) -> Harness
where
    F: Fn(&Request) -> Result<Response, NetworkError> + Send + Sync + 'static,
{
    build_harness(url, false, responder)
}

pub fn harness_with_failing_engine<F>(responder: F) -> Harness
where
    F: Fn(&Request) -> Result<Response, NetworkError> + Send + Sync + 'static,
{
    build_harness(DEFAULT_DOCUMENT_URL, true, responder)
}

fn build_harness<F>(url: &str, engine_fails: bool, responder: F) -> Harness
where
    F: Fn(&Request) -> Result<Response, NetworkError> + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let requester = MockRequester {
        scheme: "http",
        responder: Box::new(responder),
        requests: requests.clone(),
    };
    let resource_thread = new_resource_thread(vec![Box::new(requester)], None);

    let (task_source, queue) = task_channel();
    let events = Rc::new(EventLog::default());
    let engine = Rc::new(EngineLog::default());
    let mut options = DocumentOptions::default();
    options.register_script_engine(
        "text/javascript",
        Rc::new(MockEngine {
            log: engine.clone(),
            fail: engine_fails,
        }),
    );
    let document = Document::new(
        Url::parse(url).unwrap(),
        options,
        DocumentLoader::new(resource_thread.clone()),
        task_source,
        Box::new(SharedSink(events.clone())),
    );
    Harness {
        document,
        queue,
        events,
        engine,
        requests: RequestLog { requests },
        resource_thread,
    }
}
