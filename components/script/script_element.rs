/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Scheduling and execution of classic scripts.
//!
//! <https://html.spec.whatwg.org/multipage/#prepare-a-script>

use std::mem;
use std::sync::{Arc, Mutex};

use encoding_rs::Encoding;
use log::{debug, warn};
use net_traits::request::{CorsSettings, Destination, OriginBehavior, RequestBuilder};
use net_traits::response::Response;
use net_traits::{ElementId, NetworkError};
use url::Url;

use crate::document::Document;
use crate::document_loader::LoadType;
use crate::event::{EventBubbles, EventCancelable, EventStatus};
use crate::network_listener::{FetchResponseListener, NetworkListener};

/// <https://html.spec.whatwg.org/multipage/#default-script-language>
const DEFAULT_SCRIPT_LANGUAGE: &str = "text/javascript";

/// The [script processing model](https://html.spec.whatwg.org/multipage/#script-processing-model)
/// flags of one script element.
#[derive(Default)]
pub struct ScriptState {
    pub(crate) already_started: bool,
    pub(crate) parser_inserted: bool,
    pub(crate) force_async: bool,
    pub(crate) pending_runner: Option<PendingScript>,
}

/// A script that has been committed to running and is waiting for its
/// `run_script` call.
pub struct PendingScript {
    pub(crate) source: ScriptSource,
    pub(crate) language: String,
    pub(crate) encoding: Option<&'static Encoding>,
}

/// Where a script body comes from.
pub enum ScriptSource {
    /// Inline text, snapshotted when the script was prepared.
    Text(String),
    /// The response of a completed external fetch.
    External(Response),
}

/// The evaluation seam. Engines are registered per script language on
/// [`DocumentOptions`](crate::document::DocumentOptions); a document without
/// an engine for a given language silently ignores scripts of that language.
pub trait ScriptEngine {
    fn evaluate(&self, script: &ScriptSource, options: &ScriptOptions)
        -> Result<(), ScriptError>;
}

/// Context handed to the engine alongside the script body.
pub struct ScriptOptions {
    pub element: ElementId,
    /// The fetched URL, for external scripts.
    pub url: Option<Url>,
    pub encoding: Option<&'static Encoding>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScriptError(pub String);

/// Snapshot of a script element's relevant content attributes, taken by the
/// host at the moment of the call.
#[derive(Clone, Debug, Default)]
pub struct ScriptAttributes {
    pub src: Option<String>,
    pub text: String,
    pub type_: Option<String>,
    /// The legacy `language` attribute, mapped to `"text/" + language`.
    pub language: Option<String>,
    pub event: Option<String>,
    pub for_: Option<String>,
    pub charset: Option<String>,
    pub cross_origin: Option<String>,
    pub defer: bool,
    pub asynch: bool,
}

/// <https://html.spec.whatwg.org/multipage/#attr-script-type>
fn resolved_language(attributes: &ScriptAttributes) -> String {
    let type_ = attributes.type_.as_deref().filter(|value| !value.is_empty());
    match type_ {
        Some(value) => value.to_owned(),
        None => attributes
            .language
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(|value| format!("text/{}", value))
            .unwrap_or_else(|| DEFAULT_SCRIPT_LANGUAGE.to_owned()),
    }
}

/// The legacy `for`/`event` gate: a script carrying both attributes only runs
/// as a window onload handler.
///
/// <https://html.spec.whatwg.org/multipage/#dom-script-event>
fn legacy_event_for_allows_execution(attributes: &ScriptAttributes) -> bool {
    let (event, for_) = match (attributes.event.as_deref(), attributes.for_.as_deref()) {
        (Some(event), Some(for_)) if !event.is_empty() && !for_.is_empty() => (event, for_),
        _ => return true,
    };
    let for_ = for_.trim();
    let event = event.trim();
    let event = event.strip_suffix("()").unwrap_or(event);
    for_.eq_ignore_ascii_case("window") && event.eq_ignore_ascii_case("onload")
}

/// In-flight state of an external classic script fetch.
struct ClassicContext {
    element: ElementId,
    /// The URL the fetch was keyed under, before any redirects.
    url: Url,
    language: String,
    encoding: Option<&'static Encoding>,
}

impl FetchResponseListener for ClassicContext {
    fn process_response(
        &mut self,
        document: &Document,
        outcome: Result<Response, NetworkError>,
    ) {
        match outcome {
            Ok(response) => {
                let mut states = document.script_states.borrow_mut();
                let state = states.entry(self.element).or_default();
                state.pending_runner = Some(PendingScript {
                    source: ScriptSource::External(response),
                    language: mem::take(&mut self.language),
                    encoding: self.encoding,
                });
            },
            Err(error) => {
                warn!("error fetching script {}: {:?}", self.url, error);
                document.queue_simple_event(self.element, "error");
            },
        }
        document.finish_load(LoadType::Script(self.url.clone()));
    }
}

impl Document {
    /// Tree-construction hook: the parser created this script element.
    /// Fragment parsing marks the script as already started so that it never
    /// runs.
    pub fn mark_script_parser_inserted(&self, element: ElementId, fragment_case: bool) {
        let mut states = self.script_states.borrow_mut();
        let state = states.entry(element).or_default();
        state.parser_inserted = true;
        state.already_started = fragment_case;
    }

    /// <https://html.spec.whatwg.org/multipage/#prepare-a-script>
    ///
    /// Returns true when the script blocks the driving parser, which must
    /// then suspend until a later `run_script` call.
    pub fn prepare_script(&self, element: ElementId, attributes: &ScriptAttributes) -> bool {
        let was_parser_inserted;
        {
            let mut states = self.script_states.borrow_mut();
            let state = states.entry(element).or_default();

            // Step 1.
            if state.already_started {
                return false;
            }

            // Step 2.
            was_parser_inserted = state.parser_inserted;
            if was_parser_inserted {
                state.force_async = !attributes.asynch;
            }

            // Step 3.
            state.parser_inserted = false;
        }

        // Step 4.
        let src = attributes.src.as_deref().unwrap_or("");
        if src.is_empty() && attributes.text.is_empty() {
            return false;
        }

        // Step 5. Unsupported languages are ignored without any event.
        let language = resolved_language(attributes);
        if self.options().get_script_engine(&language).is_none() {
            debug!("no script engine for type {}", language);
            return false;
        }

        {
            let mut states = self.script_states.borrow_mut();
            let state = states.entry(element).or_default();

            // Step 6.
            if was_parser_inserted {
                state.force_async = false;
            }

            // Step 7.
            state.parser_inserted = true;
            state.already_started = true;
        }

        // Step 8.
        if !legacy_event_for_allows_execution(attributes) {
            return false;
        }

        let encoding = attributes
            .charset
            .as_deref()
            .and_then(|label| Encoding::for_label(label.as_bytes()));

        // Step 9.
        if attributes.src.is_some() {
            if src.is_empty() {
                self.queue_simple_event(element, "error");
                return false;
            }
            let url = match self.url().join(src) {
                Ok(url) => url,
                Err(_) => {
                    warn!("error parsing URL for script {}", src);
                    self.queue_simple_event(element, "error");
                    return false;
                },
            };
            return self.fetch_classic_script(element, attributes, url, language, encoding);
        }

        // Step 10.
        let pending = PendingScript {
            source: ScriptSource::Text(attributes.text.clone()),
            language,
            encoding,
        };
        let parser_inserted = self
            .script_states
            .borrow()
            .get(&element)
            .is_some_and(|state| state.parser_inserted);
        if parser_inserted && self.script_blocking_stylesheets_count() > 0 {
            self.script_states
                .borrow_mut()
                .entry(element)
                .or_default()
                .pending_runner = Some(pending);
            return true;
        }
        self.execute_script(element, pending);
        false
    }

    /// <https://html.spec.whatwg.org/multipage/#fetch-a-classic-script>
    fn fetch_classic_script(
        &self,
        element: ElementId,
        attributes: &ScriptAttributes,
        url: Url,
        language: String,
        encoding: Option<&'static Encoding>,
    ) -> bool {
        let parser_inserted = self
            .script_states
            .borrow()
            .get(&element)
            .is_some_and(|state| state.parser_inserted);

        let mut blocks_parser = true;
        // Deferred, async and dynamically inserted scripts execute out of
        // order and do not hold up the parser.
        if (parser_inserted && attributes.defer && !attributes.asynch) ||
            !parser_inserted ||
            attributes.asynch
        {
            self.add_script(element);
            blocks_parser = false;
        }

        let setting = attributes
            .cross_origin
            .as_deref()
            .map(CorsSettings::from_enumerated_attribute);
        let request = RequestBuilder::new(url.clone())
            .origin(self.origin().clone())
            .source(element)
            .destination(Destination::Script)
            .build();
        let context = ClassicContext {
            element,
            url: url.clone(),
            language,
            encoding,
        };
        let listener = NetworkListener {
            context: Arc::new(Mutex::new(context)),
            task_source: self.task_source(),
        };
        self.loader_mut().fetch_with_cors_async(
            LoadType::Script(url),
            request,
            setting,
            OriginBehavior::Taint,
            listener.into_callback(),
        );
        blocks_parser
    }

    /// <https://html.spec.whatwg.org/multipage/#execute-the-script-block>
    ///
    /// Runs the element's pending script, if it still has one. The
    /// `beforescriptexecute` notification may cancel the run, in which case
    /// the pending script stays put.
    pub fn run_script(&self, element: ElementId) {
        let has_runner = self
            .script_states
            .borrow()
            .get(&element)
            .is_some_and(|state| state.pending_runner.is_some());
        if !has_runner {
            return;
        }

        let status = self.fire_event(
            element,
            "beforescriptexecute",
            EventBubbles::Bubbles,
            EventCancelable::Cancelable,
        );
        if status == EventStatus::Canceled {
            return;
        }

        let pending = self
            .script_states
            .borrow_mut()
            .get_mut(&element)
            .and_then(|state| state.pending_runner.take());
        if let Some(pending) = pending {
            self.execute_script(element, pending);
        }
    }

    fn execute_script(&self, element: ElementId, pending: PendingScript) {
        let options = ScriptOptions {
            element,
            url: match pending.source {
                ScriptSource::External(ref response) => Some(response.url.clone()),
                ScriptSource::Text(_) => None,
            },
            encoding: pending.encoding,
        };
        match self.options().get_script_engine(&pending.language) {
            Some(engine) => {
                // Evaluation failures of third party engines are logged,
                // never surfaced.
                if let Err(error) = engine.evaluate(&pending.source, &options) {
                    warn!("script evaluation failed: {:?}", error);
                }
            },
            None => warn!("no script engine for type {}", pending.language),
        }
        self.fire_event(
            element,
            "afterscriptexecute",
            EventBubbles::Bubbles,
            EventCancelable::NotCancelable,
        );
        if let ScriptSource::Text(_) = pending.source {
            self.queue_simple_event(element, "load");
        }
    }
}
