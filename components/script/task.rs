/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Machinery for [task](https://html.spec.whatwg.org/multipage/#concept-task).
//!
//! Tasks are queued from any thread but always run on the document thread,
//! with a reference to the document they were queued against.

use std::fmt;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

use crate::document::Document;

macro_rules! task {
    ($name:ident: move |$document:ident| $body:tt) => {{
        #[allow(non_camel_case_types)]
        struct $name<F>(F);
        impl<F> crate::task::TaskOnce for $name<F>
        where
            F: ::std::ops::FnOnce(&crate::document::Document) + Send,
        {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn run_once(self, document: &crate::document::Document) {
                (self.0)(document);
            }
        }
        $name(move |$document: &crate::document::Document| $body)
    }};
}

/// A task that can be run. The name method is for logging purposes.
pub trait TaskOnce: Send {
    fn name(&self) -> &'static str {
        ::std::any::type_name::<Self>()
    }

    fn run_once(self, document: &Document);
}

impl<F> TaskOnce for F
where
    F: FnOnce(&Document) + Send,
{
    fn run_once(self, document: &Document) {
        self(document)
    }
}

/// A boxed version of `TaskOnce`.
pub trait TaskBox: Send {
    fn name(&self) -> &'static str;

    fn run_box(self: Box<Self>, document: &Document);
}

impl<T> TaskBox for T
where
    T: TaskOnce,
{
    fn name(&self) -> &'static str {
        TaskOnce::name(self)
    }

    fn run_box(self: Box<Self>, document: &Document) {
        self.run_once(document)
    }
}

impl fmt::Debug for dyn TaskBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct(self.name())
            .field("..", &format_args!(".."))
            .finish()
    }
}

/// Creates a connected source/queue pair for one document's tasks.
pub fn task_channel() -> (TaskSource, TaskQueue) {
    let (sender, receiver) = unbounded();
    (TaskSource { sender }, TaskQueue { receiver })
}

/// The sending half of a document's task queue. Clonable and sendable to
/// other threads.
#[derive(Clone)]
pub struct TaskSource {
    sender: Sender<Box<dyn TaskBox>>,
}

impl TaskSource {
    pub fn queue<T>(&self, task: T)
    where
        T: TaskOnce + 'static,
    {
        if self.sender.send(Box::new(task)).is_err() {
            // The queue was dropped with the document; late completions from
            // fetch workers end up here.
            warn!("dropping task queued after document shutdown");
        }
    }
}

/// The receiving half, pumped by whoever owns the document thread.
pub struct TaskQueue {
    receiver: Receiver<Box<dyn TaskBox>>,
}

impl TaskQueue {
    /// Runs every task currently queued, including tasks queued while
    /// draining, and returns how many ran.
    pub fn run_pending(&self, document: &Document) -> usize {
        let mut count = 0;
        while let Ok(task) = self.receiver.try_recv() {
            debug!("running task {}", task.name());
            task.run_box(document);
            count += 1;
        }
        count
    }

    /// Blocks until one task arrives and runs it. Returns false once all
    /// sources are gone.
    pub fn run_one(&self, document: &Document) -> bool {
        match self.receiver.recv() {
            Ok(task) => {
                debug!("running task {}", task.name());
                task.run_box(document);
                true
            },
            Err(_) => false,
        }
    }
}
