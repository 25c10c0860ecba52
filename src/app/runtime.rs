// SPDX-License-Identifier: GPL-3.0-only

//! Component mount
//!
//! Owns the model for the lifetime of one mount. Messages are applied one at
//! a time; tasks returned by `update` run on a tokio `JoinSet` and their
//! messages come back through [`Mount::step`]. Dropping or tearing down the
//! mount aborts every outstanding task, including a scheduled second capture.

use crate::app::state::{DualCaptureModel, Message};
use crate::app::task::Task;
use crate::app::view::View;
use tokio::task::JoinSet;
use tracing::{debug, error};

pub struct Mount {
    model: DualCaptureModel,
    tasks: JoinSet<Option<Message>>,
    torn_down: bool,
}

impl Mount {
    /// Mount the screen. Must be called inside a tokio runtime.
    pub fn new(model: DualCaptureModel) -> Self {
        let mut mount = Self {
            model,
            tasks: JoinSet::new(),
            torn_down: false,
        };
        mount.dispatch(Message::Mounted);
        mount
    }

    pub fn model(&self) -> &DualCaptureModel {
        &self.model
    }

    pub fn view(&self) -> View {
        self.model.view()
    }

    /// Apply a message now and start whatever work it produced
    pub fn dispatch(&mut self, message: Message) {
        if self.torn_down {
            debug!(?message, "Dropping message after teardown");
            return;
        }
        let task = self.model.update(message);
        self.spawn(task);
    }

    fn spawn(&mut self, task: Task<Message>) {
        if task.is_none() {
            return;
        }
        debug!(futures = task.len(), "Spawning task");
        for future in task.into_futures() {
            self.tasks.spawn(future);
        }
    }

    /// Number of tasks still running
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for the next task to finish and apply its message
    ///
    /// Returns false once nothing is pending.
    pub async fn step(&mut self) -> bool {
        match self.tasks.join_next().await {
            Some(Ok(Some(message))) => {
                self.dispatch(message);
                true
            }
            Some(Ok(None)) => true,
            Some(Err(e)) if e.is_cancelled() => true,
            Some(Err(e)) => {
                error!(error = %e, "Capture screen task panicked");
                true
            }
            None => false,
        }
    }

    /// Run until no task is pending
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    /// Unmount: cancel pending work and release the camera
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if !self.tasks.is_empty() {
            debug!(pending = self.tasks.len(), "Aborting pending tasks");
        }
        self.tasks.abort_all();
        self.model.teardown();
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.teardown();
    }
}
