// SPDX-License-Identifier: GPL-3.0-only

//! Deferred work returned from `update`
//!
//! A task is a batch of futures, each yielding at most one message. The
//! [`Mount`](super::runtime::Mount) spawns them and feeds results back into
//! the model.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;

pub struct Task<M> {
    futures: Vec<BoxFuture<'static, Option<M>>>,
}

impl<M: Send + 'static> Task<M> {
    /// No follow-up work
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// Deliver `message` on the next turn
    pub fn done(message: M) -> Self {
        Self::future(async move { Some(message) })
    }

    /// Run `future` and map its output to a message
    pub fn perform<T, F, Map>(future: F, map: Map) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        Map: FnOnce(T) -> M + Send + 'static,
    {
        Self::future(async move { Some(map(future.await)) })
    }

    /// Run a future that may or may not produce a message
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Option<M>> + Send + 'static,
    {
        Self {
            futures: vec![future.boxed()],
        }
    }

    /// Combine several tasks; they run concurrently
    pub fn batch(tasks: impl IntoIterator<Item = Task<M>>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|t| t.futures).collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub(crate) fn into_futures(self) -> Vec<BoxFuture<'static, Option<M>>> {
        self.futures
    }
}

impl<M> std::fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task({} futures)", self.futures.len())
    }
}
