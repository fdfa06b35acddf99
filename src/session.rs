// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The engine side of the interactive similarity tool.
//!
//! The tool recomputes the whole map whenever the user touches a
//! control, and the user touches controls faster than maps finish.
//! Each request therefore gets a generation number.  Starting a new
//! request bumps the shared generation, which every worker of every
//! older request sees the next time it reaches for a row; those
//! workers stop and their requests produce nothing.  Completed maps
//! are only ever accepted for the newest generation, so a map on
//! screen is always a whole map for one configuration.
//!
//! Every request that is not abandoned delivers exactly one frame,
//! even if its worker panics, and a failed request stays failed until
//! the next one.

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::{invalid, Error, Result};
use crate::limits::Limits;
use crate::output::save_gray;
use crate::similarity::{compare_cancellable, SimilarityConfig, SimilarityMap};

/// Lets a computation notice that it has been superseded.
#[derive(Clone, Debug)]
pub struct CancelToken {
    latest: Arc<AtomicU64>,
    generation: u64,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        CancelToken {
            latest: Arc::new(AtomicU64::new(0)),
            generation: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn cancelled() -> Self {
        CancelToken {
            latest: Arc::new(AtomicU64::new(1)),
            generation: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn current(latest: &Arc<AtomicU64>) -> Self {
        CancelToken {
            latest: latest.clone(),
            generation: latest.load(Ordering::SeqCst),
        }
    }

    /// The generation this token was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once a newer generation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.generation
    }
}

struct Frame {
    generation: u64,
    result: Result<SimilarityMap>,
}

// Runs one request and reports its outcome.  A panic becomes a
// `WorkerPanic` frame; only an abandoned request sends nothing.
fn deliver<F>(sender: &Sender<Frame>, generation: u64, work: F)
where
    F: FnOnce() -> Result<Option<SimilarityMap>>,
{
    let result = match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(Ok(Some(map))) => Ok(map),
        Ok(Ok(None)) => return,
        Ok(Err(error)) => Err(error),
        Err(_) => Err(Error::WorkerPanic),
    };
    let _ = sender.send(Frame { generation, result });
}

/// Holds the newest request and the newest complete map.
pub struct Session {
    threads: usize,
    limits: Limits,
    latest: Arc<AtomicU64>,
    config: Option<SimilarityConfig>,
    displayed: Option<(u64, SimilarityMap)>,
    // Generation and message of the newest request that failed.
    failed: Option<(u64, String)>,
    sender: Sender<Frame>,
    receiver: Receiver<Frame>,
    workers: Vec<JoinHandle<()>>,
}

impl Session {
    /// A session whose maps are computed on up to `threads` threads.
    pub fn new(threads: usize) -> Self {
        let (sender, receiver) = unbounded();
        Session {
            threads: threads.max(1),
            limits: Limits::default(),
            latest: Arc::new(AtomicU64::new(0)),
            config: None,
            displayed: None,
            failed: None,
            sender,
            receiver,
            workers: vec![],
        }
    }

    /// Maps larger than `limits` allow are computed at a lower
    /// resolution over the same region.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The generation of the newest request; 0 before the first.
    pub fn generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// The newest requested configuration, after capping.
    pub fn config(&self) -> Option<&SimilarityConfig> {
        self.config.as_ref()
    }

    /// The newest complete map, which may belong to an older request
    /// while a newer one is still running.
    pub fn current(&self) -> Option<&SimilarityMap> {
        self.displayed.as_ref().map(|(_, map)| map)
    }

    /// True when the displayed map belongs to the newest request.
    pub fn is_up_to_date(&self) -> bool {
        match self.displayed {
            Some((generation, _)) => generation == self.generation(),
            None => false,
        }
    }

    /// Start computing the map for `config`, abandoning whatever was
    /// running.  An invalid configuration is refused before anything
    /// is cancelled; an oversized one is shrunk to fit the limits.
    pub fn request(&mut self, config: SimilarityConfig) -> Result<u64> {
        config.validate()?;
        let config = SimilarityConfig {
            viewport: self.limits.cap_viewport(&config.viewport)?,
            ..config
        };

        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancelToken {
            latest: self.latest.clone(),
            generation,
        };
        let sender = self.sender.clone();
        let threads = self.threads;

        self.workers.retain(|worker| !worker.is_finished());
        self.workers.push(thread::spawn(move || {
            deliver(&sender, generation, || {
                compare_cancellable(&config, threads, &token)
            })
        }));
        self.config = Some(config);
        debug!("Requested similarity map generation {}", generation);
        Ok(generation)
    }

    // Returns true if the frame replaced the displayed map.
    fn accept(&mut self, frame: Frame) -> Result<bool> {
        let latest = self.generation();
        if frame.generation != latest {
            debug!(
                "Dropping stale frame for generation {} (latest is {})",
                frame.generation, latest
            );
            return Ok(false);
        }
        match frame.result {
            Ok(map) => {
                self.displayed = Some((frame.generation, map));
                Ok(true)
            }
            Err(error) => {
                warn!("Similarity map generation {} failed: {}", frame.generation, error);
                self.failed = Some((frame.generation, error.to_string()));
                Err(error)
            }
        }
    }

    // The error of the newest request, if it has already failed.
    fn failure(&self) -> Option<Error> {
        match self.failed {
            Some((generation, ref reason)) if generation == self.generation() => {
                Some(Error::RequestFailed {
                    generation,
                    reason: reason.clone(),
                })
            }
            _ => None,
        }
    }

    /// Collect finished work without blocking.  Returns the new map if
    /// the newest request completed since the last call.
    pub fn poll(&mut self) -> Result<Option<&SimilarityMap>> {
        let mut updated = false;
        while let Ok(frame) = self.receiver.try_recv() {
            updated |= self.accept(frame)?;
        }
        Ok(if updated { self.current() } else { None })
    }

    /// Block until the newest request has completed.  Fails, every
    /// time it is asked, if the newest request failed.
    pub fn wait(&mut self) -> Result<&SimilarityMap> {
        if self.config.is_none() {
            return Err(invalid("No similarity map has been requested"));
        }
        while !self.is_up_to_date() {
            if let Some(error) = self.failure() {
                return Err(error);
            }
            match self.receiver.recv() {
                Ok(frame) => {
                    self.accept(frame)?;
                }
                // We hold a sender ourselves, so this can't happen.
                Err(_) => return Err(invalid("The similarity session has shut down")),
            }
        }
        self.current()
            .ok_or_else(|| invalid("No similarity map has been computed"))
    }

    /// Write the displayed map to `path`.
    pub fn export(&self, path: &Path) -> Result<()> {
        match self.current() {
            Some(map) => save_gray(&map.to_image(), path),
            None => Err(invalid("There is no similarity map to export yet")),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(num_cpus::get())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Cancel everything still running, then wait for it to notice.
        self.latest.fetch_add(1, Ordering::SeqCst);
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("A similarity worker panicked during shutdown");
            }
        }
    }
}
