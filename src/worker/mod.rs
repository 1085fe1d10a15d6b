//! Background pagination
//!
//! One pass runs per worker at a time. Submitting a new request cancels the
//! one in flight; results are tagged with a generation so a stale result
//! that raced the cancellation is dropped on receipt.

use crate::pagination::{CancellationToken, Pagination, PaginationError, Paginator};
use crate::screenplay::Line;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// What a submitted pass should do
#[derive(Debug, Clone)]
pub enum PaginationRequest {
    Full,
    /// Live pass after an edit starting at `from_index`
    Live {
        from_index: usize,
        previous: Arc<Pagination>,
    },
}

/// A finished pass
#[derive(Debug)]
pub struct PaginationResult {
    pub generation: u64,
    pub pagination: Pagination,
}

type Message = (u64, Result<Pagination, PaginationError>);

fn run(
    paginator: &Paginator,
    lines: &[Line],
    request: PaginationRequest,
    token: &CancellationToken,
) -> Result<Pagination, PaginationError> {
    match request {
        PaginationRequest::Full => paginator.paginate_cancellable(lines, token),
        PaginationRequest::Live {
            from_index,
            previous,
        } => paginator.paginate_from(lines, from_index, &previous, token),
    }
}

pub struct PaginationWorker {
    paginator: Arc<Paginator>,
    in_flight: Option<CancellationToken>,
    generation: u64,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
}

impl PaginationWorker {
    pub fn new(paginator: Paginator) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            paginator: Arc::new(paginator),
            in_flight: None,
            generation: 0,
            sender,
            receiver,
        }
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Generation of the most recent submission
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a pass, cancelling any pass still running; returns its generation
    pub fn submit(&mut self, lines: Arc<[Line]>, request: PaginationRequest) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        let spawned = {
            let paginator = Arc::clone(&self.paginator);
            let lines = Arc::clone(&lines);
            let request = request.clone();
            let token = token.clone();
            let sender = self.sender.clone();
            thread::Builder::new()
                .name("pagination".into())
                .spawn(move || {
                    let result = run(&paginator, &lines, request, &token);
                    // The receiver only disappears with the worker itself
                    let _ = sender.send((generation, result));
                })
        };
        if let Err(err) = spawned {
            tracing::warn!(error = %err, generation, "could not spawn pagination thread, running inline");
            let result = run(&self.paginator, &lines, request, &token);
            let _ = self.sender.send((generation, result));
        }
        generation
    }

    /// Cancel the pass in flight, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    /// Latest finished result without blocking
    pub fn try_latest(&mut self) -> Option<PaginationResult> {
        while let Ok(message) = self.receiver.try_recv() {
            if let Some(result) = self.accept(message) {
                return Some(result);
            }
        }
        None
    }

    /// Block until the current generation finishes or `timeout` elapses
    pub fn wait_latest(&mut self, timeout: Duration) -> Option<PaginationResult> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(left) {
                Ok(message) => {
                    if let Some(result) = self.accept(message) {
                        return Some(result);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }

    fn accept(&mut self, (generation, result): Message) -> Option<PaginationResult> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale pagination");
            return None;
        }
        match result {
            Ok(pagination) => {
                self.in_flight = None;
                Some(PaginationResult {
                    generation,
                    pagination,
                })
            }
            Err(PaginationError::Cancelled) => None,
        }
    }
}

impl Drop for PaginationWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}
