//! Single-worker job queues

use futures::future::{BoxFuture, FutureExt};
use logkeep_core::{Error, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

type Job = BoxFuture<'static, ()>;

/// Result of a submitted job. Await it with [`Ticket::wait`] or drop it to
/// fire and forget; the job runs either way.
#[must_use = "drop the ticket explicitly to ignore the result"]
pub struct Ticket<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Ticket<T> {
    fn channel() -> (oneshot::Sender<Result<T>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A ticket that already holds its result
    pub fn ready(result: Result<T>) -> Self {
        let (tx, ticket) = Self::channel();
        let _ = tx.send(result);
        ticket
    }

    pub async fn wait(self) -> Result<T> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(Error::TaskFailed("job dropped before completing".into())))
    }
}

/// Runs submitted futures one at a time, in submission order, on a dedicated
/// tokio task.
pub struct WorkQueue {
    name: &'static str,
    tx: Mutex<Option<mpsc::UnboundedSender<Job>>>,
}

impl WorkQueue {
    /// Start the worker on the current tokio runtime
    pub fn new(name: &'static str) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| Error::TaskFailed(format!("{} queue needs a tokio runtime: {}", name, e)))?;
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_worker(name, rx));

        Ok(Self {
            name,
            tx: Mutex::new(Some(tx)),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn submit<T, F>(&self, job: F) -> Ticket<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, ticket) = Ticket::channel();
        let job = async move {
            let _ = tx.send(job.await);
        }
        .boxed();

        let sent = match self.tx.lock().as_ref() {
            Some(sender) => sender.send(job).is_ok(),
            None => false,
        };
        if sent {
            ticket
        } else {
            Ticket::ready(Err(Error::QueueClosed))
        }
    }

    /// Run blocking filesystem work on the blocking pool, still in queue order
    pub fn submit_blocking<T, F>(&self, job: F) -> Ticket<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        self.submit(async move {
            tokio::task::spawn_blocking(job)
                .await
                .map_err(|e| Error::TaskFailed(e.to_string()))?
        })
    }

    /// Refuse new jobs. Jobs already queued still run.
    pub fn close(&self) {
        if self.tx.lock().take().is_some() {
            debug!("{} queue closed", self.name);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }
}

async fn run_worker(name: &'static str, mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        // Own task per job so a panic cannot take the worker down
        if let Err(e) = tokio::spawn(job).await {
            error!("{} queue job failed: {}", name, e);
        }
    }
    debug!("{} queue drained", name);
}

/// Where local file work runs
pub enum LocalExecutor {
    /// On the caller's thread, before `run` returns
    Immediate { closed: AtomicBool },
    Queued(WorkQueue),
}

impl LocalExecutor {
    pub fn immediate() -> Self {
        LocalExecutor::Immediate {
            closed: AtomicBool::new(false),
        }
    }

    pub fn queued(name: &'static str) -> Result<Self> {
        Ok(LocalExecutor::Queued(WorkQueue::new(name)?))
    }

    pub fn run<T, F>(&self, job: F) -> Ticket<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        match self {
            LocalExecutor::Immediate { closed } => {
                if closed.load(Ordering::SeqCst) {
                    Ticket::ready(Err(Error::QueueClosed))
                } else {
                    Ticket::ready(job())
                }
            }
            LocalExecutor::Queued(queue) => queue.submit_blocking(job),
        }
    }

    pub fn close(&self) {
        match self {
            LocalExecutor::Immediate { closed } => closed.store(true, Ordering::SeqCst),
            LocalExecutor::Queued(queue) => queue.close(),
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, LocalExecutor::Immediate { .. })
    }
}
