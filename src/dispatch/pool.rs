//! Worker Pool
//!
//! A FIFO task queue feeding a fixed set of workers. Sessions enqueue one
//! [`Task`] per request (verb, arguments, and a single-use reply slot) and
//! await the slot. Workers pop tasks one at a time, run the verb's handler,
//! and deliver the reply.
//!
//! A handler that panics never takes its worker down: the panic is caught
//! and the client receives `500 -ERR worker exception`.
//!
//! ## Shutdown
//!
//! `shutdown()` flips a watch flag and wakes every worker. Workers finish
//! their current task, drain whatever is still queued (delivering real
//! results), then exit; `shutdown()` joins them all before returning.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::commands::{CommandHandler, Reply};

/// One queued command plus its single-use response slot.
#[derive(Debug)]
pub struct Task {
    /// Uppercased verb
    pub verb: String,
    /// Arguments, verb excluded
    pub args: Vec<String>,
    /// Where the reply goes; dropped if the session went away
    pub reply_tx: oneshot::Sender<Reply>,
}

/// Handle to the running pool. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct WorkerPool {
    task_tx: mpsc::UnboundedSender<Task>,
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `workers` worker tasks (floored at 1) sharing one queue.
    pub fn start(handler: CommandHandler, workers: usize) -> Self {
        let workers = workers.max(1);
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let queue = Arc::new(Mutex::new(task_rx));

        let handles = (0..workers)
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    Arc::clone(&queue),
                    handler.clone(),
                    shutdown_rx.clone(),
                ))
            })
            .collect();
        info!(workers, "worker pool started");

        Self {
            task_tx,
            shutdown_tx,
            handles: Mutex::new(handles),
        }
    }

    /// Enqueues a command and awaits its reply. If the pool is gone (or the
    /// worker died mid-task) the caller gets a 500 instead of hanging.
    pub async fn dispatch(&self, verb: String, args: Vec<String>) -> Reply {
        let (reply_tx, reply_rx) = oneshot::channel();
        let task = Task {
            verb,
            args,
            reply_tx,
        };
        if self.task_tx.send(task).is_err() {
            return Reply::internal("worker exception");
        }
        reply_rx
            .await
            .unwrap_or_else(|_| Reply::internal("worker exception"))
    }

    /// Signals shutdown, lets workers drain the queue, and joins them.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        info!("worker pool stopped");
    }
}

async fn worker_loop(
    id: usize,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<Task>>>,
    handler: CommandHandler,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    while let Some(task) = next_task(&queue, &mut shutdown_rx).await {
        run_task(&handler, task);
    }
    debug!(worker = id, "worker exited");
}

/// Pops the next task, or `None` when the worker should exit: the queue is
/// closed, or shutdown was signaled and the backlog is drained.
async fn next_task(
    queue: &Mutex<mpsc::UnboundedReceiver<Task>>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> Option<Task> {
    enum Wake {
        Queue(Option<Task>),
        Shutdown,
    }

    let mut rx = queue.lock().await;
    if *shutdown_rx.borrow() {
        // drain mode: serve what is left, never wait for more
        return rx.try_recv().ok();
    }
    let wake = tokio::select! {
        maybe = rx.recv() => Wake::Queue(maybe),
        _ = shutdown_rx.changed() => Wake::Shutdown,
    };
    match wake {
        Wake::Queue(maybe) => maybe,
        Wake::Shutdown => rx.try_recv().ok(),
    }
}

fn run_task(handler: &CommandHandler, task: Task) {
    let reply = match catch_unwind(AssertUnwindSafe(|| handler.execute(&task.verb, &task.args))) {
        Ok(reply) => reply,
        Err(_) => {
            error!(verb = %task.verb, "handler panicked");
            Reply::internal("worker exception")
        }
    };
    // the session may have disconnected; its loss, not an error
    let _ = task.reply_tx.send(reply);
}
