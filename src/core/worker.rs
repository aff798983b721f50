use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::core::transform::transform_candles;
use crate::core::{Candle, ChartType};

enum Job {
    Transform {
        generation: u64,
        chart_type: ChartType,
        candles: Vec<Candle>,
    },
    Shutdown,
}

/// One completed off-thread transform.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub generation: u64,
    pub chart_type: ChartType,
    pub candles: Vec<Candle>,
}

/// Background candle-transform worker.
///
/// Recomputing a full Heikin-Ashi series on every streaming update can stall
/// the interactive thread, so jobs are shipped to one worker thread. Jobs are
/// tagged with a monotonically increasing generation; there is no ordering
/// guarantee between submission and completion, and callers render the newest
/// *completed* generation. A stale result can transiently show out-of-date
/// history; the next data tick corrects it.
#[derive(Debug)]
pub struct TransformWorker {
    job_tx: Sender<Job>,
    result_rx: Receiver<TransformResult>,
    handle: Option<JoinHandle<()>>,
    next_generation: u64,
    latest: Option<TransformResult>,
}

impl TransformWorker {
    #[must_use]
    pub fn spawn() -> Self {
        let (job_tx, job_rx) = channel::<Job>();
        let (result_tx, result_rx) = channel::<TransformResult>();

        let handle = std::thread::spawn(move || {
            debug!("transform worker started");
            while let Ok(job) = job_rx.recv() {
                match job {
                    Job::Transform {
                        generation,
                        chart_type,
                        candles,
                    } => {
                        let candles = transform_candles(chart_type, &candles);
                        if result_tx
                            .send(TransformResult {
                                generation,
                                chart_type,
                                candles,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                    Job::Shutdown => break,
                }
            }
            debug!("transform worker stopped");
        });

        Self {
            job_tx,
            result_rx,
            handle: Some(handle),
            next_generation: 0,
            latest: None,
        }
    }

    /// Queues a transform and returns its generation tag.
    pub fn submit(&mut self, chart_type: ChartType, candles: Vec<Candle>) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;

        if self
            .job_tx
            .send(Job::Transform {
                generation,
                chart_type,
                candles,
            })
            .is_err()
        {
            warn!(generation, "transform worker is gone, job dropped");
        }

        generation
    }

    /// Drains completed jobs and returns the newest completed result, if any.
    ///
    /// Older completions arriving late are discarded rather than allowed to
    /// roll the rendered series backwards.
    pub fn poll(&mut self) -> Option<&TransformResult> {
        while let Ok(result) = self.result_rx.try_recv() {
            let is_newer = self
                .latest
                .as_ref()
                .is_none_or(|latest| result.generation >= latest.generation);
            if is_newer {
                self.latest = Some(result);
            }
        }
        self.latest.as_ref()
    }
}

impl Drop for TransformWorker {
    fn drop(&mut self) {
        let _ = self.job_tx.send(Job::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
