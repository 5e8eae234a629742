use crate::history::History;
use crate::render::replay;
use espressivo_domain_score::Sequence;
use espressivo_ports::storage::{EngineSettings, NoteMapStore};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub enum JobStatus {
    Pending,
    Running,
    Done(Arc<Sequence>),
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Done(_) | JobStatus::Failed(_))
    }
}

/// Replays on worker threads; callers poll by id.
///
/// Finished jobs stay in the table until [`RenderJobs::take_finished`]
/// removes them. `status` never evicts.
#[derive(Default)]
pub struct RenderJobs {
    table: Arc<Mutex<HashMap<JobId, JobStatus>>>,
    next_id: Mutex<u64>,
}

impl RenderJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a replay of `history` over `original` and returns at once.
    /// The worker owns its snapshot of both.
    pub fn submit(
        &self,
        original: Arc<Sequence>,
        history: History,
        store: Arc<dyn NoteMapStore>,
        settings: EngineSettings,
    ) -> (JobId, JoinHandle<()>) {
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            JobId(*next)
        };
        self.table.lock().insert(id, JobStatus::Pending);

        let table = self.table.clone();
        let handle = std::thread::spawn(move || {
            table.lock().insert(id, JobStatus::Running);
            let status = match replay(&original, &history, store.as_ref(), &settings) {
                Ok(rendered) => {
                    log::info!("render job {} finished", id.0);
                    JobStatus::Done(Arc::new(rendered))
                }
                Err(err) => {
                    log::warn!("render job {} failed: {}", id.0, err);
                    JobStatus::Failed(err.to_string())
                }
            };
            table.lock().insert(id, status);
        });

        (id, handle)
    }

    /// Jobs currently held, finished or not.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.table.lock().get(&id).cloned()
    }

    /// Drops a finished job's result. Returns the final status.
    pub fn take_finished(&self, id: JobId) -> Option<JobStatus> {
        let mut table = self.table.lock();
        if table.get(&id).map(JobStatus::is_finished).unwrap_or(false) {
            table.remove(&id)
        } else {
            None
        }
    }
}
