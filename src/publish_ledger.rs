use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::model::PublishedAsset;

pub const DEFAULT_CAPACITY: usize = 1024;

/// Remembers which render jobs were already published.
///
/// The first caller for a job runs the upload; callers racing with it wait
/// for that upload, and later callers get the stored asset back.
///
/// At most `capacity` jobs are remembered. Past that the oldest job is
/// forgotten, and polling it again uploads the video a second time.
#[derive(Clone)]
pub struct PublishLedger {
    inner: Arc<Mutex<Entries>>,
    capacity: usize,
}

#[derive(Default)]
struct Entries {
    cells: HashMap<String, Arc<OnceCell<PublishedAsset>>>,
    order: VecDeque<String>,
}

impl Default for PublishLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl PublishLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Entries::default())),
            capacity: capacity.max(1),
        }
    }

    pub async fn publish_once<F, Fut>(&self, job_id: &str, publish: F) -> PublishedAsset
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PublishedAsset>,
    {
        let cell = {
            let mut entries = self
                .inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match entries.cells.get(job_id) {
                Some(cell) => cell.clone(),
                None => {
                    while entries.order.len() >= self.capacity {
                        let Some(oldest) = entries.order.pop_front() else {
                            break;
                        };
                        entries.cells.remove(&oldest);
                    }
                    let cell = Arc::new(OnceCell::new());
                    entries.cells.insert(job_id.to_string(), cell.clone());
                    entries.order.push_back(job_id.to_string());
                    cell
                }
            }
        };
        cell.get_or_init(publish).await.clone()
    }

    pub fn get(&self, job_id: &str) -> Option<PublishedAsset> {
        let entries = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.cells.get(job_id).and_then(|cell| cell.get().cloned())
    }
}
