use crate::{BatchOptions, Job};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartBatch { jobs: Vec<Job>, options: BatchOptions },
}
