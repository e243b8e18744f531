use crate::JobIndex;

/// One URL to fetch, numbered within its batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub index: JobIndex,
    pub url: String,
}

impl Job {
    /// Console/log prefix identifying this job's lines.
    pub fn prefix(&self) -> String {
        format!("[{}] ", self.index)
    }
}

/// Numbers URLs from 1 in input order.
pub fn number_jobs<I>(urls: I) -> Vec<Job>
where
    I: IntoIterator<Item = String>,
{
    urls.into_iter()
        .enumerate()
        .map(|(i, url)| Job { index: i + 1, url })
        .collect()
}
