//! Job scheduler: delayed and repeating work for an agent.
//!
//! Time is passed in by the host; the scheduler never reads the clock.

use std::fmt;
use std::time::{Duration, Instant};

/// What a job does when it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    /// Send a message that was already encoded.
    Send,
    Hello,
    EnbSetup,
    CellSetup,
    UeReport,
    UeMeasure,
    MacReport,
    Handover,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How many times a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    /// Runs once more for each remaining credit.
    Times(u32),
    Forever,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: u32,
    pub job_type: JobType,
    /// Raw request the job answers, or the message to send.
    pub args: Vec<u8>,
    pub repeat: Repeat,
    /// Delay between runs.
    pub elapse: Duration,
    issued: Option<Instant>,
}

impl Job {
    pub fn new(id: u32, job_type: JobType, elapse: Duration, repeat: Repeat, args: Vec<u8>) -> Self {
        Self {
            id,
            job_type,
            args,
            repeat,
            elapse,
            issued: None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.issued {
            Some(issued) => now.saturating_duration_since(issued) >= self.elapse,
            None => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedError {
    #[error("scheduler is stopped")]
    Stopped,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    jobs: Vec<Job>,
    stopped: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a job to run once `elapse` has passed since `now`.
    pub fn add(&mut self, mut job: Job, now: Instant) -> Result<(), SchedError> {
        if self.stopped {
            return Err(SchedError::Stopped);
        }
        tracing::debug!(job = %job.job_type, id = job.id, elapse_ms = job.elapse.as_millis() as u64, "scheduled job");
        job.issued = Some(now);
        self.jobs.push(job);
        Ok(())
    }

    /// Queue a job whose first run is due immediately; later runs follow `elapse`.
    pub fn add_due(&mut self, mut job: Job) -> Result<(), SchedError> {
        if self.stopped {
            return Err(SchedError::Stopped);
        }
        job.issued = None;
        self.jobs.push(job);
        Ok(())
    }

    pub fn find(&self, id: u32, job_type: JobType) -> Option<&Job> {
        self.jobs
            .iter()
            .find(|j| j.id == id && j.job_type == job_type)
    }

    /// Remove every job matching `id` and `job_type`. Returns how many were removed.
    pub fn remove(&mut self, id: u32, job_type: JobType) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|j| !(j.id == id && j.job_type == job_type));
        before - self.jobs.len()
    }

    /// Take the jobs due at `now`, oldest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Job> {
        let (due, pending): (Vec<Job>, Vec<Job>) =
            self.jobs.drain(..).partition(|j| j.is_due(now));
        self.jobs = pending;
        due
    }

    /// Put a job that just ran back in the queue if it has runs left.
    /// Returns whether it was queued again.
    pub fn requeue(&mut self, mut job: Job, now: Instant) -> bool {
        if self.stopped {
            return false;
        }
        job.repeat = match job.repeat {
            Repeat::Once => return false,
            Repeat::Times(n) if n <= 1 => Repeat::Once,
            Repeat::Times(n) => Repeat::Times(n - 1),
            Repeat::Forever => Repeat::Forever,
        };
        job.issued = Some(now);
        self.jobs.push(job);
        true
    }

    /// Drop every queued job.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Refuse new jobs from now on and drop the queued ones.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.jobs.clear();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
