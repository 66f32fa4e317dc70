//! Round-robin model rotation.
//!
//! Each provider owns one [`ModelRotation`]. The cursor advances on every
//! dispatch, successful or not, and is shared by every concurrent request
//! that goes through the same provider. Interleaving between concurrent
//! callers only skews load distribution, so a relaxed atomic is enough.

use std::sync::atomic::{AtomicUsize, Ordering};

use policycheck_common::PolicyError;

#[derive(Debug)]
pub struct ModelRotation {
    models: Vec<String>,
    cursor: AtomicUsize,
}

impl ModelRotation {
    pub fn new<I, S>(models: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models: Vec<String> = models.into_iter().map(Into::into).collect();
        if models.is_empty() {
            return Err(PolicyError::Config("model rotation needs at least one model".into()));
        }
        Ok(Self {
            models,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Model at `cursor mod len`, then advance the cursor.
    pub fn next(&self) -> &str {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        &self.models[i % self.models.len()]
    }

    /// Number of models handed out so far (wrapping).
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}
