//! Calls held back until the outermost transaction commits.
//!
//! Each open transaction scope owns one level of queued calls. Committing an
//! inner scope hands its calls to the enclosing level; committing the
//! outermost scope runs everything in enqueue order. Rolling back any scope
//! drops the calls queued at that level.

use std::future::Future;
use std::sync::Mutex;

use futures::future::BoxFuture;
use tracing::{debug, error, warn};

use pushrelay_core::error::AppError;
use pushrelay_core::result::AppResult;

/// One queued call.
struct DeferredCall {
    label: String,
    future: BoxFuture<'static, AppResult<()>>,
}

/// Queue of calls deferred to transaction commit.
#[derive(Default)]
pub struct DeferredCalls {
    /// One entry per open scope, outermost first.
    levels: Mutex<Vec<Vec<DeferredCall>>>,
}

impl std::fmt::Debug for DeferredCalls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let levels = self.levels.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("DeferredCalls")
            .field("depth", &levels.len())
            .field("queued", &levels.iter().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl DeferredCalls {
    /// Create an empty queue with no open scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a transaction scope is open.
    pub fn is_active(&self) -> bool {
        self.depth() > 0
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.levels.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Number of calls waiting across all levels.
    pub fn pending(&self) -> usize {
        let levels = self.levels.lock().unwrap_or_else(|e| e.into_inner());
        levels.iter().map(Vec::len).sum()
    }

    /// Open a scope and return its level, `0` for the outermost.
    pub fn begin(&self) -> usize {
        let mut levels = self.levels.lock().unwrap_or_else(|e| e.into_inner());
        let level = levels.len();
        levels.push(Vec::new());
        if level == 0 {
            debug!("BEGIN TRANSACTION");
        }
        level
    }

    /// Queue a call on the innermost scope.
    ///
    /// Fails if no scope is open; use [`DeferredCalls::call`] to run
    /// immediately in that case.
    pub fn enqueue<F>(&self, label: impl Into<String>, future: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<()>> + Send + 'static,
    {
        let mut levels = self.levels.lock().unwrap_or_else(|e| e.into_inner());
        let level = levels
            .last_mut()
            .ok_or_else(|| AppError::internal("No transaction scope is open"))?;
        level.push(DeferredCall {
            label: label.into(),
            future: Box::pin(future),
        });
        Ok(())
    }

    /// Run `future` after commit, or right away when no scope is open.
    ///
    /// Returns `true` when the call was queued.
    pub async fn call<F>(&self, label: impl Into<String>, future: F) -> AppResult<bool>
    where
        F: Future<Output = AppResult<()>> + Send + 'static,
    {
        if self.is_active() {
            self.enqueue(label, future)?;
            return Ok(true);
        }
        future.await?;
        Ok(false)
    }

    /// Close the innermost scope successfully.
    pub async fn commit(&self) -> AppResult<()> {
        let level = self
            .depth()
            .checked_sub(1)
            .ok_or_else(|| AppError::internal("Commit without an open transaction scope"))?;
        self.commit_scope(level).await
    }

    /// Close the scope opened at `level` successfully.
    ///
    /// When it was the outermost scope, every queued call runs in order.
    /// A failing call does not stop the others; the first failure is
    /// returned once all have been attempted.
    ///
    /// The scope must be the innermost open one. Committing a scope that
    /// still has inner scopes open rolls all of them back and fails.
    /// Committing a scope already discarded by an enclosing rollback fails.
    pub async fn commit_scope(&self, level: usize) -> AppResult<()> {
        let calls = {
            let mut levels = self.levels.lock().unwrap_or_else(|e| e.into_inner());
            if level >= levels.len() {
                return Err(AppError::internal(
                    "Transaction scope was already rolled back",
                ));
            }
            if level + 1 != levels.len() {
                let discarded = discard_from(&mut levels, level);
                warn!(level, discarded, "Transaction scope committed with inner scopes open");
                return Err(AppError::internal(
                    "Transaction scope committed before its inner scopes",
                ));
            }

            let Some(calls) = levels.pop() else {
                return Err(AppError::internal("Commit without an open transaction scope"));
            };
            match levels.last_mut() {
                Some(parent) => {
                    parent.extend(calls);
                    return Ok(());
                }
                None => calls,
            }
        };

        debug!(calls = calls.len(), "COMMIT TRANSACTION");
        flush(calls).await
    }

    /// Close the innermost scope unsuccessfully, dropping its calls.
    ///
    /// Returns how many calls were discarded.
    pub fn rollback(&self) -> usize {
        let mut levels = self.levels.lock().unwrap_or_else(|e| e.into_inner());
        let Some(level) = levels.len().checked_sub(1) else {
            warn!("Rollback without an open transaction scope");
            return 0;
        };
        discard_from(&mut levels, level)
    }

    /// Close the scope opened at `level` and every scope nested in it,
    /// dropping their calls.
    ///
    /// Returns how many calls were discarded. A scope already closed by an
    /// enclosing rollback discards nothing.
    pub fn rollback_scope(&self, level: usize) -> usize {
        let mut levels = self.levels.lock().unwrap_or_else(|e| e.into_inner());
        discard_from(&mut levels, level)
    }
}

fn discard_from(levels: &mut Vec<Vec<DeferredCall>>, level: usize) -> usize {
    if level >= levels.len() {
        return 0;
    }
    let discarded: usize = levels.drain(level..).map(|calls| calls.len()).sum();
    if level == 0 {
        debug!(discarded, "ROLLBACK TRANSACTION");
    }
    discarded
}

async fn flush(calls: Vec<DeferredCall>) -> AppResult<()> {
    let total = calls.len();
    let mut failures: Vec<AppError> = Vec::new();

    for call in calls {
        if let Err(e) = call.future.await {
            error!(call = %call.label, error = %e, "Deferred call failed");
            failures.push(e);
        }
    }

    let failed = failures.len();
    let mut failures = failures.into_iter();
    match failures.next() {
        None => Ok(()),
        Some(first) if failed == 1 => Err(first),
        Some(first) => Err(AppError::with_source(
            first.kind,
            format!("{failed} of {total} deferred calls failed"),
            first,
        )),
    }
}
