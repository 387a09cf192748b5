//! Transaction scope guard.

use std::future::Future;

use pushrelay_core::result::AppResult;

use crate::context::PushContext;

use super::deferred::DeferredCalls;

/// Marks the lifetime of one (possibly nested) transaction.
///
/// Call [`commit`](Self::commit) after the database commit succeeded.
/// Dropping the scope without committing rolls it back. Rolling back a scope
/// also discards every scope still open inside it.
#[derive(Debug)]
#[must_use = "a scope dropped without commit rolls back"]
pub struct TransactionScope<'a> {
    calls: &'a DeferredCalls,
    level: usize,
    finished: bool,
}

impl<'a> TransactionScope<'a> {
    /// Open a scope on the context's deferred calls.
    pub fn begin(ctx: &'a PushContext) -> Self {
        let calls = ctx.deferred();
        let level = calls.begin();
        Self {
            calls,
            level,
            finished: false,
        }
    }

    /// Commit the scope, flushing deferred calls if it is the outermost one.
    pub async fn commit(mut self) -> AppResult<()> {
        self.finished = true;
        self.calls.commit_scope(self.level).await
    }

    /// Roll the scope back, discarding its deferred calls.
    pub fn rollback(mut self) {
        self.finished = true;
        self.calls.rollback_scope(self.level);
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.calls.rollback_scope(self.level);
        }
    }
}

/// Run `body` inside a transaction scope.
///
/// An `Ok` result commits (and, for the outermost scope, flushes deferred
/// calls before returning); an `Err` rolls back and is returned unchanged.
pub async fn in_transaction<F, T>(ctx: &PushContext, body: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    let scope = TransactionScope::begin(ctx);
    match body.await {
        Ok(value) => {
            scope.commit().await?;
            Ok(value)
        }
        Err(e) => {
            scope.rollback();
            Err(e)
        }
    }
}
