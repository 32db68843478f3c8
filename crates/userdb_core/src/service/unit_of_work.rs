//! Transaction runner shared by every controller.
//!
//! # Responsibility
//! - Open one transaction per public operation and always finish it.
//! - Log each outcome as a metadata-only event.
//!
//! # Invariants
//! - `Ok` from the work closure commits; `Err` rolls back.
//! - A failed rollback never hides the original error.

use super::error::{ServiceError, ServiceResult};
use crate::repo::store::{Transactional, UnitOfWork};
use log::{error, info, warn};
use std::time::Instant;

/// Runs `work` inside a fresh transaction from `uow`.
pub(crate) fn run<U, T, F>(uow: &U, operation: &'static str, work: F) -> ServiceResult<T>
where
    U: UnitOfWork,
    F: FnOnce(&U::Tx) -> ServiceResult<T>,
{
    let started_at = Instant::now();
    let tx = uow.begin().map_err(|err| {
        error!(
            "event=unit_of_work module=service status=error stage=begin operation={operation} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        );
        ServiceError::from(err)
    })?;

    let outcome = work(&tx);
    settle(tx, operation, started_at, outcome)
}

/// Commits or rolls back `tx` according to `outcome`.
pub(crate) fn settle<X, T>(
    tx: X,
    operation: &'static str,
    started_at: Instant,
    outcome: ServiceResult<T>,
) -> ServiceResult<T>
where
    X: Transactional,
{
    match outcome {
        Ok(value) => match tx.commit() {
            Ok(()) => {
                info!(
                    "event=unit_of_work module=service status=ok operation={operation} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event=unit_of_work module=service status=error stage=commit operation={operation} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        },
        Err(cause) => match tx.rollback() {
            Ok(()) => {
                warn!(
                    "event=unit_of_work module=service status=rollback operation={operation} duration_ms={} error_kind={:?}",
                    started_at.elapsed().as_millis(),
                    cause.kind()
                );
                Err(cause)
            }
            Err(rollback) => {
                error!(
                    "event=unit_of_work module=service status=error stage=rollback operation={operation} duration_ms={} error_kind={:?} rollback_error={rollback}",
                    started_at.elapsed().as_millis(),
                    cause.kind()
                );
                Err(ServiceError::RollbackFailed {
                    cause: Box::new(cause),
                    rollback,
                })
            }
        },
    }
}
