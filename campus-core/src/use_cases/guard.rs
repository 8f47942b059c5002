//! Authorization and validation steps shared by every use case

use crate::domain::Executor;
use crate::validation::Validate;

use super::error::{UseCaseError, UseCaseResult};

/// Deny with `Unauthorized` unless `allowed`
pub(crate) fn authorize(
    use_case: &'static str,
    executor: &Executor,
    allowed: bool,
) -> UseCaseResult<()> {
    if allowed {
        return Ok(());
    }
    tracing::warn!(
        use_case,
        executor_id = %executor.id,
        role = %executor.role,
        "authorization denied"
    );
    Err(UseCaseError::Unauthorized)
}

/// Reject with every failing field, or pass
pub(crate) fn validate(use_case: &'static str, input: &impl Validate) -> UseCaseResult<()> {
    let fields = input.validate();
    if fields.is_empty() {
        return Ok(());
    }
    tracing::debug!(use_case, failures = fields.len(), "input rejected");
    Err(UseCaseError::InputError { fields })
}
