use std::future::Future;

use crate::domain::Executor;
use crate::error::Result;

use super::error::UseCaseResult;

/// A single application operation performed on behalf of an [`Executor`]
///
/// Every implementation runs the same steps in the same order and stops at
/// the first failure:
///
/// 1. authorization (fetching the target first when ownership matters;
///    a missing target is `NotFound`)
/// 2. validation, reporting every failing field
/// 3. the repository operation
/// 4. translation of the storage outcome
///
/// The outer `Result` carries unexpected failures, the inner one the
/// business outcome.
pub trait UseCase: Send + Sync {
    /// Request payload
    type Input: Send;
    /// Success value
    type Output;

    /// Run the use case
    fn execute(
        &self,
        executor: &Executor,
        input: Self::Input,
    ) -> impl Future<Output = Result<UseCaseResult<Self::Output>>> + Send;
}
