pub mod telegram;

use async_trait::async_trait;

use crate::errors::CycleError;

/// A sink that can deliver a plain-text message to the operator.
///
/// Implementations report failure as [`CycleError::DeliveryFailure`] and
/// leave the decision about what that means for the cycle to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), CycleError>;
}
