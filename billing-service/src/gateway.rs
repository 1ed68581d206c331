use crate::error::GatewayResult;
use crate::models::StartSubscription;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// The three operations of a recurring billing processor
///
/// Implementations never retry: a repeated `start` could open a second
/// remote subscription.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a subscription and return the gateway's id for it
    async fn start(&self, request: &StartSubscription) -> GatewayResult<String>;

    async fn change(&self, gateway_token: &str, amount: Decimal) -> GatewayResult<()>;

    async fn cancel(&self, gateway_token: &str) -> GatewayResult<()>;
}
