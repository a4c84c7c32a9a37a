//! Start-up resolution of the order to follow.

use crate::engine::{SessionClient, TokenPrompt, Transport};
use crate::error::{TrackerError, TrackerResult};
use crate::model::{OrderIdentity, TerminalState, TrackingSnapshot};

#[derive(Debug, Clone)]
pub(crate) struct ResolvedOrder {
    pub identity: OrderIdentity,
    pub initial: TrackingSnapshot,
}

/// Pick the account's latest order and check it is still in flight.
///
/// Upstream lists orders newest first, so entry 0 is treated as the latest.
/// Nothing in the payload confirms that ordering.
pub(crate) async fn resolve_latest_order<T, P>(
    client: &mut SessionClient<T, P>,
) -> TrackerResult<ResolvedOrder>
where
    T: Transport,
    P: TokenPrompt,
{
    let orders = client.fetch_orders().await?;
    let latest = orders.first().ok_or(TrackerError::NoActiveOrder)?;
    let identity = latest.identity();
    tracing::info!(
        event = "orders.latest",
        order_id = identity.order_id,
        shared = latest.shared_order,
        total = orders.len(),
    );

    let initial = client.fetch_tracking(&identity).await?;
    if initial.terminal_state() == TerminalState::Delivered {
        return Err(TrackerError::NoActiveOrder);
    }
    Ok(ResolvedOrder { identity, initial })
}
