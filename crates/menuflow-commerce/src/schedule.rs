//! Cancellable polling.
//!
//! A poller runs a [`PollTask`] on a fixed period and publishes each result
//! on a `watch` channel. It stops when its [`PollHandle`] is stopped or
//! dropped, when the task reports a final value, or when every receiver is
//! gone. Pollers must be spawned from inside a tokio runtime.

use crate::availability::{AvailabilityCalculator, TenantAvailability};
use crate::checkout::{ApiFailure, OrderApi, OrderStatus};
use crate::ids::OrderId;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Source of the current tenant-local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// Publish and keep polling.
    Update(T),
    /// Publish and stop.
    Final(T),
    /// Nothing new this round.
    Skip,
}

/// Work run on every tick.
#[async_trait]
pub trait PollTask: Send + 'static {
    type Output: Send + Sync + 'static;

    async fn poll(&mut self) -> PollOutcome<Self::Output>;
}

/// Stop handle for a running poller. Dropping it stops the poller too.
#[derive(Debug)]
pub struct PollHandle {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Ask the poller to stop after its current round.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }

    /// Wait for the poller to end on its own or after [`stop`](Self::stop).
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "poller task failed");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}

/// Run `task` every `period`, starting immediately.
///
/// The receiver holds `None` until the first value is published.
pub fn spawn_polling<P>(period: Duration, mut task: P) -> (PollHandle, watch::Receiver<Option<P::Output>>)
where
    P: PollTask,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let (value_tx, value_rx) = watch::channel(None);
    // tokio rejects a zero period.
    let period = period.max(Duration::from_millis(1));

    let join = tokio::spawn(async move {
        tracing::debug!(period_ms = period.as_millis() as u64, "poller started");
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match task.poll().await {
                        PollOutcome::Update(value) => {
                            if value_tx.send(Some(value)).is_err() {
                                break;
                            }
                        }
                        PollOutcome::Final(value) => {
                            let _ = value_tx.send(Some(value));
                            break;
                        }
                        PollOutcome::Skip => {}
                    }
                }
            }
        }
        tracing::debug!("poller stopped");
    });

    (
        PollHandle {
            stop: stop_tx,
            task: Some(join),
        },
        value_rx,
    )
}

/// Where fresh tenant availability comes from, typically the tenant API.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn fetch(&self) -> Result<TenantAvailability, ApiFailure>;
}

/// Published by [`watch_availability`].
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilitySnapshot {
    pub at: NaiveDateTime,
    pub is_open: bool,
    pub slots: Vec<NaiveDateTime>,
}

struct AvailabilityPoll {
    source: Arc<dyn AvailabilitySource>,
    calculator: AvailabilityCalculator,
    clock: Arc<dyn Clock>,
    last: Option<TenantAvailability>,
}

#[async_trait]
impl PollTask for AvailabilityPoll {
    type Output = AvailabilitySnapshot;

    async fn poll(&mut self) -> PollOutcome<AvailabilitySnapshot> {
        match self.source.fetch().await {
            Ok(availability) => self.last = Some(availability),
            // Keep evaluating the last known data; its heartbeat goes stale on its own.
            Err(e) => tracing::warn!(error = %e, "availability refresh failed"),
        }
        let Some(availability) = &self.last else {
            return PollOutcome::Skip;
        };
        let now = self.clock.now();
        PollOutcome::Update(AvailabilitySnapshot {
            at: now,
            is_open: self.calculator.is_open_now(availability, now),
            slots: self.calculator.bookable_slots(availability, now),
        })
    }
}

/// Re-evaluate open status and bookable slots every `period`.
pub fn watch_availability(
    source: Arc<dyn AvailabilitySource>,
    calculator: AvailabilityCalculator,
    clock: Arc<dyn Clock>,
    period: Duration,
) -> (PollHandle, watch::Receiver<Option<AvailabilitySnapshot>>) {
    spawn_polling(
        period,
        AvailabilityPoll {
            source,
            calculator,
            clock,
            last: None,
        },
    )
}

struct OrderStatusPoll {
    api: Arc<dyn OrderApi>,
    order_id: OrderId,
}

#[async_trait]
impl PollTask for OrderStatusPoll {
    type Output = OrderStatus;

    async fn poll(&mut self) -> PollOutcome<OrderStatus> {
        match self.api.order_status(&self.order_id).await {
            Ok(status) if status.is_terminal() => {
                tracing::info!(order_id = %self.order_id, status = status.as_str(), "order reached final status");
                PollOutcome::Final(status)
            }
            Ok(status) => PollOutcome::Update(status),
            Err(e) => {
                tracing::warn!(order_id = %self.order_id, error = %e, "order status refresh failed");
                PollOutcome::Skip
            }
        }
    }
}

/// Follow an order's status until it is delivered, cancelled or rejected.
pub fn watch_order_status(
    api: Arc<dyn OrderApi>,
    order_id: OrderId,
    period: Duration,
) -> (PollHandle, watch::Receiver<Option<OrderStatus>>) {
    spawn_polling(period, OrderStatusPoll { api, order_id })
}
