//! # In-memory reference transport for tests and demos.
//!
//! [`MemoryOperator`] holds an unbounded delivery queue fed by
//! [`MemoryOperator::push`] and records every settle action for later
//! inspection. No wire, no authentication, single connection.
//!
//! Not intended for production use - implement [`Operator`] /
//! [`Connection`] against a real bus client instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::ConsumerConfig;
use crate::error::ConsumerError;
use crate::task::TaskDelivery;

use super::{AckAction, Connection, Delivery, Operator};

/// In-memory operator: push deliveries in, read settles out.
pub struct MemoryOperator {
    tx: mpsc::UnboundedSender<Delivery>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<Delivery>>>,
    settled: Arc<Mutex<Vec<(u64, AckAction)>>>,
    next_tag: AtomicU64,
    closed: CancellationToken,
}

impl MemoryOperator {
    /// Creates an empty operator.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            settled: Arc::new(Mutex::new(Vec::new())),
            next_tag: AtomicU64::new(1),
            closed: CancellationToken::new(),
        }
    }

    /// Creates an operator pre-loaded with `tasks` in delivery order.
    pub fn with_tasks(tasks: impl IntoIterator<Item = TaskDelivery>) -> Self {
        let op = Self::new();
        for task in tasks {
            op.push(task);
        }
        op
    }

    /// Enqueues a task for delivery; returns its tag.
    pub fn push(&self, task: TaskDelivery) -> u64 {
        let tag = self.next_tag.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(Delivery { tag, task });
        tag
    }

    /// Snapshot of recorded settle actions, in settle order.
    pub fn settled(&self) -> Vec<(u64, AckAction)> {
        self.settled.lock().expect("settled lock").clone()
    }

    /// True once the connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Simulates a connection drop: pending and future `recv` calls on
    /// the connection return `None`.
    pub fn disconnect(&self) {
        self.closed.cancel();
    }
}

impl Default for MemoryOperator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Operator for MemoryOperator {
    async fn connect(&self, _cfg: &ConsumerConfig) -> Result<Arc<dyn Connection>, ConsumerError> {
        let rx = self
            .rx
            .lock()
            .expect("receiver lock")
            .take()
            .ok_or_else(|| ConsumerError::Connect {
                reason: "memory operator supports a single connection".to_string(),
            })?;

        Ok(Arc::new(MemoryConnection {
            rx: tokio::sync::Mutex::new(rx),
            settled: Arc::clone(&self.settled),
            closed: self.closed.clone(),
        }))
    }
}

/// The single connection produced by [`MemoryOperator::connect`].
pub struct MemoryConnection {
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Delivery>>,
    settled: Arc<Mutex<Vec<(u64, AckAction)>>>,
    closed: CancellationToken,
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn recv(&self) -> Option<Delivery> {
        if self.closed.is_cancelled() {
            return None;
        }
        let mut rx = self.rx.lock().await;
        tokio::select! {
            _ = self.closed.cancelled() => None,
            msg = rx.recv() => msg,
        }
    }

    async fn settle(&self, tag: u64, action: AckAction) -> Result<(), ConsumerError> {
        self.settled.lock().expect("settled lock").push((tag, action));
        Ok(())
    }

    async fn close(&self) -> Result<(), ConsumerError> {
        self.closed.cancel();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ServiceIdentity;
    use serde_json::{Value, json};

    fn task(n: u64) -> TaskDelivery {
        TaskDelivery {
            input: json!({"n": n}),
            meta: Value::Null,
            tenant: "t".to_string(),
            results: vec![],
            service: ServiceIdentity {
                id: "svc".to_string(),
                alias: None,
                name: "demo".to_string(),
                version: "1.0.0".to_string(),
                configuration: None,
            },
        }
    }

    fn cfg() -> ConsumerConfig {
        ConsumerConfig::new("memory://", "1.0.0")
    }

    #[tokio::test]
    async fn delivers_in_push_order_with_monotonic_tags() {
        let op = MemoryOperator::with_tasks([task(1), task(2)]);
        let conn = op.connect(&cfg()).await.unwrap();

        let a = conn.recv().await.unwrap();
        let b = conn.recv().await.unwrap();
        assert_eq!(a.tag, 1);
        assert_eq!(b.tag, 2);
        assert_eq!(a.task.input, json!({"n": 1}));
    }

    #[tokio::test]
    async fn second_connect_is_rejected() {
        let op = MemoryOperator::new();
        let _conn = op.connect(&cfg()).await.unwrap();
        assert!(matches!(
            op.connect(&cfg()).await,
            Err(ConsumerError::Connect { .. })
        ));
    }

    #[tokio::test]
    async fn recv_after_close_returns_none() {
        let op = MemoryOperator::with_tasks([task(1)]);
        let conn = op.connect(&cfg()).await.unwrap();
        conn.close().await.unwrap();
        assert!(conn.recv().await.is_none());
        assert!(op.is_closed());
    }

    #[tokio::test]
    async fn settles_are_recorded_in_order() {
        let op = MemoryOperator::with_tasks([task(1)]);
        let conn = op.connect(&cfg()).await.unwrap();
        let d = conn.recv().await.unwrap();
        conn.settle(d.tag, AckAction::Ack { data: json!(1) })
            .await
            .unwrap();
        assert_eq!(op.settled(), vec![(1, AckAction::Ack { data: json!(1) })]);
    }
}
