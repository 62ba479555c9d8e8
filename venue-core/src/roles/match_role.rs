use crate::engine::sink::EventSink;
use crate::prelude::*;
use crate::transport;
use crate::wire::Envelope;
use anyhow::Context;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use zmq::Socket;

const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(1);

/// ZmqEventSink turns matching events into wire envelopes and pushes them
/// onto the event socket, publishing a rate-limited snapshot after each
/// book change.
struct ZmqEventSink {
    events: Socket,
    snapshots: Socket,
    last_publish_at: std::time::Instant,
}

impl ZmqEventSink {
    fn new(events: Socket, snapshots: Socket) -> Self {
        Self {
            events,
            snapshots,
            // Ensures the very first processed order is eligible to publish.
            last_publish_at: std::time::Instant::now() - SNAPSHOT_INTERVAL,
        }
    }

    fn send_event(&self, envelope: Envelope) {
        let wire = envelope.encode();
        if let Err(err) = self.events.send(&wire, 0) {
            tracing::warn!(%err, "failed to send event, dropping");
        }
    }
}

impl EventSink for ZmqEventSink {
    fn unmatched(&mut self, order: &Order) {
        self.send_event(Envelope::UnmatchedOrder(*order));
    }

    fn traded(&mut self, trade: &TradeRecord, buy_order: &Order, sell_order: &Order) {
        self.send_event(Envelope::Trade {
            buy_order: *buy_order,
            sell_order: *sell_order,
            trade: *trade,
        });
    }

    fn canceled(&mut self, order: &Order) {
        self.send_event(Envelope::UnmatchedOrder(*order));
    }

    fn book_changed(&mut self, book: &DefaultOrderBook) {
        let now = std::time::Instant::now();
        if now.duration_since(self.last_publish_at) < SNAPSHOT_INTERVAL {
            return;
        }
        let rendered = crate::engine::snapshot::render_snapshot(book);
        // Never block event emission on a slow/absent subscriber.
        match self.snapshots.send(&rendered, zmq::DONTWAIT) {
            Ok(()) => self.last_publish_at = now,
            Err(zmq::Error::EAGAIN) => {
                tracing::debug!("snapshot publish would block, dropped");
            }
            Err(err) => tracing::warn!(%err, "failed to publish snapshot"),
        }
    }
}

/// Spawns a background thread that waits for Ctrl+C and flips `running` to
/// false. A tiny current-thread runtime hosts the wait since the engine's
/// own loop is synchronous and has no runtime of its own; `shutdown`'s
/// effect is only observed between messages, never by interrupting a
/// blocking recv, matching the "no per-message timeout" rule.
fn spawn_shutdown_watcher(running: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(err) => {
                tracing::warn!(%err, "failed to start shutdown watcher runtime");
                return;
            }
        };
        if rt.block_on(tokio::signal::ctrl_c()).is_ok() {
            tracing::info!("shutdown requested, will exit after the current message");
            running.store(false, Ordering::SeqCst);
        }
    });
}

/// Runs the matching engine's synchronous receive loop: a plain OS thread
/// blocking on socket receive, with no use for an async runtime.
pub fn run() -> anyhow::Result<()> {
    let ctx = zmq::Context::new();
    let orders = transport::bind_order_pull(&ctx)?;
    let events = transport::bind_event_push(&ctx)?;
    let snapshots = transport::bind_snapshot_pub(&ctx)?;

    let sink = ZmqEventSink::new(events, snapshots);
    let mut engine = MatchingEngine::new(sink);

    let running = Arc::new(AtomicBool::new(true));
    spawn_shutdown_watcher(running.clone());

    tracing::info!("matching engine listening on tcp://*:12345");
    while running.load(Ordering::SeqCst) {
        let msg = match orders.recv_bytes(0) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(%err, "order socket recv failed");
                continue;
            }
        };

        let envelope = match Envelope::decode(&msg) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(%err, "dropping malformed envelope");
                continue;
            }
        };

        let result = match envelope {
            Envelope::Order(order) => engine.process_order(order),
            Envelope::Cancel { order_id, side } => {
                engine.process_cancel(order_id, side);
                Ok(())
            }
            // Only producers emit ORDER/CANCEL on this channel; any other
            // decoded type reaching here is a misconfigured upstream.
            other => {
                tracing::warn!(?other, "unexpected envelope type on order channel");
                Ok(())
            }
        };

        if let Err(err) = result {
            tracing::error!(%err, "engine invariant violated, exiting for supervisor restart");
            return Err(err).context("fatal engine error");
        }
    }

    tracing::info!("matching engine shut down cleanly");
    Ok(())
}
