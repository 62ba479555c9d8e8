use crate::config::DbConfig;
use crate::store::Store;
use crate::transport;
use crate::wire::Envelope;
use anyhow::Context;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use zmq::Socket;

/// Backoff between reconnect attempts to the engine's event socket.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Runs the persistence consumer: a dedicated OS thread blocks on the
/// engine's event PULL socket and forwards decoded envelopes over a bounded
/// channel to this async task, which applies them to the store. The two
/// halves share no state but the channel; book state is never shared
/// across the bridge.
pub async fn run(db_config: DbConfig, event_source_addr: &str) -> anyhow::Result<()> {
    let store = Store::connect(&db_config).await?;

    let (tx, mut rx) = mpsc::channel::<Envelope>(1024);
    let addr = event_source_addr.to_string();
    std::thread::spawn(move || receive_loop(&addr, tx));

    tracing::info!(addr = event_source_addr, "persistence consumer connected");
    while let Some(envelope) = rx.recv().await {
        apply_envelope(&store, envelope).await?;
    }
    Ok(())
}

/// Connects to the engine's event socket and forwards every decoded
/// envelope to `tx`, reconnecting with a fixed backoff on transport loss.
/// Runs on its own thread because the zmq socket only offers a blocking
/// receive API.
fn receive_loop(addr: &str, tx: mpsc::Sender<Envelope>) {
    let ctx = zmq::Context::new();
    loop {
        let socket = match transport::connect_event_pull(&ctx, addr) {
            Ok(socket) => socket,
            Err(err) => {
                tracing::error!(%err, "failed to connect to engine event socket, retrying");
                std::thread::sleep(RECONNECT_BACKOFF);
                continue;
            }
        };
        match drain(&socket, &tx) {
            Ok(()) => return, // receiver dropped: shutting down
            Err(err) => {
                tracing::warn!(%err, "event socket lost, reconnecting after backoff");
                std::thread::sleep(RECONNECT_BACKOFF);
            }
        }
    }
}

fn drain(socket: &Socket, tx: &mpsc::Sender<Envelope>) -> anyhow::Result<()> {
    loop {
        let bytes = socket.recv_bytes(0).context("receiving event envelope")?;
        match Envelope::decode(&bytes) {
            Ok(envelope) => {
                if tx.blocking_send(envelope).is_err() {
                    return Ok(());
                }
            }
            Err(err) => tracing::warn!(%err, "dropping malformed event envelope"),
        }
    }
}

/// Applies one event to the store. Trades commit transactionally; status
/// updates for unmatched/canceled orders apply outside a transaction.
/// At-least-once delivery means the same event may arrive twice after a
/// reconnect; idempotency is the store's job (unique key on the trade
/// insert, status-column overwrite on the update).
async fn apply_envelope(store: &Store, envelope: Envelope) -> anyhow::Result<()> {
    match envelope {
        Envelope::Trade {
            buy_order,
            sell_order,
            trade,
        } => {
            retry_once(|| store.apply_trade(&trade, &buy_order, &sell_order)).await?;
        }
        Envelope::UnmatchedOrder(order) => {
            retry_once(|| store.apply_status_update(&order)).await?;
        }
        other => {
            tracing::warn!(?other, "unexpected envelope type on event channel");
        }
    }
    Ok(())
}

/// Retries a failed database statement exactly once after a transient
/// failure; the pool itself handles reopening dead connections.
async fn retry_once<F, Fut>(f: F) -> anyhow::Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    match f().await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::warn!(%err, "database statement failed, retrying once");
            f().await
        }
    }
}
