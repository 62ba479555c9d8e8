use anyhow::Context;
use zmq::{Context as ZmqContext, Socket};

/// Binds the PULL socket that receives `ORDER`/`CANCEL` envelopes from the
/// order producer.
pub fn bind_order_pull(ctx: &ZmqContext) -> anyhow::Result<Socket> {
    let socket = ctx.socket(zmq::PULL).context("creating order PULL socket")?;
    socket
        .bind("tcp://*:12345")
        .context("binding order PULL socket to tcp://*:12345")?;
    Ok(socket)
}

/// Connects the PUSH socket the order producer uses to send envelopes to
/// the engine.
pub fn connect_order_push(ctx: &ZmqContext, addr: &str) -> anyhow::Result<Socket> {
    let socket = ctx.socket(zmq::PUSH).context("creating order PUSH socket")?;
    socket
        .connect(addr)
        .with_context(|| format!("connecting order PUSH socket to {addr}"))?;
    Ok(socket)
}

/// Binds the PUSH socket the engine uses to emit `TRADE`/`UNMATCHED_ORDER`
/// events to the persistence consumer.
pub fn bind_event_push(ctx: &ZmqContext) -> anyhow::Result<Socket> {
    let socket = ctx.socket(zmq::PUSH).context("creating event PUSH socket")?;
    socket
        .bind("tcp://*:12346")
        .context("binding event PUSH socket to tcp://*:12346")?;
    Ok(socket)
}

/// Connects the PULL socket the persistence consumer uses to receive
/// events from the engine.
pub fn connect_event_pull(ctx: &ZmqContext, addr: &str) -> anyhow::Result<Socket> {
    let socket = ctx.socket(zmq::PULL).context("creating event PULL socket")?;
    socket
        .connect(addr)
        .with_context(|| format!("connecting event PULL socket to {addr}"))?;
    Ok(socket)
}

/// Binds the PUB socket the engine uses to publish book snapshots.
pub fn bind_snapshot_pub(ctx: &ZmqContext) -> anyhow::Result<Socket> {
    let socket = ctx.socket(zmq::PUB).context("creating snapshot PUB socket")?;
    socket
        .bind("tcp://*:12347")
        .context("binding snapshot PUB socket to tcp://*:12347")?;
    Ok(socket)
}

/// Connects the SUB socket market-data fanout uses to receive snapshots,
/// subscribed to the empty topic (every message).
pub fn connect_snapshot_sub(ctx: &ZmqContext, addr: &str) -> anyhow::Result<Socket> {
    let socket = ctx.socket(zmq::SUB).context("creating snapshot SUB socket")?;
    socket
        .connect(addr)
        .with_context(|| format!("connecting snapshot SUB socket to {addr}"))?;
    socket.set_subscribe(b"").context("subscribing to empty topic")?;
    Ok(socket)
}
