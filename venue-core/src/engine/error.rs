use thiserror::Error;

/// EngineError covers violations of the book's own invariants: conditions
/// that should be unreachable given a correctly validated envelope, and
/// which the engine treats as fatal rather than logged-and-dropped.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("order {0} already resting in the book")]
    DuplicateOrderId(u32),

    #[error("order {0} references a price level that does not exist")]
    MissingPriceLevel(u32),

    #[error("crossed book detected: best bid {bid} >= best ask {ask}")]
    CrossedBook { bid: f64, ask: f64 },
}
