//! Async convenience API built on top of the process-wide handler.

use crate::uuid::{Uuid, UuidError, UuidHandler};

/// One random identifier in async contexts.
pub async fn async_new_v4() -> Uuid {
    UuidHandler::global().new_v4()
}

/// One time-based identifier in async contexts.
pub async fn async_new_v1() -> Result<Uuid, UuidError> {
    UuidHandler::global().new_v1()
}

/// A finite batch of random identifiers.
pub async fn async_v4_stream(count: usize) -> Vec<Uuid> {
    let handler = UuidHandler::global();
    (0..count).map(|_| handler.new_v4()).collect()
}

/// A finite batch of time-based identifiers.
pub async fn async_v1_stream(count: usize) -> Result<Vec<Uuid>, UuidError> {
    let handler = UuidHandler::global();
    (0..count).map(|_| handler.new_v1()).collect()
}
