//! kuid: RFC 4122 unique identifier generation, validation, and
//! multi-encoding conversion.
//!
//! Identifiers are 16-byte values convertible to and from six textual
//! forms: canonical hex, URN, Base64 (standard and URL-safe), Base32
//! (standard and URL-safe), and ASCII 85. Time-based generation keeps
//! monotonic clock-sequence state and a hardware-derived node identity;
//! random and namespace-hashed generation are stateless.
//!
//! # Example
//!
//! ```
//! use kuid::UuidHandler;
//!
//! let handler = UuidHandler::global();
//! let id = handler.new_v4();
//! println!("{}", id); // canonical hex, e.g. "1716d9e5-d35f-4b86-..."
//!
//! let decoded = handler.decode("C4LN-TZOT-L5FY-NC44-TQRG-DYJL-R4").unwrap();
//! assert_eq!(decoded.hex(), "1716d9e5-d35f-4b86-8b9c-9c2261e12b8f");
//! ```

mod async_api;
mod clock;
mod codec;
mod node;
mod rng;
mod uuid;

pub use async_api::{async_new_v1, async_new_v4, async_v1_stream, async_v4_stream};
pub use clock::{ClockSequencer, ClockSource, Timestamp};
pub use codec::{Encoding, PAYLOAD_LEN, b64_to_url64, hyphenate, url64_to_b64};
pub use node::{Interface, NODE_ID_LEN, NodeIdentity};
pub use uuid::{Uuid, UuidConfig, UuidError, UuidHandler, Variant};
