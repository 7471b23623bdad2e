//! RFC 4122 unique identifiers: the [`Uuid`] value type plus the
//! configuration-carrying [`UuidHandler`] that generates, decodes, and
//! validates them.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use md5::{Digest, Md5};
use once_cell::sync::{Lazy, OnceCell};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::Sha1;
use thiserror::Error;

use crate::clock::{ClockSequencer, Timestamp};
use crate::codec::{self, Encoding, PAYLOAD_LEN};
use crate::node::{NODE_ID_LEN, NodeIdentity};
use crate::rng;

const VERSION_TIME: u8 = 1;
const VERSION_MD5: u8 = 3;
const VERSION_RANDOM: u8 = 4;
const VERSION_SHA1: u8 = 5;

/// Errors raised while decoding, validating, or configuring identifiers.
#[derive(Error, Debug)]
pub enum UuidError {
    #[error("input length {0} matches no known UUID encoding")]
    UnrecognizedEncoding(usize),
    #[error("{encoding} string of UUID has wrong length {len}")]
    WrongLength { encoding: Encoding, len: usize },
    #[error("malformed {encoding} string of UUID: {detail}")]
    Malformed {
        encoding: Encoding,
        detail: &'static str,
    },
    #[error("UUID version {0} is outside the configured valid range")]
    InvalidIdentifier(u8),
    #[error("nil UUID set")]
    NilIdentifier,
    #[error("no network interface named {0:?}")]
    NodeResolution(String),
    #[error("node id needs at least 6 bytes, got {0}")]
    InvalidNodeId(usize),
    #[error("wall clock is unreadable")]
    ClockFailure,
}

/// Layout family encoded in the top bits of byte 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Invalid,
    Rfc4122,
    ReservedNcs,
    Microsoft,
    Future,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Invalid => "Invalid",
            Self::Rfc4122 => "RFC4122",
            Self::ReservedNcs => "Reserved",
            Self::Microsoft => "Microsoft",
            Self::Future => "Future",
        })
    }
}

/// Well-known namespaces for version 3 and 5 generation.
static NAMESPACES: Lazy<HashMap<&'static str, Uuid>> = Lazy::new(|| {
    let mut ns = HashMap::new();
    for (name, hex) in [
        ("DNS", "6ba7b810-9dad-11d1-80b4-00c04fd430c8"),
        ("URL", "6ba7b811-9dad-11d1-80b4-00c04fd430c8"),
        ("OID", "6ba7b812-9dad-11d1-80b4-00c04fd430c8"),
        ("X500", "6ba7b814-9dad-11d1-80b4-00c04fd430c8"),
        ("NIL", "00000000-0000-0000-0000-000000000000"),
    ] {
        ns.insert(name, Uuid::from_bytes(codec::decode_hex(hex).unwrap()));
    }
    ns
});

static GLOBAL: Lazy<UuidHandler> = Lazy::new(UuidHandler::default);

/// An immutable 16-byte unique identifier with memoized string forms.
///
/// `Uuid::default()` is the distinct "unset" value: it carries no payload,
/// is never valid, and every encoder renders it as the empty string.
#[derive(Clone, Default)]
pub struct Uuid {
    bytes: Option<[u8; PAYLOAD_LEN]>,
    hex: OnceCell<String>,
    urn: OnceCell<String>,
    b64: OnceCell<String>,
    url64: OnceCell<String>,
    b32: OnceCell<String>,
    url32: OnceCell<String>,
    a85: OnceCell<String>,
}

impl Uuid {
    pub(crate) fn from_bytes(bytes: [u8; PAYLOAD_LEN]) -> Uuid {
        Uuid {
            bytes: Some(bytes),
            ..Uuid::default()
        }
    }

    /// The all-zero nil identifier.
    pub fn nil() -> Uuid {
        Uuid::from_bytes([0; PAYLOAD_LEN])
    }

    /// True when a payload is present, even the nil one.
    pub fn is_set(&self) -> bool {
        self.bytes.is_some()
    }

    /// True when the payload is present and all zero.
    pub fn is_nil(&self) -> bool {
        self.bytes == Some([0; PAYLOAD_LEN])
    }

    /// Payload as a slice; empty when unset.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_ref().map(|b| b.as_slice()).unwrap_or(&[])
    }

    /// Payload copy; zeroes when unset.
    pub fn to_bytes(&self) -> [u8; PAYLOAD_LEN] {
        self.bytes.unwrap_or_default()
    }

    /// Version nibble, 0 when unset.
    pub fn version(&self) -> u8 {
        self.bytes.map(|b| b[6] >> 4).unwrap_or(0)
    }

    /// Variant family from the top bits of byte 8.
    pub fn variant(&self) -> Variant {
        let Some(b) = self.bytes else {
            return Variant::Invalid;
        };
        match b[8] {
            x if x & 0xc0 == 0x80 => Variant::Rfc4122,
            x if x & 0xe0 == 0xc0 => Variant::Microsoft,
            x if x & 0xe0 == 0xe0 => Variant::Future,
            _ => Variant::ReservedNcs,
        }
    }

    /// Embedded 60-bit timestamp. Only meaningful for time-based versions;
    /// check `version()` before trusting it.
    pub fn time(&self) -> Option<Timestamp> {
        let b = self.bytes?;
        let ticks = u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            | u64::from(u16::from_be_bytes([b[4], b[5]])) << 32
            | u64::from(u16::from_be_bytes([b[6], b[7]]) & 0x0fff) << 48;
        Some(Timestamp::from_ticks(ticks))
    }

    /// Embedded 14-bit clock sequence; meaningful for time-based versions
    /// only.
    pub fn clock_sequence(&self) -> Option<u16> {
        let b = self.bytes?;
        Some(u16::from_be_bytes([b[8], b[9]]) & 0x3fff)
    }

    /// Embedded 6-byte node id; meaningful for time-based versions only.
    pub fn node_id(&self) -> Option<[u8; NODE_ID_LEN]> {
        let b = self.bytes?;
        let mut node = [0u8; NODE_ID_LEN];
        node.copy_from_slice(&b[10..16]);
        Some(node)
    }

    /// Canonical lowercase hex form; empty when unset.
    ///
    /// Hex and URN take no formatting options, so they are memoized
    /// unconditionally.
    pub fn hex(&self) -> String {
        let Some(bytes) = &self.bytes else {
            return String::new();
        };
        self.hex.get_or_init(|| codec::encode_hex(bytes)).clone()
    }

    /// `urn:uuid:` form; empty when unset.
    pub fn urn(&self) -> String {
        let Some(bytes) = &self.bytes else {
            return String::new();
        };
        self.urn.get_or_init(|| codec::encode_urn(bytes)).clone()
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "Uuid({})", self.hex())
        } else {
            f.write_str("Uuid(unset)")
        }
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl PartialEq for Uuid {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Uuid {}

impl PartialOrd for Uuid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uuid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl Hash for Uuid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl FromStr for Uuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UuidHandler::global().decode(s)
    }
}

impl Serialize for Uuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for Uuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Options applied by a [`UuidHandler`]; immutable once the handler is
/// built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UuidConfig {
    /// Memoize derived strings on each identifier.
    pub cache: bool,
    /// Skip version-range rejection when decoding or setting.
    pub allow_invalid: bool,
    /// Lowest version accepted as valid.
    pub min_ver: u8,
    /// Highest version accepted as valid.
    pub max_ver: u8,
    /// Pad Base64 output with `=`.
    pub pad_b64: bool,
    /// Pad Base32 output with `=`.
    pub pad_b32: bool,
    /// Wrap ASCII 85 output with `<~ ~>`.
    pub wrap_a85: bool,
    /// Hyphenate URL-safe Base32 output every four characters.
    pub hyph_url32: bool,
}

impl Default for UuidConfig {
    fn default() -> Self {
        UuidConfig {
            cache: true,
            allow_invalid: false,
            min_ver: 1,
            max_ver: 5,
            pad_b64: true,
            pad_b32: true,
            wrap_a85: false,
            hyph_url32: true,
        }
    }
}

/// Generates, decodes, validates, and formats identifiers under one
/// configuration, owning the clock and node state used by time-based
/// generation.
pub struct UuidHandler {
    options: UuidConfig,
    clock: ClockSequencer,
    node: NodeIdentity,
}

impl UuidHandler {
    /// Handler with the given options and live clock/node sources.
    pub fn new(options: UuidConfig) -> Self {
        UuidHandler {
            options,
            clock: ClockSequencer::new(),
            node: NodeIdentity::new(),
        }
    }

    /// Handler with caller-supplied clock and node state, for
    /// deterministic generation.
    pub fn with_state(options: UuidConfig, clock: ClockSequencer, node: NodeIdentity) -> Self {
        UuidHandler {
            options,
            clock,
            node,
        }
    }

    /// Process-wide handler with default options.
    pub fn global() -> &'static UuidHandler {
        &GLOBAL
    }

    /// Options this handler was built with.
    pub fn options(&self) -> &UuidConfig {
        &self.options
    }

    /// Random version 4 identifier; alias for [`UuidHandler::new_v4`].
    pub fn generate(&self) -> Uuid {
        self.new_v4()
    }

    /// Random version 4 identifier.
    ///
    /// Infallible: an unreadable entropy source aborts rather than
    /// degrading to predictable identifiers.
    pub fn new_v4(&self) -> Uuid {
        let mut bytes = [0u8; PAYLOAD_LEN];
        rng::fill_random(&mut bytes);
        set_version_and_variant(&mut bytes, VERSION_RANDOM);
        Uuid::from_bytes(bytes)
    }

    /// Time-based version 1 identifier.
    ///
    /// Timestamp and clock sequence are taken under a single lock
    /// acquisition, so identifiers from one handler never repeat: a stalled
    /// or regressing wall clock bumps the sequence instead.
    pub fn new_v1(&self) -> Result<Uuid, UuidError> {
        let (ts, seq) = self.clock.now_with_sequence()?;
        let node = self.node.node_id();
        let ticks = ts.ticks();
        let mut bytes = [0u8; PAYLOAD_LEN];
        bytes[0..4].copy_from_slice(&((ticks & 0xffff_ffff) as u32).to_be_bytes());
        bytes[4..6].copy_from_slice(&(((ticks >> 32) & 0xffff) as u16).to_be_bytes());
        let time_hi = (((ticks >> 48) & 0x0fff) as u16) | (u16::from(VERSION_TIME) << 12);
        bytes[6..8].copy_from_slice(&time_hi.to_be_bytes());
        bytes[8..10].copy_from_slice(&seq.to_be_bytes());
        bytes[10..16].copy_from_slice(&node);
        Ok(Uuid::from_bytes(bytes))
    }

    /// Deterministic version 3 identifier: MD5 over namespace and name.
    pub fn new_v3(&self, namespace: &Uuid, name: &[u8]) -> Uuid {
        let mut hasher = Md5::new();
        hasher.update(namespace.as_bytes());
        hasher.update(name);
        hashed_uuid(hasher.finalize().as_slice(), VERSION_MD5)
    }

    /// Deterministic version 5 identifier: SHA-1 over namespace and name.
    pub fn new_v5(&self, namespace: &Uuid, name: &[u8]) -> Uuid {
        let mut hasher = Sha1::new();
        hasher.update(namespace.as_bytes());
        hasher.update(name);
        hashed_uuid(hasher.finalize().as_slice(), VERSION_SHA1)
    }

    /// Well-known namespace by name: `"DNS"`, `"URL"`, `"OID"`, `"X500"`,
    /// or `"NIL"`.
    pub fn namespace(&self, name: &str) -> Option<Uuid> {
        NAMESPACES.get(name).cloned()
    }

    /// Wraps caller-supplied bytes, applying the handler's validity rules.
    pub fn set(&self, bytes: [u8; PAYLOAD_LEN]) -> Result<Uuid, UuidError> {
        self.finish(Uuid::from_bytes(bytes))
    }

    /// Decodes any of the six textual forms, dispatching on input length
    /// alone: 20 is ASCII 85, 22 Base64, 24 framed ASCII 85 or padded
    /// Base64, 26 and 32 Base32, 36 and 45 hex/URN.
    pub fn decode(&self, s: &str) -> Result<Uuid, UuidError> {
        let b = s.as_bytes();
        let bytes = match b.len() {
            20 => codec::decode_a85(s)?,
            22 => codec::decode_b64(s)?,
            24 => {
                if b.starts_with(b"<~") && b.ends_with(b"~>") {
                    codec::decode_a85(s)?
                } else {
                    codec::decode_b64(s)?
                }
            }
            26 | 32 => codec::decode_b32(s)?,
            36 | 45 => codec::decode_hex(s)?,
            n => return Err(UuidError::UnrecognizedEncoding(n)),
        };
        self.finish(Uuid::from_bytes(bytes))
    }

    /// True when the identifier carries a payload whose version lies
    /// inside the configured range.
    pub fn is_valid(&self, id: &Uuid) -> bool {
        id.is_set() && (self.options.min_ver..=self.options.max_ver).contains(&id.version())
    }

    fn finish(&self, id: Uuid) -> Result<Uuid, UuidError> {
        if self.options.allow_invalid || self.is_valid(&id) {
            return Ok(id);
        }
        if id.is_nil() {
            return Err(UuidError::NilIdentifier);
        }
        Err(UuidError::InvalidIdentifier(id.version()))
    }

    /// Base64 form, padded per the handler options; empty when unset.
    pub fn b64(&self, id: &Uuid) -> String {
        let Some(bytes) = &id.bytes else {
            return String::new();
        };
        self.cached(&id.b64, || codec::encode_b64(bytes, self.options.pad_b64))
    }

    /// URL-safe Base64 form; empty when unset.
    pub fn url64(&self, id: &Uuid) -> String {
        let Some(bytes) = &id.bytes else {
            return String::new();
        };
        self.cached(&id.url64, || codec::encode_url64(bytes))
    }

    /// Base32 form, padded per the handler options; empty when unset.
    pub fn b32(&self, id: &Uuid) -> String {
        let Some(bytes) = &id.bytes else {
            return String::new();
        };
        self.cached(&id.b32, || codec::encode_b32(bytes, self.options.pad_b32))
    }

    /// URL-safe Base32 form, hyphenated per the handler options; empty
    /// when unset.
    pub fn url32(&self, id: &Uuid) -> String {
        let Some(bytes) = &id.bytes else {
            return String::new();
        };
        self.cached(&id.url32, || {
            codec::encode_url32(bytes, self.options.hyph_url32)
        })
    }

    /// ASCII 85 form, wrapped per the handler options; empty when unset.
    pub fn a85(&self, id: &Uuid) -> String {
        let Some(bytes) = &id.bytes else {
            return String::new();
        };
        self.cached(&id.a85, || codec::encode_a85(bytes, self.options.wrap_a85))
    }

    /// Current 14-bit clock sequence.
    pub fn clock_sequence(&self) -> u16 {
        self.clock.sequence()
    }

    /// Overrides the clock sequence; `None` reseeds from entropy.
    pub fn set_clock_sequence(&self, seq: Option<u16>) {
        self.clock.set_sequence(seq);
    }

    /// Resolved 6-byte node id.
    pub fn node_id(&self) -> [u8; NODE_ID_LEN] {
        self.node.node_id()
    }

    /// Overrides the node id; the first 6 bytes are used.
    pub fn set_node_id(&self, id: &[u8]) -> Result<(), UuidError> {
        self.node.set_node_id(id)
    }

    /// Selects the interface whose hardware address seeds the node id.
    pub fn set_node_interface(&self, name: Option<&str>) -> Result<(), UuidError> {
        self.node.set_interface(name)
    }

    /// Name of the interface the node id came from, or `"user"`.
    pub fn node_interface(&self) -> String {
        self.node.interface_name()
    }

    fn cached(&self, cell: &OnceCell<String>, render: impl FnOnce() -> String) -> String {
        if self.options.cache {
            cell.get_or_init(render).clone()
        } else {
            render()
        }
    }
}

impl Default for UuidHandler {
    fn default() -> Self {
        UuidHandler::new(UuidConfig::default())
    }
}

fn hashed_uuid(digest: &[u8], version: u8) -> Uuid {
    let mut bytes = [0u8; PAYLOAD_LEN];
    bytes.copy_from_slice(&digest[..PAYLOAD_LEN]);
    set_version_and_variant(&mut bytes, version);
    Uuid::from_bytes(bytes)
}

fn set_version_and_variant(bytes: &mut [u8; PAYLOAD_LEN], version: u8) {
    bytes[6] = (bytes[6] & 0x0f) | (version << 4);
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockSource;
    use crate::node::Interface;
    use std::time::{Duration, UNIX_EPOCH};

    const VECTOR_A: [u8; 16] = [
        23, 22, 217, 229, 211, 95, 75, 134, 139, 156, 156, 34, 97, 225, 43, 143,
    ];
    const VECTOR_B: [u8; 16] = [
        131, 156, 130, 220, 79, 63, 71, 254, 159, 187, 154, 25, 249, 59, 62, 227,
    ];

    fn fixed_clock(unix_secs: u64) -> ClockSource {
        let at = UNIX_EPOCH + Duration::from_secs(unix_secs);
        Box::new(move || at)
    }

    fn test_node() -> NodeIdentity {
        NodeIdentity::with_interfaces(vec![Interface {
            name: "en0".to_string(),
            hardware_addr: vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x01],
        }])
    }

    fn deterministic_handler(unix_secs: u64) -> UuidHandler {
        UuidHandler::with_state(
            UuidConfig::default(),
            ClockSequencer::with_source(fixed_clock(unix_secs)),
            test_node(),
        )
    }

    #[test]
    fn test_set_known_vector_encodings() {
        let handler = UuidHandler::new(UuidConfig::default());
        let id = handler.set(VECTOR_A).unwrap();
        assert_eq!(id.to_bytes(), VECTOR_A);
        assert_eq!(id.hex(), "1716d9e5-d35f-4b86-8b9c-9c2261e12b8f");
        assert_eq!(id.urn(), "urn:uuid:1716d9e5-d35f-4b86-8b9c-9c2261e12b8f");
        assert_eq!(id.to_string(), id.hex());
        assert_eq!(handler.b64(&id), "FxbZ5dNfS4aLnJwiYeErjw==");
        assert_eq!(handler.url64(&id), "FxbZ5dNfS4aLnJwiYeErjw");
        assert_eq!(handler.b32(&id), "C4LNTZOTL5FYNC44TQRGDYJLR4======");
        assert_eq!(handler.url32(&id), "C4LN-TZOT-L5FY-NC44-TQRG-DYJL-R4");
        assert_eq!(handler.a85(&id), "(Db]cdpGb&Mk$:]@Gr_t");
    }

    #[test]
    fn test_decode_dispatches_on_length() {
        let handler = UuidHandler::new(UuidConfig::default());
        let expect_a = handler.set(VECTOR_A).unwrap();
        for form in [
            "1716d9e5-d35f-4b86-8b9c-9c2261e12b8f",
            "urn:uuid:1716d9e5-d35f-4b86-8b9c-9c2261e12b8f",
            "FxbZ5dNfS4aLnJwiYeErjw==",
            "FxbZ5dNfS4aLnJwiYeErjw",
            "C4LNTZOTL5FYNC44TQRGDYJLR4======",
            "C4LN-TZOT-L5FY-NC44-TQRG-DYJL-R4",
            "(Db]cdpGb&Mk$:]@Gr_t",
            "<~(Db]cdpGb&Mk$:]@Gr_t~>",
        ] {
            assert_eq!(handler.decode(form).unwrap(), expect_a, "form {form:?}");
        }
        let decoded = handler.decode("QOOI-FXCP-H5D7-5H53-TIM7-SOZ6-4M").unwrap();
        assert_eq!(decoded.to_bytes(), VECTOR_B);
    }

    #[test]
    fn test_decode_rejects_unrecognized_length_immediately() {
        let handler = UuidHandler::new(UuidConfig::default());
        let err = handler.decode("1716d9e5-d35f-4b86-8b9c-9c226").unwrap_err();
        assert!(matches!(err, UuidError::UnrecognizedEncoding(29)));
        let err = handler.decode(&"x".repeat(25)).unwrap_err();
        assert!(matches!(err, UuidError::UnrecognizedEncoding(25)));
        let err = handler.decode("").unwrap_err();
        assert!(matches!(err, UuidError::UnrecognizedEncoding(0)));
    }

    #[test]
    fn test_nil_is_distinguished_from_invalid() {
        let handler = UuidHandler::new(UuidConfig::default());
        let err = handler
            .decode("00000000-0000-0000-0000-000000000000")
            .unwrap_err();
        assert!(matches!(err, UuidError::NilIdentifier));
        let err = handler.set([0; PAYLOAD_LEN]).unwrap_err();
        assert!(matches!(err, UuidError::NilIdentifier));

        let permissive = UuidHandler::new(UuidConfig {
            allow_invalid: true,
            ..UuidConfig::default()
        });
        let id = permissive
            .decode("00000000-0000-0000-0000-000000000000")
            .unwrap();
        assert!(id.is_nil());
        assert!(!permissive.is_valid(&id));
    }

    #[test]
    fn test_version_range_validation() {
        let handler = UuidHandler::new(UuidConfig::default());
        // Version nibble 0 with a non-zero payload.
        let mut bytes = [0u8; PAYLOAD_LEN];
        bytes[0] = 1;
        let err = handler.set(bytes).unwrap_err();
        assert!(matches!(err, UuidError::InvalidIdentifier(0)));

        let permissive = UuidHandler::new(UuidConfig {
            allow_invalid: true,
            ..UuidConfig::default()
        });
        let id = permissive.set(bytes).unwrap();
        assert_eq!(id.version(), 0);

        let narrow = UuidHandler::new(UuidConfig {
            min_ver: 4,
            max_ver: 4,
            ..UuidConfig::default()
        });
        assert!(narrow.set(VECTOR_A).is_ok());
        let v1 = deterministic_handler(1_700_000_000).new_v1().unwrap();
        assert!(matches!(
            narrow.set(v1.to_bytes()),
            Err(UuidError::InvalidIdentifier(1))
        ));
    }

    #[test]
    fn test_new_v4_shape() {
        let handler = UuidHandler::new(UuidConfig::default());
        let id = handler.new_v4();
        assert_eq!(id.version(), 4);
        assert_eq!(id.variant(), Variant::Rfc4122);
        assert!(handler.is_valid(&id));
        assert_ne!(id, handler.new_v4());
        assert_eq!(handler.generate().version(), 4);
    }

    #[test]
    fn test_new_v1_layout_and_accessors() {
        let handler = deterministic_handler(1_700_000_000);
        let id = handler.new_v1().unwrap();
        assert_eq!(id.version(), 1);
        assert_eq!(id.variant(), Variant::Rfc4122);
        assert_eq!(id.node_id(), Some([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]));
        assert_eq!(
            id.time().unwrap(),
            Timestamp::from_unix(1_700_000_000, 0)
        );
        assert_eq!(id.clock_sequence(), Some(handler.clock_sequence()));
    }

    #[test]
    fn test_new_v1_stalled_clock_keeps_time_but_changes_sequence() {
        let handler = deterministic_handler(1_700_000_000);
        let a = handler.new_v1().unwrap();
        let b = handler.new_v1().unwrap();
        assert_eq!(a.time(), b.time());
        assert_ne!(a.clock_sequence(), b.clock_sequence());
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_v1_time_ordering_on_real_clock() {
        let handler = UuidHandler::with_state(
            UuidConfig::default(),
            ClockSequencer::new(),
            test_node(),
        );
        let a = handler.new_v1().unwrap();
        let b = handler.new_v1().unwrap();
        assert!(b.time().unwrap() >= a.time().unwrap());
        if a.time() == b.time() {
            assert_ne!(a.clock_sequence(), b.clock_sequence());
        }
    }

    #[test]
    fn test_namespace_table() {
        let handler = UuidHandler::new(UuidConfig::default());
        let dns = handler.namespace("DNS").unwrap();
        assert_eq!(dns.hex(), "6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        assert!(handler.namespace("NIL").unwrap().is_nil());
        assert!(handler.namespace("EMAIL").is_none());
    }

    #[test]
    fn test_v3_v5_published_vectors() {
        let handler = UuidHandler::new(UuidConfig::default());
        let dns = handler.namespace("DNS").unwrap();
        let v3 = handler.new_v3(&dns, b"python.org");
        assert_eq!(v3.hex(), "6fa459ea-ee8a-3ca4-894e-db77e160355e");
        assert_eq!(v3.version(), 3);
        let v5 = handler.new_v5(&dns, b"python.org");
        assert_eq!(v5.hex(), "886313e1-3b8a-5372-9b90-0c9aee199e5d");
        assert_eq!(v5.version(), 5);
    }

    #[test]
    fn test_namespace_generation_is_deterministic() {
        let handler = UuidHandler::new(UuidConfig::default());
        let url = handler.namespace("URL").unwrap();
        assert_eq!(
            handler.new_v5(&url, b"https://example.com"),
            handler.new_v5(&url, b"https://example.com")
        );
        assert_ne!(
            handler.new_v5(&url, b"https://example.com"),
            handler.new_v5(&url, b"https://example.org")
        );
        let dns = handler.namespace("DNS").unwrap();
        assert_ne!(
            handler.new_v5(&dns, b"https://example.com"),
            handler.new_v5(&url, b"https://example.com")
        );
    }

    #[test]
    fn test_unset_identifier_behavior() {
        let id = Uuid::default();
        assert!(!id.is_set());
        assert!(!id.is_nil());
        assert_eq!(id.version(), 0);
        assert_eq!(id.variant(), Variant::Invalid);
        assert_eq!(id.hex(), "");
        assert_eq!(id.to_string(), "");
        assert!(id.as_bytes().is_empty());
        let handler = UuidHandler::new(UuidConfig::default());
        assert_eq!(handler.b64(&id), "");
        assert!(!handler.is_valid(&id));
        assert_ne!(id, Uuid::nil());
    }

    #[test]
    fn test_equality_and_ordering_use_payload_only() {
        let handler = UuidHandler::new(UuidConfig::default());
        let a = handler.set(VECTOR_A).unwrap();
        let b = handler.set(VECTOR_A).unwrap();
        // Different cache population must not affect equality.
        let _ = handler.b64(&a);
        assert_eq!(a, b);
        let c = handler.set(VECTOR_B).unwrap();
        assert!(a < c);
    }

    #[test]
    fn test_unpadded_options() {
        let handler = UuidHandler::new(UuidConfig {
            cache: false,
            pad_b64: false,
            pad_b32: false,
            wrap_a85: true,
            hyph_url32: false,
            ..UuidConfig::default()
        });
        let id = handler.set(VECTOR_A).unwrap();
        assert_eq!(handler.b64(&id), "FxbZ5dNfS4aLnJwiYeErjw");
        assert_eq!(handler.b32(&id), "C4LNTZOTL5FYNC44TQRGDYJLR4");
        assert_eq!(handler.url32(&id), "C4LNTZOTL5FYNC44TQRGDYJLR4");
        assert_eq!(handler.a85(&id), "<~(Db]cdpGb&Mk$:]@Gr_t~>");
    }

    #[test]
    fn test_cached_strings_are_stable_per_instance() {
        let handler = UuidHandler::new(UuidConfig::default());
        let id = handler.set(VECTOR_A).unwrap();
        let first = handler.b64(&id);
        assert_eq!(handler.b64(&id), first);

        // An uncached handler recomputes with its own options each call.
        let uncached = UuidHandler::new(UuidConfig {
            cache: false,
            pad_b64: false,
            ..UuidConfig::default()
        });
        let fresh = uncached.set(VECTOR_A).unwrap();
        assert_eq!(uncached.b64(&fresh), "FxbZ5dNfS4aLnJwiYeErjw");
    }

    #[test]
    fn test_from_str_and_serde_round_trip() {
        let id: Uuid = "1716d9e5-d35f-4b86-8b9c-9c2261e12b8f".parse().unwrap();
        assert_eq!(id.to_bytes(), VECTOR_A);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1716d9e5-d35f-4b86-8b9c-9c2261e12b8f\"");
        let back: Uuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<Uuid>("\"not-a-uuid\"").is_err());
    }

    #[test]
    fn test_handler_node_passthrough() {
        let handler = UuidHandler::with_state(
            UuidConfig::default(),
            ClockSequencer::new(),
            test_node(),
        );
        handler.set_node_id(&[9, 8, 7, 6, 5, 4]).unwrap();
        assert_eq!(handler.node_id(), [9, 8, 7, 6, 5, 4]);
        assert_eq!(handler.node_interface(), "user");
        let id = handler.new_v1().unwrap();
        assert_eq!(id.node_id(), Some([9, 8, 7, 6, 5, 4]));
        assert!(matches!(
            handler.set_node_interface(Some("nope")),
            Err(UuidError::NodeResolution(_))
        ));
    }

    #[test]
    fn test_handler_clock_passthrough() {
        let handler = deterministic_handler(1_700_000_000);
        handler.set_clock_sequence(Some(0x0abc));
        assert_eq!(handler.clock_sequence(), 0x0abc);
        let id = handler.new_v1().unwrap();
        assert_eq!(id.clock_sequence(), Some(0x0abc));
    }

    #[test]
    fn test_variant_classification() {
        let handler = UuidHandler::new(UuidConfig {
            allow_invalid: true,
            ..UuidConfig::default()
        });
        let mut bytes = VECTOR_A;
        bytes[8] = 0x1f;
        assert_eq!(handler.set(bytes).unwrap().variant(), Variant::ReservedNcs);
        bytes[8] = 0xc1;
        assert_eq!(handler.set(bytes).unwrap().variant(), Variant::Microsoft);
        bytes[8] = 0xe1;
        assert_eq!(handler.set(bytes).unwrap().variant(), Variant::Future);
        assert_eq!(Variant::Rfc4122.to_string(), "RFC4122");
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = UuidConfig {
            wrap_a85: true,
            max_ver: 7,
            ..UuidConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: UuidConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(UuidHandler::new(config).options(), &config);
    }

    #[test]
    fn test_malformed_inputs_yield_typed_errors() {
        let handler = UuidHandler::new(UuidConfig::default());
        assert!(matches!(
            handler.decode("1716d9e5-d35f-4b86-8b9c!9c2261e12b8f"),
            Err(UuidError::Malformed { .. })
        ));
        assert!(matches!(
            handler.decode("zzzzzzzzzzzzzzzzzzzz"),
            Err(UuidError::Malformed { .. })
        ));
        assert!(matches!(
            handler.decode("C4LNTZOTL5FYNC44TQRGDYJ!R4======"),
            Err(UuidError::Malformed { .. })
        ));
    }
}
