//! Binary persistence for container stacks.
//!
//! Stacks are encoded with `bitcode` behind a versioned header so that a
//! host can reject foreign or future data before touching the payload.
//! Fusion sessions are deliberately absent: they are rebuilt by re-absorbing
//! ingredients after a restart.

use crate::id::BlockPos;
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a single encoded container stack.
pub const STACK_MAGIC: u32 = 0xA1C4_0001;

/// Magic number identifying a batch of vessel stacks keyed by position.
pub const VESSELS_MAGIC: u32 = 0xA1C4_0002;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{expected:08X}, got 0x{found:08X}")]
    InvalidMagic { expected: u32, found: u32 },
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("data from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Header prepended to every encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistHeader {
    pub magic: u32,
    pub version: u32,
}

impl PersistHeader {
    pub fn new(magic: u32) -> Self {
        Self {
            magic,
            version: FORMAT_VERSION,
        }
    }

    /// Validate against the expected magic and the current version.
    pub fn validate(&self, expected_magic: u32) -> Result<(), DeserializeError> {
        if self.magic != expected_magic {
            return Err(DeserializeError::InvalidMagic {
                expected: expected_magic,
                found: self.magic,
            });
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// Header plus the separately encoded payload, so the header can be checked
/// before the payload is decoded.
#[derive(Serialize, Deserialize)]
struct Envelope {
    header: PersistHeader,
    payload: Vec<u8>,
}

fn encode<T: Serialize>(magic: u32, payload: &T) -> Result<Vec<u8>, SerializeError> {
    let payload = bitcode::serialize(payload).map_err(|e| SerializeError::Encode(e.to_string()))?;
    let envelope = Envelope {
        header: PersistHeader::new(magic),
        payload,
    };
    bitcode::serialize(&envelope).map_err(|e| SerializeError::Encode(e.to_string()))
}

fn decode<T: for<'de> Deserialize<'de>>(magic: u32, data: &[u8]) -> Result<T, DeserializeError> {
    let envelope: Envelope =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    envelope.header.validate(magic)?;
    bitcode::deserialize(&envelope.payload).map_err(|e| DeserializeError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Encode one container stack, attribute tree included.
pub fn encode_stack(stack: &ItemStack) -> Result<Vec<u8>, SerializeError> {
    encode(STACK_MAGIC, stack)
}

/// Decode a stack produced by [`encode_stack`].
pub fn decode_stack(data: &[u8]) -> Result<ItemStack, DeserializeError> {
    decode(STACK_MAGIC, data)
}

/// Encode the vessel stacks of several positions in one payload.
pub fn encode_vessels(vessels: &[(BlockPos, ItemStack)]) -> Result<Vec<u8>, SerializeError> {
    encode(VESSELS_MAGIC, &vessels)
}

/// Decode a payload produced by [`encode_vessels`].
pub fn decode_vessels(data: &[u8]) -> Result<Vec<(BlockPos, ItemStack)>, DeserializeError> {
    decode(VESSELS_MAGIC, data)
}
