//! Shared marker model and wire codecs for the paint relay.
//!
//! This crate owns the wire representation used by `relay`, `client`, and
//! `cli`. A message on the socket is a [`Frame`]: an event name plus a JSON
//! payload. The only event the protocol recognizes is [`PAINT_EVENT`], whose
//! payload is a [`Marker`].
//!
//! Frames travel either as JSON text or as protobuf binary. Both encodings
//! carry the same envelope, so a relay can forward whichever one it received
//! without re-encoding.
//!
//! VALIDATION
//! ==========
//! Payloads cross a trust boundary twice: at the relay's ingress and at a
//! client's receive path. [`Marker::from_value`] is the single schema check
//! both sides run. It never clamps; a payload is either a usable marker or a
//! [`ValidationError`].

use prost::Message;
use prost_types::value::Kind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Event name carried by every marker frame.
pub const PAINT_EVENT: &str = "paint";

/// Payload key for the marker position.
pub const FIELD_POSITION: &str = "position";

/// Payload key for the marker orientation.
pub const FIELD_ORIENTATION: &str = "orientation";

/// Legacy payload key for the orientation, accepted on decode only.
pub const FIELD_QUATERNION: &str = "quaternion";

/// Largest accepted magnitude for any position component, in world units.
pub const MAX_ABS_COORDINATE: f64 = 10_000.0;

// =============================================================================
// ERRORS
// =============================================================================

/// Grepable error code for structured log fields.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

/// Error returned by the decode functions.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text could not be parsed as a JSON frame.
    #[error("failed to decode json frame: {0}")]
    Json(#[from] serde_json::Error),
    /// The raw bytes could not be decoded as a protobuf `WireFrame`.
    #[error("failed to decode protobuf frame: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl ErrorCode for CodecError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Json(_) => "E_FRAME_JSON",
            Self::Decode(_) => "E_FRAME_PROTOBUF",
        }
    }
}

/// Why a payload is not a usable marker.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("marker payload is not an object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` is not an array")]
    NotAnArray(&'static str),
    #[error("field `{field}` must have {expected} components, got {actual}")]
    Arity { field: &'static str, expected: usize, actual: usize },
    #[error("field `{field}` component {index} is not a number")]
    NotANumber { field: &'static str, index: usize },
    #[error("field `{field}` component {index} is not finite")]
    NonFinite { field: &'static str, index: usize },
    #[error("position component {index} out of range: {value}")]
    OutOfRange { index: usize, value: f64 },
    #[error("orientation is the zero quaternion")]
    DegenerateOrientation,
}

impl ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAnObject => "E_MARKER_NOT_OBJECT",
            Self::MissingField(_) => "E_MARKER_MISSING_FIELD",
            Self::NotAnArray(_) | Self::Arity { .. } => "E_MARKER_SHAPE",
            Self::NotANumber { .. } => "E_MARKER_NOT_NUMBER",
            Self::NonFinite { .. } => "E_MARKER_NON_FINITE",
            Self::OutOfRange { .. } => "E_MARKER_OUT_OF_RANGE",
            Self::DegenerateOrientation => "E_MARKER_DEGENERATE",
        }
    }
}

// =============================================================================
// MARKER
// =============================================================================

/// A single positioned-and-oriented annotation in the shared space.
///
/// `orientation` is a quaternion in `[x, y, z, w]` order. It is not required to
/// be normalized.
///
/// Serializes to the wire payload shape. Parsing goes through
/// [`Marker::from_value`], which also accepts the legacy `quaternion` key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub position: [f64; 3],
    pub orientation: [f64; 4],
}

impl Marker {
    #[must_use]
    pub fn new(position: [f64; 3], orientation: [f64; 4]) -> Self {
        Self { position, orientation }
    }

    /// Parse and validate a marker from a frame payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first problem found.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let Some(fields) = value.as_object() else {
            return Err(ValidationError::NotAnObject);
        };

        let position = components::<3>(fields.get(FIELD_POSITION), FIELD_POSITION)?;
        let orientation = components::<4>(
            fields
                .get(FIELD_ORIENTATION)
                .or_else(|| fields.get(FIELD_QUATERNION)),
            FIELD_ORIENTATION,
        )?;

        let marker = Self { position, orientation };
        marker.validate()?;
        Ok(marker)
    }

    /// Check the numeric invariants of an already-typed marker.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for non-finite components, an
    /// out-of-range position, or a zero orientation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, value) in self.position.iter().copied().enumerate() {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field: FIELD_POSITION, index });
            }
            if value.abs() > MAX_ABS_COORDINATE {
                return Err(ValidationError::OutOfRange { index, value });
            }
        }

        for (index, value) in self.orientation.iter().enumerate() {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field: FIELD_ORIENTATION, index });
            }
        }

        let norm_squared: f64 = self.orientation.iter().map(|c| c * c).sum();
        if norm_squared < f64::EPSILON {
            return Err(ValidationError::DegenerateOrientation);
        }
        Ok(())
    }

    /// Marker payload as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert(FIELD_POSITION.into(), serde_json::json!(self.position));
        fields.insert(FIELD_ORIENTATION.into(), serde_json::json!(self.orientation));
        Value::Object(fields)
    }
}

fn components<const N: usize>(
    value: Option<&Value>,
    field: &'static str,
) -> Result<[f64; N], ValidationError> {
    let Some(value) = value else {
        return Err(ValidationError::MissingField(field));
    };
    let Some(items) = value.as_array() else {
        return Err(ValidationError::NotAnArray(field));
    };
    if items.len() != N {
        return Err(ValidationError::Arity { field, expected: N, actual: items.len() });
    }

    let mut out = [0.0; N];
    for (index, (slot, item)) in out.iter_mut().zip(items).enumerate() {
        *slot = item
            .as_f64()
            .ok_or(ValidationError::NotANumber { field, index })?;
    }
    Ok(out)
}

// =============================================================================
// FRAME
// =============================================================================

/// A single message on the realtime wire protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name, e.g. `"paint"`.
    pub event: String,
    /// Event payload.
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self { event: event.into(), data }
    }

    /// Build a `paint` frame carrying `marker`.
    #[must_use]
    pub fn paint(marker: &Marker) -> Self {
        Self::new(PAINT_EVENT, marker.to_value())
    }

    #[must_use]
    pub fn is_paint(&self) -> bool {
        self.event == PAINT_EVENT
    }

    /// Validate the payload as a marker.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the payload is not a usable marker.
    pub fn marker(&self) -> Result<Marker, ValidationError> {
        Marker::from_value(&self.data)
    }
}

// =============================================================================
// TEXT CODEC
// =============================================================================

/// Encode a frame as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the payload cannot be serialized.
pub fn encode_text(frame: &Frame) -> Result<String, CodecError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode JSON text into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for text that is not a JSON frame.
pub fn decode_text(text: &str) -> Result<Frame, CodecError> {
    Ok(serde_json::from_str(text)?)
}

// =============================================================================
// BINARY CODEC
// =============================================================================

/// Encode a frame into protobuf bytes.
#[must_use]
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let wire = WireFrame {
        event: frame.event.clone(),
        data: Some(json_to_proto_value(&frame.data)),
    };

    let mut out = Vec::with_capacity(wire.encoded_len());
    // Encoding into a growable Vec cannot run out of buffer.
    wire.encode(&mut out).unwrap_or_default();
    out
}

/// Decode protobuf bytes into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, CodecError> {
    let wire = WireFrame::decode(bytes)?;
    Ok(Frame {
        event: wire.event,
        data: wire
            .data
            .map_or(Value::Object(Map::new()), |v| proto_to_json_value(&v)),
    })
}

/// JSON payload as a `google.protobuf.Value`.
///
/// Every JSON number travels as a protobuf double. Integers beyond 2^53 lose
/// precision, which marker payloads never contain.
fn json_to_proto_value(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(prost_types::NullValue::NullValue as i32),
        Value::Bool(flag) => Kind::BoolValue(*flag),
        Value::Number(number) => Kind::NumberValue(number.as_f64().unwrap_or_default()),
        Value::String(text) => Kind::StringValue(text.clone()),
        Value::Array(items) => Kind::ListValue(prost_types::ListValue {
            values: items.iter().map(json_to_proto_value).collect(),
        }),
        Value::Object(fields) => Kind::StructValue(prost_types::Struct {
            fields: fields
                .iter()
                .map(|(key, field)| (key.clone(), json_to_proto_value(field)))
                .collect(),
        }),
    };
    prost_types::Value { kind: Some(kind) }
}

/// Inverse of [`json_to_proto_value`].
///
/// A double with no JSON form (NaN, infinities) becomes `null`, so marker
/// validation rejects it instead of the decoder.
fn proto_to_json_value(value: &prost_types::Value) -> Value {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(flag)) => Value::Bool(*flag),
        Some(Kind::NumberValue(number)) => {
            serde_json::Number::from_f64(*number).map_or(Value::Null, Value::Number)
        }
        Some(Kind::StringValue(text)) => Value::String(text.clone()),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.iter().map(proto_to_json_value).collect())
        }
        Some(Kind::StructValue(object)) => Value::Object(
            object
                .fields
                .iter()
                .map(|(key, field)| (key.clone(), proto_to_json_value(field)))
                .collect(),
        ),
    }
}

#[derive(Clone, PartialEq, Message)]
struct WireFrame {
    #[prost(string, tag = "1")]
    event: String,
    #[prost(message, optional, tag = "2")]
    data: Option<prost_types::Value>,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
