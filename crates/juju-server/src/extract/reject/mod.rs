//! Request body extractors with JSON error bodies and validation.

mod enhanced_json;
mod validated_json;

pub(crate) use self::enhanced_json::MAX_JSON_PAYLOAD_SIZE;
pub use self::enhanced_json::Json;
pub use self::validated_json::ValidateJson;
