//! Pipeline persistence.
//!
//! - [`native`]: the `.dbto` container (32-byte header + Postcard payload)
//! - [`payload`]: plain-data mirror of a fitted pipeline
//! - `convert`: `Pipeline::save` / `load` / `to_bytes` / `from_bytes` and the
//!   JSON mirror (`write_json` / `read_json`)

mod convert;
pub mod native;
pub mod payload;

pub use native::{DeserializeError, FormatHeader, NativeCodec, SerializeError, HEADER_SIZE, MAGIC};
pub use payload::{JsonEnvelope, Payload, PipelineV1};
