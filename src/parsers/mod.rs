pub mod payload;
pub mod types;

pub use payload::JsonPayload;
pub use types::{ParseError, PayloadError, PayloadParser, RawTelemetry, TimeInput};
