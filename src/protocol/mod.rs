pub mod messages;

pub use messages::{PerformSamplingRequest, SamplingResponse};
