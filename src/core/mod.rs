pub mod assembler;
pub mod decoder;
pub mod sampler;
pub mod selector;
pub mod table;

pub use assembler::assemble;
pub use decoder::{decode, Decoded};
pub use sampler::Sampler;
pub use selector::{select, SizePolicy};
pub use table::{RawInput, SampleResult, SourceFormat};
