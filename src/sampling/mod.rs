pub mod uniform;

pub use uniform::UniformSampler;
