//! Core traits of the Wavesearch pipeline.
//!
//! The pipeline is composed at these seams: retrievers find documents,
//! rankers reorder them, transformers/expanders reshape queries, augmenters
//! build the generation prompt, memory stores hold conversation history,
//! and generators talk to the LLM.

pub mod generator;
pub mod memory;
pub mod retriever;
pub mod transformer;

pub use generator::*;
pub use memory::*;
pub use retriever::*;
pub use transformer::*;
