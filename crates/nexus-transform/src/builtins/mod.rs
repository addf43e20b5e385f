pub mod anonymizer;
pub mod normalizer;
pub mod rag;
pub mod system_prompt;

pub use anonymizer::{InputAnonymizer, OutputAnonymizer};
pub use normalizer::NormalizerTransform;
pub use rag::{RagTransform, Retriever};
pub use system_prompt::{Placement, SystemPromptTransform};
