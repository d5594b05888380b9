pub mod gateway;
pub mod openai_compat;
pub mod traits;
pub mod util;

// Re-exports for convenience.
pub use gateway::{GenerationOptions, ModelGateway};
pub use openai_compat::OpenAiCompatProvider;
pub use traits::{ChatRequest, ChatResponse, LlmProvider, PromptMessage, PromptRole, Usage};
