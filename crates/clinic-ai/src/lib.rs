//! # clinic-ai
//!
//! AI-assisted writing of intervention plans and session reports.
//!
//! The pipeline never lets a real patient or therapist name leave the
//! process:
//!
//! 1. [`context`] gathers the patient's records through `ClinicService`.
//! 2. [`variables`] turns them into `{{VARIABLE}}` values with fallbacks.
//! 3. [`anonymize`] swaps every registered name for its codename.
//! 4. [`template`] interpolates the anonymized values into the prompt body.
//! 5. A [`TextGenerator`] (normally [`gemini::GeminiClient`]) produces text.
//! 6. Codenames in the response are swapped back to the real names.

pub mod anonymize;
pub mod context;
mod error;
pub mod gemini;
mod http;
pub mod pipeline;
pub mod template;
pub mod variables;

pub use error::AiError;
pub use pipeline::{
    ComposedPrompt, GenerateOptions, Generation, GenerationRequest, Generator, PromptComposer,
    TextGenerator,
};
