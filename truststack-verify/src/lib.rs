//! TrustStack Verify - claim verification against external evidence
//!
//! Extracts factual claims from content, retrieves web evidence for each,
//! and asks an LLM judge to classify every claim as SUPPORTED, CONTRADICTED
//! or UNVERIFIED. Verdicts fold into a verification score and issue list.

pub mod backend;
pub mod judgment;
pub mod manager;
pub mod search;

pub use backend::{
    create_anthropic_backend, create_backend, AnthropicBackend, AnthropicConfig, LlmBackend,
    LlmError, OpenAiBackend, OpenAiBackendConfig, SharedBackend,
};
pub use manager::VerificationManager;
pub use search::{EvidenceRetriever, SearchError, SerperClient, SerperConfig};
