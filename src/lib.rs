pub mod client;
pub mod config;
pub mod constants;
pub mod core;
pub mod credential;
pub mod engine;
pub mod error;
pub mod prompts;
pub mod request;
pub mod response;
pub mod retry;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

pub use crate::client::AiClient;
pub use crate::core::{
    ConnectionStatus, ConnectionTestResult, DetailImageSegment, GenerationState, ImageData,
    PageLength, ProductDraft, ProductInfo,
};
pub use crate::credential::{Credential, CredentialOverride};
pub use crate::engine::{GenerationEngine, SegmentBoard, SegmentProgress};
pub use crate::error::AiError;
