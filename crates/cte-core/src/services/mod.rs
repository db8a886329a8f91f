pub mod attachment;
pub mod prompts;
pub mod provider;
pub mod simulated_provider;

pub use attachment::{AttachmentError, MAX_ATTACHMENT_SIZE, ingest_bytes, ingest_file};
pub use provider::{
    ChatProvider, ProviderConfig, ProviderError, ProviderRequest, ProviderStream, StreamEvent,
};
pub use simulated_provider::SimulatedProvider;
