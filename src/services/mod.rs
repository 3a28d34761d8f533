pub mod gemini;
pub mod invalidation;
mod memo_service;
mod summary_service;

pub use gemini::{GeminiClient, TextGenerator};
pub use invalidation::{Collection, InvalidationBus};
pub use memo_service::MemoService;
pub use summary_service::{SummaryResult, SummaryService};

#[cfg(test)]
pub(crate) use summary_service::tests::StubGenerator;
