pub mod config;
pub mod context;
pub mod engine;
pub mod llm;
pub mod producer;

pub use config::Config;
pub use context::{ContextExtractor, HeuristicExtractor, SourceContext};
pub use engine::{Engine, EngineError, RunSummary, SeedReport, StatusReport};
pub use llm::{Provider, LLM};
pub use producer::{ContentProducer, LlmProducer, ProducerError, PromptTemplate};
