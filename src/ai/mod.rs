pub mod enricher;
pub mod extractor;
pub mod gateway;
pub mod suggestions;
pub mod worker;

pub use gateway::{Gateway, GatewayError};
pub use worker::AiWorker;
