//! Technology analysis — prompt catalog, vendor call, and best-effort
//! extraction of sections and numbers from the reply.

pub mod extractor;
pub mod handlers;
pub mod kinds;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod prompts;
pub mod quadrant;
