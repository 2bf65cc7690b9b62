//! Cross-module tests exercising the whole engine.

mod retrieval_flow;
