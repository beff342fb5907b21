//! Core pipeline for specsmith: validate a planning brief, prompt the
//! model, extract and normalize its JSON output, persist the result, and
//! reassemble composites on read.

pub mod error;
pub mod llm;
pub mod spec;
