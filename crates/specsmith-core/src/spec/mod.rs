//! The specification pipeline: request validation, prompt construction,
//! extraction and normalization of model output, persistence, and
//! composite retrieval.

pub mod extract;
pub mod normalize;
pub mod prompt;
pub mod request;
pub mod service;

pub use extract::extract_json_object;
pub use normalize::{GeneratedPlan, normalize_plan};
pub use prompt::{SYSTEM_PROMPT, build_prompt};
pub use request::CreateSpecRequest;
pub use service::{CreateSpecResponse, SpecComposite, create_spec, list_specs};
