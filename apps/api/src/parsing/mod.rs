// Resume parsing: prompt building, completion, result validation, and the
// two-step upload/parse pipeline behind the HTTP handlers.
// All completion calls go through llm_client.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod validator;
