//! API translation between Anthropic and `OpenAI` formats.
//!
//! The core of the bridge: converts a Messages request into a Chat Completions
//! request, and a Chat Completions response back into a Messages response.
//! All translation functions are pure (no I/O) and never fail; malformed input
//! degrades to documented defaults instead.

pub mod anthropic_types;
pub mod encoding;
pub mod ids;
pub mod lenient;
pub mod openai_types;
pub mod request;
pub mod response;

pub use request::anthropic_to_openai;
pub use response::openai_to_anthropic;
