//! Reply generation.
//!
//! * [`TextGenerator`] — async trait implemented by all generator backends.
//! * [`ApiGenerator`] — OpenAI-compatible REST API generator.
//! * [`SafeGenerator`] — wraps any generator; substitutes [`FALLBACK_REPLY`]
//!   on failure so generation can never fail from the controller's view.

pub mod fallback;
pub mod generator;

pub use fallback::{SafeGenerator, FALLBACK_REPLY};
pub use generator::{ApiGenerator, GenError, TextGenerator};
