/// Route module for pattern-based routing
///
/// Contains pure functional components for route pattern parsing and matching.
/// Compiled patterns are immutable once built and safe to share across threads.

pub mod pattern;

// Re-export commonly used types
pub use pattern::{classify_segment, is_identifier, CompiledPattern, Params, PatternSegmentType};
