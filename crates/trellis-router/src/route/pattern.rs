/// Pattern compilation and matching for route paths
///
/// Pure functional parsing of `/hello/{name}` style patterns into typed
/// segments, and segment-wise matching of concrete request paths.
/// All functions are **pure**: same input → same output, no side effects.

use std::collections::HashMap;

use crate::PatternError;

/// Parameters bound by a successful match (capture name → path segment)
pub type Params = HashMap<String, String>;

/// Represents the two kinds of route pattern segments
///
/// # Examples
///
/// ```
/// use trellis_router::route::pattern::{classify_segment, PatternSegmentType};
///
/// let seg = classify_segment("/about", "about").unwrap();
/// assert!(matches!(seg, PatternSegmentType::Static(_)));
///
/// let seg = classify_segment("/hello/{name}", "{name}").unwrap();
/// assert!(matches!(seg, PatternSegmentType::Capture(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegmentType {
    /// Capture segment: {name}
    Capture(String),
    /// Static text segment, compared exactly
    Static(String),
}

/// Returns true for `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Classifies a single segment of `pattern` (pure function)
///
/// # Parsing Rules
///
/// 1. **Capture**: exactly `{identifier}`
/// 2. **Rejected**: `{...}` with a non-identifier inside (`{1}`, `{a-b}`, `{}`)
/// 3. **Rejected**: any other segment containing a brace (`user-{id}`)
/// 4. **Static**: everything else
pub fn classify_segment(pattern: &str, segment: &str) -> Result<PatternSegmentType, PatternError> {
    match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(name) if is_identifier(name) => Ok(PatternSegmentType::Capture(name.to_string())),
        Some(name) => Err(PatternError::InvalidCaptureName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        }),
        None if segment.contains(['{', '}']) => Err(PatternError::StrayBrace {
            pattern: pattern.to_string(),
            segment: segment.to_string(),
        }),
        None => Ok(PatternSegmentType::Static(segment.to_string())),
    }
}

/// Splits an absolute path into its segments.
///
/// The root `/` has no segments; anything not starting with `/` is `None`.
fn split_segments(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix('/')?;
    if rest.is_empty() {
        Some(Vec::new())
    } else {
        Some(rest.split('/').collect())
    }
}

/// A route pattern compiled into a sequence of segment specs
///
/// # Examples
///
/// ```
/// use trellis_router::route::pattern::CompiledPattern;
///
/// let pattern = CompiledPattern::compile("/hello/{name}").unwrap();
/// let params = pattern.matches("/hello/Ada").unwrap();
/// assert_eq!(params.get("name"), Some(&"Ada".to_string()));
///
/// assert!(pattern.matches("/hello").is_none());
/// assert!(pattern.matches("/hello/").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    source: String,
    segments: Vec<PatternSegmentType>,
}

impl CompiledPattern {
    /// Compiles a pattern, rejecting duplicate or malformed captures
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let raw_segments = split_segments(pattern)
            .ok_or_else(|| PatternError::MissingLeadingSlash(pattern.to_string()))?;

        let segments = raw_segments
            .into_iter()
            .map(|segment| classify_segment(pattern, segment))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen: Vec<&str> = Vec::new();
        for segment in &segments {
            if let PatternSegmentType::Capture(name) = segment {
                if seen.contains(&name.as_str()) {
                    return Err(PatternError::DuplicateCapture {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
                seen.push(name);
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// Matches a concrete path, returning the bound captures
    ///
    /// Segment counts must agree, literals compare exactly and every
    /// capture needs a non-empty segment. The path is taken as-is.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let path_segments = split_segments(path)?;
        if path_segments.len() != self.segments.len() {
            return None;
        }

        self.segments
            .iter()
            .zip(path_segments)
            .try_fold(Params::new(), |mut params, (spec, segment)| match spec {
                PatternSegmentType::Static(literal) => (literal == segment).then_some(params),
                PatternSegmentType::Capture(_) if segment.is_empty() => None,
                PatternSegmentType::Capture(name) => {
                    params.insert(name.clone(), segment.to_string());
                    Some(params)
                }
            })
    }

    /// The pattern text this was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[PatternSegmentType] {
        &self.segments
    }

    /// Capture names in declaration order
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            PatternSegmentType::Capture(name) => Some(name.as_str()),
            PatternSegmentType::Static(_) => None,
        })
    }
}

impl std::fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
