//! Lightweight string-level type matching.
//!
//! A [`TypePattern`] compiles a parameterized spec into alternating literal
//! and capture segments, then matches concrete type strings without building
//! a tree. It exists for the cheap cases (menu filtering, one-off checks on
//! already rendered types) where full unification is overkill.

use std::fmt;

use rustc_hash::FxHashMap;

/// A compiled single-shot matcher for one parameterized type string.
///
/// Matching is textual and whitespace-exact: `map[$K]$V` matches
/// `map[int]string` but not `map[ int ]string`. Captures take the shortest
/// bracket-balanced chunk that lets the following literal match.
#[derive(Debug, Clone)]
pub struct TypePattern {
    source: String,
    /// Literal text before the first capture.
    lead: String,
    /// One entry per `$param`: the parameter name and the literal text that
    /// must follow its capture. Only the final literal may be empty.
    segments: Vec<(String, String)>,
}

/// Why a pattern failed to compile or match.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternError {
    /// Two captures with no literal between them cannot be split apart.
    AdjacentParams { first: String, second: String },
    /// A `$` with no identifier after it.
    BareDollar { at: usize },
    /// The text does not fit the pattern's literal skeleton.
    NoMatch { pattern: String, text: String },
    /// One parameter would need two different captures.
    CaptureConflict {
        param: String,
        first: String,
        second: String,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdjacentParams { first, second } => {
                write!(f, "adjacent parameters `${first}` and `${second}` cannot be split")
            }
            Self::BareDollar { at } => write!(f, "`$` without a parameter name at offset {at}"),
            Self::NoMatch { pattern, text } => {
                write!(f, "`{text}` does not match pattern `{pattern}`")
            }
            Self::CaptureConflict {
                param,
                first,
                second,
            } => {
                write!(
                    f,
                    "parameter `${param}` captured as both `{first}` and `{second}`"
                )
            }
        }
    }
}

impl std::error::Error for PatternError {}

impl TypePattern {
    /// Compile a spec containing `$name` parameter tokens.
    pub fn compile(spec: &str) -> Result<TypePattern, PatternError> {
        let mut lead = String::new();
        let mut segments: Vec<(String, String)> = Vec::new();
        let mut chars = spec.char_indices().peekable();

        while let Some((at, c)) = chars.next() {
            if c != '$' {
                match segments.last_mut() {
                    Some((_, literal)) => literal.push(c),
                    None => lead.push(c),
                }
                continue;
            }

            let mut name = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(PatternError::BareDollar { at });
            }
            if let Some((prev, literal)) = segments.last() {
                if literal.is_empty() {
                    return Err(PatternError::AdjacentParams {
                        first: prev.clone(),
                        second: name,
                    });
                }
            }
            segments.push((name, String::new()));
        }

        Ok(TypePattern {
            source: spec.to_string(),
            lead,
            segments,
        })
    }

    /// The spec this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parameter names in order of first appearance, deduplicated.
    pub fn params(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.segments {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Whether `text` fits the pattern's shape with consistent captures.
    pub fn matches(&self, text: &str) -> bool {
        self.infer(text).is_ok()
    }

    /// Match `text` and return the parameter captures.
    pub fn infer(&self, text: &str) -> Result<FxHashMap<String, String>, PatternError> {
        let no_match = || PatternError::NoMatch {
            pattern: self.source.clone(),
            text: text.to_string(),
        };

        let mut rest = text.strip_prefix(self.lead.as_str()).ok_or_else(no_match)?;
        if self.segments.is_empty() {
            return if rest.is_empty() {
                Ok(FxHashMap::default())
            } else {
                Err(no_match())
            };
        }

        let mut captures: FxHashMap<String, String> = FxHashMap::default();
        for (i, (name, literal)) in self.segments.iter().enumerate() {
            let last = i + 1 == self.segments.len();
            let (captured, after) = capture(rest, literal, last).ok_or_else(no_match)?;
            if let Some(previous) = captures.get(name.as_str()) {
                if previous != captured {
                    return Err(PatternError::CaptureConflict {
                        param: name.clone(),
                        first: previous.clone(),
                        second: captured.to_string(),
                    });
                }
            } else {
                captures.insert(name.clone(), captured.to_string());
            }
            rest = after;
        }
        if rest.is_empty() {
            Ok(captures)
        } else {
            Err(no_match())
        }
    }
}

/// Take the shortest non-empty bracket-balanced prefix of `text` after which
/// `literal` matches. For the final segment the literal must reach the end
/// of the text exactly. Returns the capture and the text after the literal.
fn capture<'t>(text: &'t str, literal: &str, last: bool) -> Option<(&'t str, &'t str)> {
    let mut depth: i32 = 0;
    for (i, c) in text.char_indices() {
        if i > 0 && depth == 0 {
            let rest = &text[i..];
            let hit = if last {
                rest == literal
            } else {
                rest.starts_with(literal)
            };
            if hit {
                return Some((&text[..i], &rest[literal.len()..]));
            }
        }
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    // The capture may also run to the very end of the text.
    if depth == 0 && !text.is_empty() && literal.is_empty() && last {
        return Some((text, ""));
    }
    None
}
