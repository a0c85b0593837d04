//! Parser for the include selector grammar.
//!
//! ```text
//! selector := field (',' field)*
//! field    := name ['{' selector '}'] (':' param)*
//! param    := name '(' value ')'
//! ```
//!
//! For example `pets{id,name,owner{id,name},photos:limit(3)}:limit(5):offset(10)`.
//! Whitespace is ignored anywhere in the input.

use tracing::trace;

use super::set::{IncludeSet, ParamValue};

/// Anything that can turn an include string into an [`IncludeSet`].
pub trait IncludeParse: Send + Sync {
    /// Parse the given include string.
    fn parse(&self, input: &str) -> IncludeSet;
}

/// The default include selector parser.
///
/// Parsing is lenient: unbalanced braces never fail, a `:` that does not
/// start a well-formed `name(value)` clause is dropped, and a parameter
/// clause with no owning key is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeParser;

impl IncludeParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse the given include string into an [`IncludeSet`].
    pub fn parse(&self, input: &str) -> IncludeSet {
        let chars: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
        let mut scan = Scan::default();

        let mut pos = 0;
        while pos < chars.len() {
            match chars[pos] {
                '{' => scan.open(),
                ',' => scan.flush(),
                '}' => scan.close(),
                ':' => {
                    if let Some((name, value, len)) = param_clause(&chars[pos..]) {
                        scan.param(name, value);
                        pos += len;
                        continue;
                    }
                }
                c => scan.buffer.push(c),
            }
            pos += 1;
        }
        scan.flush();

        trace!(
            input,
            keys = scan.keys.len(),
            params = scan.params.len(),
            "parsed include selector"
        );

        let mut includes = IncludeSet::from_keys(&scan.keys);
        for (owner, name, value) in scan.params {
            includes.set_param(owner, name, ParamValue::parse(&value));
        }
        includes
    }
}

impl IncludeParse for IncludeParser {
    fn parse(&self, input: &str) -> IncludeSet {
        IncludeParser::parse(self, input)
    }
}

#[derive(Default)]
struct Scan {
    buffer: String,
    ancestors: Vec<String>,
    closed: Option<String>,
    keys: Vec<String>,
    params: Vec<(String, String, String)>,
}

impl Scan {
    fn qualify(&self, key: &str) -> String {
        if self.ancestors.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.ancestors.join("."))
        }
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let key = self.qualify(&self.buffer);
            self.keys.push(key);
            self.buffer.clear();
        }
    }

    fn open(&mut self) {
        if !self.buffer.is_empty() {
            let key = self.qualify(&self.buffer);
            self.keys.push(key);
            self.ancestors.push(std::mem::take(&mut self.buffer));
        }
    }

    fn close(&mut self) {
        self.flush();
        if !self.ancestors.is_empty() {
            self.closed = Some(self.ancestors.join("."));
            self.ancestors.pop();
        }
    }

    fn param(&mut self, name: String, value: String) {
        let owner = if self.buffer.is_empty() {
            self.closed.clone()
        } else {
            Some(self.qualify(&self.buffer))
        };
        match owner {
            Some(owner) => self.params.push((owner, name, value)),
            None => trace!(param = %name, "ignoring include parameter without a key"),
        }
    }
}

/// Match `:name(value)` at the start of `chars`, returning the name, value
/// and the number of characters consumed.
fn param_clause(chars: &[char]) -> Option<(String, String, usize)> {
    let mut idx = 1;
    let name_start = idx;
    while idx < chars.len() && (chars[idx].is_ascii_alphanumeric() || chars[idx] == '_') {
        idx += 1;
    }
    if idx == name_start || chars.get(idx) != Some(&'(') {
        return None;
    }
    let name: String = chars[name_start..idx].iter().collect();

    idx += 1;
    let value_start = idx;
    while idx < chars.len() && chars[idx] != ')' {
        idx += 1;
    }
    if idx == value_start || idx >= chars.len() {
        return None;
    }
    let value: String = chars[value_start..idx].iter().collect();

    Some((name, value, idx + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> IncludeSet {
        IncludeParser::new().parse(input)
    }

    #[test]
    fn test_empty_string_gives_empty_set() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn test_child_includes() {
        let includes = parse("cast{actor,movie}");
        assert!(includes.has("cast"));
        assert!(includes.has("cast.actor"));
        assert!(includes.has("cast.movie"));
        assert_eq!(includes.base_keys(), vec!["cast".to_string()]);
    }

    #[test]
    fn test_includes_with_params() {
        let includes = parse("cast{actor,movies:limit(3)}:offset(5):anything(test)");
        assert!(includes.has("cast"));
        assert!(includes.has("cast.actor"));
        assert!(includes.has("cast.movies"));

        let cast = includes.params_for("cast");
        assert_eq!(cast.len(), 2);
        assert_eq!(cast["offset"], ParamValue::Int(5));
        assert_eq!(cast["anything"], ParamValue::String("test".into()));

        let movies = includes.params_for("cast.movies");
        assert_eq!(movies.len(), 1);
        assert_eq!(movies["limit"], ParamValue::Int(3));
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let includes = parse("title,summary, id,user{id, email} ");
        assert!(includes.has("title"));
        assert!(includes.has("user"));
        assert!(includes.has("user.id"));
        assert!(includes.has("user.email"));
    }

    #[test]
    fn test_deeply_nested() {
        let includes = parse("pets{id,owner{id,name},photos:limit(3)}:limit(5)");
        assert!(includes.has("pets.owner.name"));
        assert_eq!(includes.param("pets.photos", "limit"), Some(&ParamValue::Int(3)));
        assert_eq!(includes.param("pets", "limit"), Some(&ParamValue::Int(5)));
    }

    #[test]
    fn test_base_keys_round_trip() {
        let includes = parse("user{posts},comments,tags");
        let joined = includes.base_keys().join(",");
        assert_eq!(parse(&joined).base_keys(), includes.base_keys());
    }

    #[test]
    fn test_unbalanced_braces_are_lenient() {
        let includes = parse("user{posts");
        assert!(includes.has("user"));
        assert!(includes.has("user.posts"));

        let includes = parse("user}},posts");
        assert!(includes.has("user"));
        assert!(includes.has("posts"));
    }

    #[test]
    fn test_malformed_param_is_dropped() {
        let includes = parse("user:limit,posts");
        assert!(includes.has("userlimit"));
        assert!(includes.has("posts"));
        assert!(!includes.has_params());
    }

    #[test]
    fn test_param_without_owner_is_ignored() {
        let includes = parse(":limit(5)user");
        assert!(includes.has("user"));
        assert!(!includes.has_params());
    }
}
