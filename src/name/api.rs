use std::fmt;
use std::fmt::{Display, Formatter};

use pest::Parser;
use pest_derive::Parser;

use crate::runtime::ds::error::CoreError;

#[derive(Parser)]
#[grammar = "name/name_grammar.pest"] // relative to src
pub struct NameParser;

/// A parsed qualified name: the namespace path and the short name.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeName {
    pub namespace: Vec<String>,
    pub name: String,
}

impl TypeName {
    pub fn new(namespace: &[&str], name: &str) -> TypeName {
        TypeName {
            namespace: namespace.iter().map(|s| s.to_string()).collect(),
            name: name.to_string(),
        }
    }

    /// Parses a dotted name such as `"query.Cursor"`. The last segment is
    /// the short name; everything before it is the namespace path.
    pub fn parse(full: &str) -> Result<TypeName, CoreError> {
        let mut segments = parse_path(full)?;
        let name = match segments.pop() {
            Some(name) => name,
            None => return Err(CoreError::InvalidName(full.to_string())),
        };
        Ok(TypeName {
            namespace: segments,
            name,
        })
    }

    pub fn is_qualified(&self) -> bool {
        !self.namespace.is_empty()
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace.join("."), self.name)
        }
    }
}

/// Splits a dotted path into validated identifier segments.
pub fn parse_path(path: &str) -> Result<Vec<String>, CoreError> {
    let pairs = NameParser::parse(Rule::path, path)
        .map_err(|e| CoreError::InvalidName(e.to_string()))?;

    let mut segments = Vec::new();
    for pair in pairs.flatten() {
        if let Rule::identifier = pair.as_rule() {
            segments.push(pair.as_str().to_string());
        }
    }

    if segments.is_empty() {
        return Err(CoreError::InvalidName(path.to_string()));
    }
    Ok(segments)
}
