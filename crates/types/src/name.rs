use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reasons a dotted name or a single label is rejected before hashing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("name `{name}` has an empty label at position {position}")]
    EmptyLabel { name: String, position: usize },
    #[error("name `{name}` contains invalid character {character:?}")]
    InvalidCharacter { name: String, character: char },
    #[error("label `{label}` must not contain '.'")]
    DottedLabel { label: String },
}

fn check_characters(name: &str, label: &str) -> Result<(), NameError> {
    if let Some(character) = label
        .chars()
        .find(|c| c.is_whitespace() || c.is_control())
    {
        return Err(NameError::InvalidCharacter {
            name: name.to_string(),
            character,
        });
    }
    Ok(())
}

/// A single component of a name, e.g. `bar` in `1.bar.eth`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    pub fn parse(label: impl Into<String>) -> Result<Self, NameError> {
        let label = label.into();
        if label.is_empty() {
            return Err(NameError::EmptyLabel {
                name: label,
                position: 0,
            });
        }
        if label.contains('.') {
            return Err(NameError::DottedLabel { label });
        }
        check_characters(&label, &label)?;
        Ok(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Label> for String {
    fn from(value: Label) -> Self {
        value.0
    }
}

impl TryFrom<String> for Label {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Label::parse(value)
    }
}

/// A validated dotted hierarchical name. The empty name is the tree root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// The root of the domain tree.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Validate a dotted name.
    ///
    /// Empty interior, leading or trailing labels (`a..b`, `.eth`, `eth.`)
    /// are rejected rather than collapsed.
    pub fn parse(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() {
            return Ok(Self(name));
        }
        for (position, label) in name.split('.').enumerate() {
            if label.is_empty() {
                return Err(NameError::EmptyLabel {
                    name: name.clone(),
                    position,
                });
            }
            check_characters(&name, label)?;
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels ordered root to leaf, the order in which the tree is walked.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        let inner = if self.0.is_empty() {
            None
        } else {
            Some(self.0.rsplit('.'))
        };
        inner.into_iter().flatten()
    }

    /// Number of labels (zero for the root).
    pub fn depth(&self) -> usize {
        self.labels().count()
    }

    /// `label.self`, or just `label` when `self` is the root.
    pub fn child(&self, label: &Label) -> Name {
        if self.is_root() {
            Name(label.as_str().to_string())
        } else {
            Name(format!("{}.{}", label.as_str(), self.0))
        }
    }

    /// Split into the leftmost label and the parent name.
    pub fn split_leaf(&self) -> Option<(Label, Name)> {
        if self.is_root() {
            return None;
        }
        let (leaf, parent) = match self.0.split_once('.') {
            Some((leaf, parent)) => (leaf, parent),
            None => (self.0.as_str(), ""),
        };
        Some((Label(leaf.to_string()), Name(parent.to_string())))
    }

    pub fn parent(&self) -> Option<Name> {
        self.split_leaf().map(|(_, parent)| parent)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Name> for String {
    fn from(value: Name) -> Self {
        value.0
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Name::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_walk_root_to_leaf() {
        let name = Name::parse("1.bar.eth").unwrap();
        let labels: Vec<_> = name.labels().collect();
        assert_eq!(labels, vec!["eth", "bar", "1"]);
        assert_eq!(name.depth(), 3);
    }

    #[test]
    fn empty_name_is_root() {
        let root = Name::parse("").unwrap();
        assert!(root.is_root());
        assert_eq!(root.labels().count(), 0);
        assert!(root.split_leaf().is_none());
    }

    #[test]
    fn interior_empty_label_rejected() {
        let err = Name::parse("a..b").unwrap_err();
        assert_eq!(
            err,
            NameError::EmptyLabel {
                name: "a..b".into(),
                position: 1
            }
        );
    }

    #[test]
    fn leading_and_trailing_dots_rejected() {
        assert!(Name::parse(".eth").is_err());
        assert!(Name::parse("eth.").is_err());
        assert!(Name::parse(".").is_err());
    }

    #[test]
    fn whitespace_rejected() {
        let err = Name::parse("foo bar.eth").unwrap_err();
        assert!(matches!(err, NameError::InvalidCharacter { character: ' ', .. }));
    }

    #[test]
    fn child_and_split_are_inverse() {
        let parent = Name::parse("bar.eth").unwrap();
        let label = Label::parse("1").unwrap();
        let child = parent.child(&label);
        assert_eq!(child.as_str(), "1.bar.eth");

        let (leaf, back) = child.split_leaf().unwrap();
        assert_eq!(leaf, label);
        assert_eq!(back, parent);
        assert_eq!(Name::root().child(&label).as_str(), "1");
    }

    #[test]
    fn label_rejects_dots_and_empty() {
        assert!(matches!(
            Label::parse("a.b").unwrap_err(),
            NameError::DottedLabel { .. }
        ));
        assert!(Label::parse("").is_err());
        assert!(Label::parse("ok").is_ok());
    }
}
