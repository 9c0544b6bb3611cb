//! Score explanation trees.

use std::fmt;

use serde::{Deserialize, Serialize};

const MERGED_MESSAGE: &str = "sum of coalesced matches:";

/// A node describing how part of a score was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Value contributed by this node.
    pub value: f64,
    /// Human-readable description.
    pub message: String,
    /// Contributions this value was derived from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Explanation>,
}

impl Explanation {
    /// Create a leaf explanation.
    pub fn new<S: Into<String>>(value: f64, message: S) -> Self {
        Explanation {
            value,
            message: message.into(),
            children: Vec::new(),
        }
    }

    /// Create an explanation derived from child contributions.
    pub fn with_children<S: Into<String>>(
        value: f64,
        message: S,
        children: Vec<Explanation>,
    ) -> Self {
        Explanation {
            value,
            message: message.into(),
            children,
        }
    }

    /// Combine two explanations of matches for the same document.
    ///
    /// The resulting value is the sum of both. Repeated merges stay flat.
    pub fn merge_with(self, other: Explanation) -> Explanation {
        let value = self.value + other.value;
        let mut children = if self.message == MERGED_MESSAGE {
            self.children
        } else {
            vec![self]
        };
        if other.message == MERGED_MESSAGE {
            children.extend(other.children);
        } else {
            children.push(other);
        }
        Explanation::with_children(value, MERGED_MESSAGE, children)
    }

    /// Merge optional explanations, keeping whichever side is present.
    pub fn merge_options(
        left: Option<Explanation>,
        right: Option<Explanation>,
    ) -> Option<Explanation> {
        match (left, right) {
            (Some(l), Some(r)) => Some(l.merge_with(r)),
            (l, None) => l,
            (None, r) => r,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} = {}", "", self.value, self.message, indent = depth * 2)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sums_values() {
        let a = Explanation::new(1.5, "a");
        let b = Explanation::new(2.0, "b");
        let merged = a.merge_with(b);
        assert!((merged.value - 3.5).abs() < 1e-12);
        assert_eq!(merged.children.len(), 2);
    }

    #[test]
    fn test_repeated_merge_is_flat() {
        let merged = Explanation::new(1.0, "a")
            .merge_with(Explanation::new(1.0, "b"))
            .merge_with(Explanation::new(1.0, "c"));
        assert_eq!(merged.children.len(), 3);
        assert!((merged.value - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_merge_options() {
        let only = Explanation::merge_options(None, Some(Explanation::new(2.0, "x")));
        assert_eq!(only.unwrap().message, "x");
        assert!(Explanation::merge_options(None, None).is_none());
    }

    #[test]
    fn test_display() {
        let expl = Explanation::with_children(
            2.0,
            "sum of:",
            vec![Explanation::new(1.0, "a"), Explanation::new(1.0, "b")],
        );
        let text = expl.to_string();
        assert!(text.starts_with("2 = sum of:"));
        assert!(text.contains("  1 = a"));
    }
}
