//! Wires
//!
//! A wire is a directed pin-to-pin connection inside a custom component. It
//! carries no logic: it propagates its driver's value and forces the driver
//! to be current before the target is read.

use std::fmt;
use std::str::FromStr;

use super::id::PinId;

/// A resolved connection between two pin instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wire {
    /// The driving pin: a child's output or the owner's own boundary input.
    pub from: PinId,

    /// The driven pin: a child's input or the owner's own boundary output.
    pub to: PinId,
}

impl Wire {
    pub fn new(from: PinId, to: PinId) -> Self {
        Self { from, to }
    }
}

/// A pin reference as written in a template, relative to the component
/// being defined.
///
/// `"carry"` names one of the component's own boundary pins, `"xor.a"` names
/// pin `a` of the direct child `xor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinPath {
    pub child: Option<String>,
    pub pin: String,
}

impl PinPath {
    /// A boundary pin of the component being defined.
    pub fn boundary(pin: impl Into<String>) -> Self {
        Self {
            child: None,
            pin: pin.into(),
        }
    }

    /// A pin of a direct child.
    pub fn child(child: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            child: Some(child.into()),
            pin: pin.into(),
        }
    }
}

/// A pin path string was empty or had empty segments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed pin path `{0}`, expected `pin` or `child.pin`")]
pub struct PinPathError(pub String);

impl FromStr for PinPath {
    type Err = PinPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PinPathError(s.to_string());
        match s.split_once('.') {
            None if !s.is_empty() => Ok(Self::boundary(s)),
            Some((child, pin)) if !child.is_empty() && !pin.is_empty() && !pin.contains('.') => {
                Ok(Self::child(child, pin))
            }
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for PinPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.child {
            Some(child) => write!(f, "{}.{}", child, self.pin),
            None => f.write_str(&self.pin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_boundary_and_child_paths() {
        assert_eq!("in".parse::<PinPath>().unwrap(), PinPath::boundary("in"));
        assert_eq!("n1.a".parse::<PinPath>().unwrap(), PinPath::child("n1", "a"));
    }

    #[test]
    fn reject_malformed_paths() {
        for bad in ["", ".a", "n1.", "a.b.c"] {
            assert!(bad.parse::<PinPath>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn display_matches_parse_input() {
        assert_eq!(PinPath::child("xor", "y").to_string(), "xor.y");
        assert_eq!(PinPath::boundary("sum").to_string(), "sum");
    }
}
