//! Exposure levels and method safety
//!
//! The exposure level decides which kinds of members templates can see at
//! all. The safety policy is consulted for every method and accessor the
//! introspectors discover; under [`ExposureLevel::All`] it is bypassed.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::host::HostMethod;

/// Which members are visible to templates, from most to least permissive
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExposureLevel {
    /// Every public method and property, including unsafe ones
    All,
    /// Public methods and properties that the safety policy allows
    #[default]
    Safe,
    /// Properties only; no methods
    PropertiesOnly,
    /// Nothing is introspected
    Nothing,
}

impl ExposureLevel {
    /// Whether methods are introspected at this level
    pub fn exposes_methods(&self) -> bool {
        *self < ExposureLevel::PropertiesOnly
    }

    /// Whether the safety policy is consulted at this level
    pub fn checks_safety(&self) -> bool {
        *self >= ExposureLevel::Safe
    }
}

impl fmt::Display for ExposureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExposureLevel::All => "all",
            ExposureLevel::Safe => "safe",
            ExposureLevel::PropertiesOnly => "properties-only",
            ExposureLevel::Nothing => "nothing",
        };
        f.write_str(s)
    }
}

/// Decides whether a method may be exposed to templates
///
/// Called while a class table is being built. An implementation may look up
/// tables of other classes through the wrapper, but must not request the
/// table of the method's own class: that lookup waits on the build in
/// progress and never returns.
pub trait SafetyPolicy: Send + Sync {
    /// Whether the method is safe to call from a template
    fn is_safe_method(&self, method: &HostMethod) -> bool;
}

/// Methods that are never exposed under [`ExposureLevel::Safe`]
pub const DEFAULT_UNSAFE_METHODS: &[&str] = &[
    "*.finalize",
    "*.set_security_context",
    "Runtime.exec",
    "Runtime.exit",
    "Runtime.load_library",
    "Thread.stop",
    "Thread.suspend",
];

/// Deny-list of `Class.method` or `*.method` patterns
#[derive(Debug, Clone, Default)]
pub struct UnsafeMethods {
    /// `Class.method` entries
    qualified: FxHashSet<String>,
    /// Method names denied on every class (`*.method`)
    any_class: FxHashSet<String>,
}

impl UnsafeMethods {
    /// Create an empty deny-list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern; fails if it is not of the form `Class.method`
    pub fn add(&mut self, pattern: &str) -> Result<(), String> {
        let (class, method) = parse_pattern(pattern)?;
        if class == "*" {
            self.any_class.insert(method.to_string());
        } else {
            self.qualified.insert(pattern.to_string());
        }
        Ok(())
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.qualified.len() + self.any_class.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `Class.method` into its parts
pub(crate) fn parse_pattern(pattern: &str) -> Result<(&str, &str), String> {
    match pattern.rsplit_once('.') {
        Some((class, method)) if !class.is_empty() && !method.is_empty() => Ok((class, method)),
        _ => Err(format!(
            "unsafe method pattern must be Class.method: {}",
            pattern
        )),
    }
}

impl SafetyPolicy for UnsafeMethods {
    fn is_safe_method(&self, method: &HostMethod) -> bool {
        !self.any_class.contains(method.name()) && !self.qualified.contains(&method.qualified_name())
    }
}
