//! Path-based role classification.
//!
//! Name patterns (entry, test, config, type) always win over directory
//! rules, so `components/Button.test.tsx` is a test, not a component.

use crate::constants::{CONFIG_MARKERS, ENTRY_FILE_NAMES, TEST_DIRS, TEST_MARKERS, TYPE_SUFFIXES};
use crate::types::Role;

/// Directory segment rules, checked in order after the name patterns.
const DIRECTORY_ROLES: &[(&[&str], Role)] = &[
    (&["components"], Role::Component),
    (&["services", "api"], Role::Service),
    (&["utils", "lib"], Role::Utility),
    (&["pages"], Role::Page),
    (&["hooks"], Role::Hook),
    (&["context", "providers"], Role::Context),
    (&["features"], Role::Feature),
];

/// Classify a file by its project-relative identity. Exactly one role.
pub fn classify(id: &str) -> Role {
    let mut segments: Vec<&str> = id.split('/').collect();
    let file_name = segments.pop().unwrap_or_default();
    let dirs = segments;

    if ENTRY_FILE_NAMES.contains(&file_name) {
        return Role::Entry;
    }
    if TEST_MARKERS.iter().any(|m| file_name.contains(m))
        || dirs.iter().any(|d| TEST_DIRS.contains(d))
    {
        return Role::Test;
    }
    if CONFIG_MARKERS.iter().any(|m| file_name.contains(m)) {
        return Role::Config;
    }
    if TYPE_SUFFIXES.iter().any(|s| file_name.ends_with(s)) {
        return Role::Type;
    }

    DIRECTORY_ROLES
        .iter()
        .find(|(names, _)| dirs.iter().any(|d| names.contains(d)))
        .map(|(_, role)| *role)
        .unwrap_or(Role::Module)
}
