//! The module/action permission matrix for one identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Actions a permission module grants or denies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Assign,
}

/// Full module → action → bool authorization table for one identity.
///
/// The matrix is always replaced wholesale — from a full reload or from a
/// pushed permission-change event. There is deliberately no merge API:
/// partial pushes are unsupported, so a module absent from a replacement
/// payload evaluates to denied rather than inheriting stale entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix {
    modules: BTreeMap<String, BTreeMap<Action, bool>>,
}

impl PermissionMatrix {
    /// Create an empty matrix (denies everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matrix from (module, action, allowed) entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Action, bool)>,
        S: Into<String>,
    {
        let mut matrix = Self::new();
        for (module, action, allowed) in entries {
            matrix
                .modules
                .entry(module.into())
                .or_default()
                .insert(action, allowed);
        }
        matrix
    }

    /// Total lookup: unknown module/action pairs evaluate to `false`.
    pub fn allows(&self, module: &str, action: Action) -> bool {
        self.modules
            .get(module)
            .and_then(|actions| actions.get(&action))
            .copied()
            .unwrap_or(false)
    }

    /// Whether the matrix contains any entry for `module`.
    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Replace the entire matrix with `other`.
    pub fn replace(&mut self, other: PermissionMatrix) {
        self.modules = other.modules;
    }

    /// Module names present in the matrix.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_pairs_deny() {
        let matrix = PermissionMatrix::from_entries([("manageTasks", Action::Create, true)]);
        assert!(matrix.allows("manageTasks", Action::Create));
        assert!(!matrix.allows("manageTasks", Action::Delete));
        assert!(!matrix.allows("manageTenants", Action::Read));
    }

    #[test]
    fn replace_is_wholesale() {
        let mut matrix = PermissionMatrix::from_entries([
            ("manageProjects", Action::Update, true),
            ("viewReports", Action::Read, true),
        ]);
        matrix.replace(PermissionMatrix::from_entries([(
            "manageTasks",
            Action::Create,
            true,
        )]));
        assert!(matrix.allows("manageTasks", Action::Create));
        // Modules absent from the replacement must not survive.
        assert!(!matrix.allows("manageProjects", Action::Update));
        assert!(!matrix.has_module("viewReports"));
    }

    #[test]
    fn wire_shape_is_nested_maps() {
        let json = r#"{"manageTasks":{"create":true,"delete":false}}"#;
        let matrix: PermissionMatrix = serde_json::from_str(json).unwrap();
        assert!(matrix.allows("manageTasks", Action::Create));
        assert!(!matrix.allows("manageTasks", Action::Delete));
    }
}
