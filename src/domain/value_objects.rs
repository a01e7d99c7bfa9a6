use serde::{Deserialize, Serialize};

/// Attribute names the differ skips (e.g. `cardinality`, which drifts with
/// data volume rather than with the schema).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredAttributes(pub Vec<String>);

impl IgnoredAttributes {
    pub fn contains(&self, attribute: &str) -> bool {
        self.0.iter().any(|a| a.eq_ignore_ascii_case(attribute))
    }
}
