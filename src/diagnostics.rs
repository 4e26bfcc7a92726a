use serde::Serialize;

/// Ordered, non-fatal data-quality warnings produced during a run.
///
/// Each stage returns its own `Diagnostics` and the caller merges them, so
/// warnings stay in the order the stages produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning. It is also emitted as a `tracing` event so verbose
    /// runs show it in context with the surrounding debug output.
    pub fn warn(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!("{}", msg);
        self.warnings.push(msg);
    }

    /// Append all warnings from another stage
    pub fn merge(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().map(String::as_str)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.warnings.iter().any(|w| w.contains(needle))
    }

    pub fn into_vec(self) -> Vec<String> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_keeps_order() {
        let mut diag = Diagnostics::new();
        diag.warn("first");
        diag.warn(format!("second {}", 2));
        assert_eq!(diag.into_vec(), vec!["first".to_string(), "second 2".to_string()]);
    }

    #[test]
    fn test_merge_appends() {
        let mut a = Diagnostics::new();
        a.warn("a");
        let mut b = Diagnostics::new();
        b.warn("b");
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(a.contains("b"));
    }

    #[test]
    fn test_serializes_as_list() {
        let mut diag = Diagnostics::new();
        diag.warn("missing set");
        assert_eq!(serde_json::to_string(&diag).unwrap(), r#"["missing set"]"#);
    }
}
