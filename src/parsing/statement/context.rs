/// The two sticky labels that qualify every line item.
///
/// Marker rows overwrite a label; item rows only read it. An item therefore
/// inherits the axis and abstract of the nearest marker rows above it, or the
/// empty string when no such row has been seen yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextTracker {
    axis: String,
    r#abstract: String,
}

/// Axis and abstract in force for one line item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemContext {
    pub axis: String,
    pub r#abstract: String,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_axis(&mut self, axis: impl Into<String>) {
        self.axis = axis.into();
    }

    pub fn enter_abstract(&mut self, r#abstract: impl Into<String>) {
        self.r#abstract = r#abstract.into();
    }

    pub fn snapshot(&self) -> ItemContext {
        ItemContext {
            axis: self.axis.clone(),
            r#abstract: self.r#abstract.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_before_any_marker() {
        let tracker = ContextTracker::new();
        assert_eq!(tracker.snapshot(), ItemContext::default());
    }

    #[test]
    fn test_markers_are_sticky_and_independent() {
        let mut tracker = ContextTracker::new();
        tracker.enter_abstract("defref_us-gaap_AssetsAbstract");
        let first = tracker.snapshot();

        tracker.enter_axis("defref_us-gaap_StatementBusinessSegmentsAxis");
        let second = tracker.snapshot();

        tracker.enter_abstract("defref_us-gaap_LiabilitiesAbstract");
        let third = tracker.snapshot();

        assert_eq!(first.axis, "");
        assert_eq!(first.r#abstract, "defref_us-gaap_AssetsAbstract");
        assert_eq!(second.axis, "defref_us-gaap_StatementBusinessSegmentsAxis");
        assert_eq!(second.r#abstract, "defref_us-gaap_AssetsAbstract");
        assert_eq!(third.axis, "defref_us-gaap_StatementBusinessSegmentsAxis");
        assert_eq!(third.r#abstract, "defref_us-gaap_LiabilitiesAbstract");
    }
}
