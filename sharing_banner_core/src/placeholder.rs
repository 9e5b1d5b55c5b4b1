//! Host-provided insertion points for banner markup.

use crate::banner::VisualState;

/// A region of the host page reserved for extension content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderRegion {
    /// Above the page content, below the suite bar.
    Top,
}

impl PlaceholderRegion {
    /// The host's name for this region.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            PlaceholderRegion::Top => "Top",
        }
    }
}

/// An acquired placeholder region.
pub trait Placeholder {
    /// Replace the region's content with `markup`.
    fn inject(&mut self, markup: &str);

    /// Bring the injected banner into `visual`.
    fn apply(&mut self, visual: &VisualState);

    /// Give the region back to the host.
    fn release(self);
}

/// Hands out placeholder regions.
pub trait PlaceholderProvider {
    /// The placeholder handle type.
    type Placeholder: Placeholder;

    /// Acquire `region`, or `None` if the host page does not offer it.
    fn try_create(&self, region: PlaceholderRegion) -> Option<Self::Placeholder>;
}
