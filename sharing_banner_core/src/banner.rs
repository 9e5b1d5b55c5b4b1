//! Banner presentation state machine.
//!
//! ```text
//!            status = true                       status = true
//!   ┌────────┐ ──────────────▶ ┌─────────┐ ◀─────────────┐
//!   │ Hidden │                  │ Showing │ ──────────────┘
//!   └────────┘ ◀────────────── └─────────┘
//!     ▲    │    status = false
//!     └────┘
//!   status = false
//! ```
//!
//! Showing is two-phased: the markup is injected in the collapsed visual
//! state, and the expanded state is applied one scheduler tick later (see
//! [`BannerPresenter::expand`]) so the browser renders the collapsed frame
//! first and the height transition is visible. Every show bumps a
//! generation; an expand only lands on the show it was issued for.

use core::fmt;

use crate::placeholder::{Placeholder, PlaceholderProvider, PlaceholderRegion};

/// Whether the banner is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BannerState {
    /// Not shown (initial state).
    #[default]
    Hidden,

    /// Shown.
    Showing,
}

/// A change of [`BannerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// `Hidden` to `Showing`.
    Show,

    /// `Showing` to `Hidden`.
    Hide,
}

/// The step (if any) the latest sharing status calls for.
#[must_use]
pub const fn transition(state: BannerState, shared: bool) -> Option<Step> {
    match (state, shared) {
        (BannerState::Hidden, true) => Some(Step::Show),
        (BannerState::Showing, false) => Some(Step::Hide),
        (BannerState::Hidden, false) | (BannerState::Showing, true) => None,
    }
}

/// Declarative visual state of injected banner markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VisualState {
    /// Zero height: no expanded class, no inline height.
    Collapsed,

    /// Expanded class plus an inline `height`.
    Expanded {
        /// CSS height of the expanded banner.
        height: String,
    },
}

/// What [`BannerPresenter::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Markup injected collapsed; call [`BannerPresenter::expand`] with
    /// [`BannerPresenter::generation`] on the next tick.
    Shown,

    /// Banner collapsed.
    Hidden,

    /// Nothing to do.
    Unchanged,

    /// Should have shown, but no placeholder was available.
    Aborted,
}

/// Drives a banner inside a host placeholder.
pub struct BannerPresenter<P: PlaceholderProvider> {
    provider: P,
    placeholder: Option<P::Placeholder>,
    state: BannerState,
    generation: u64,
    height: String,
}

impl<P: PlaceholderProvider> BannerPresenter<P> {
    /// Create a hidden presenter; no placeholder is acquired until the
    /// first show.
    #[must_use]
    pub fn new(provider: P, height: impl Into<String>) -> Self {
        Self {
            provider,
            placeholder: None,
            state: BannerState::Hidden,
            generation: 0,
            height: height.into(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BannerState {
        self.state
    }

    /// Number of shows so far; identifies the current one.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a placeholder is currently held.
    #[must_use]
    pub const fn has_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Apply the latest sharing status.
    ///
    /// `markup` is only rendered when the banner is about to be shown.
    pub fn apply(&mut self, shared: bool, markup: impl FnOnce() -> String) -> Transition {
        match transition(self.state, shared) {
            None => Transition::Unchanged,
            Some(Step::Show) => {
                let Some(placeholder) = self.placeholder() else {
                    tracing::error!(
                        region = PlaceholderRegion::Top.name(),
                        "placeholder region not available, banner not shown"
                    );
                    return Transition::Aborted;
                };
                placeholder.inject(&markup());
                placeholder.apply(&VisualState::Collapsed);
                self.state = BannerState::Showing;
                self.generation += 1;
                tracing::debug!(generation = self.generation, "banner shown");
                Transition::Shown
            }
            Some(Step::Hide) => {
                if let Some(placeholder) = self.placeholder.as_mut() {
                    placeholder.apply(&VisualState::Collapsed);
                }
                self.state = BannerState::Hidden;
                tracing::debug!("banner hidden");
                Transition::Hidden
            }
        }
    }

    /// Apply the expanded visual state if the banner is still in the show
    /// numbered `generation`.
    ///
    /// Returns whether anything was applied.
    pub fn expand(&mut self, generation: u64) -> bool {
        if self.state != BannerState::Showing || self.generation != generation {
            return false;
        }

        let Some(placeholder) = self.placeholder.as_mut() else {
            return false;
        };
        placeholder.apply(&VisualState::Expanded {
            height: self.height.clone(),
        });
        true
    }

    /// Release the placeholder, if held, and return to `Hidden`.
    pub fn teardown(&mut self) {
        if let Some(placeholder) = self.placeholder.take() {
            tracing::debug!("releasing banner placeholder");
            placeholder.release();
        }
        self.state = BannerState::Hidden;
    }

    fn placeholder(&mut self) -> Option<&mut P::Placeholder> {
        if self.placeholder.is_none() {
            self.placeholder = self.provider.try_create(PlaceholderRegion::Top);
        }
        self.placeholder.as_mut()
    }
}

impl<P: PlaceholderProvider + fmt::Debug> fmt::Debug for BannerPresenter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BannerPresenter")
            .field("provider", &self.provider)
            .field("has_placeholder", &self.placeholder.is_some())
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{PlaceholderEvent, RecordingPlaceholders};

    fn markup() -> String {
        "<div>banner</div>".to_owned()
    }

    fn expanded() -> PlaceholderEvent {
        PlaceholderEvent::Applied(VisualState::Expanded {
            height: "40px".into(),
        })
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(transition(BannerState::Hidden, true), Some(Step::Show));
        assert_eq!(transition(BannerState::Hidden, false), None);
        assert_eq!(transition(BannerState::Showing, true), None);
        assert_eq!(transition(BannerState::Showing, false), Some(Step::Hide));
    }

    #[test]
    fn test_show_injects_collapsed_then_expands() {
        let placeholders = RecordingPlaceholders::new();
        let mut presenter = BannerPresenter::new(placeholders.clone(), "40px");

        assert_eq!(presenter.apply(true, markup), Transition::Shown);
        assert_eq!(presenter.state(), BannerState::Showing);
        assert!(presenter.expand(presenter.generation()));

        assert_eq!(
            placeholders.events(),
            vec![
                PlaceholderEvent::Created(PlaceholderRegion::Top),
                PlaceholderEvent::Injected(markup()),
                PlaceholderEvent::Applied(VisualState::Collapsed),
                expanded(),
            ]
        );
    }

    #[test]
    fn test_repeated_true_renders_once() {
        let placeholders = RecordingPlaceholders::new();
        let mut presenter = BannerPresenter::new(placeholders.clone(), "40px");

        assert_eq!(presenter.apply(true, markup), Transition::Shown);
        presenter.expand(presenter.generation());
        assert_eq!(
            presenter.apply(true, || unreachable!("markup rendered twice")),
            Transition::Unchanged
        );

        assert_eq!(placeholders.injected_count(), 1);
        assert_eq!(placeholders.created_count(), 1);
    }

    #[test]
    fn test_show_hide_show_reuses_placeholder() {
        let placeholders = RecordingPlaceholders::new();
        let mut presenter = BannerPresenter::new(placeholders.clone(), "40px");

        assert_eq!(presenter.apply(true, markup), Transition::Shown);
        presenter.expand(presenter.generation());
        assert_eq!(presenter.apply(false, markup), Transition::Hidden);
        assert_eq!(presenter.apply(true, markup), Transition::Shown);
        presenter.expand(presenter.generation());

        assert_eq!(placeholders.created_count(), 1);
        assert_eq!(placeholders.injected_count(), 2);
        assert_eq!(
            placeholders.visual_history(),
            vec![
                VisualState::Collapsed,
                VisualState::Expanded {
                    height: "40px".into()
                },
                VisualState::Collapsed,
                VisualState::Collapsed,
                VisualState::Expanded {
                    height: "40px".into()
                },
            ]
        );
    }

    #[test]
    fn test_false_while_hidden_is_noop() {
        let placeholders = RecordingPlaceholders::new();
        let mut presenter = BannerPresenter::new(placeholders.clone(), "40px");

        assert_eq!(presenter.apply(false, markup), Transition::Unchanged);
        assert!(placeholders.events().is_empty());
    }

    #[test]
    fn test_expand_after_hide_is_noop() {
        let placeholders = RecordingPlaceholders::new();
        let mut presenter = BannerPresenter::new(placeholders.clone(), "40px");

        presenter.apply(true, markup);
        let shown = presenter.generation();
        presenter.apply(false, markup);
        assert!(!presenter.expand(shown));
        assert!(!placeholders.events().contains(&expanded()));
    }

    #[test]
    fn test_expand_from_an_earlier_show_is_ignored() {
        let placeholders = RecordingPlaceholders::new();
        let mut presenter = BannerPresenter::new(placeholders.clone(), "40px");

        presenter.apply(true, markup);
        let first = presenter.generation();
        presenter.apply(false, markup);
        presenter.apply(true, markup);
        let second = presenter.generation();

        assert!(!presenter.expand(first));
        assert_eq!(placeholders.current_visual(), Some(VisualState::Collapsed));
        assert!(presenter.expand(second));
        assert_eq!(placeholders.visual_history().len(), 4);
    }

    #[test]
    fn test_missing_placeholder_aborts_and_retries_next_time() {
        let placeholders = RecordingPlaceholders::new();
        placeholders.set_available(false);
        let mut presenter = BannerPresenter::new(placeholders.clone(), "40px");

        assert_eq!(presenter.apply(true, markup), Transition::Aborted);
        assert_eq!(presenter.state(), BannerState::Hidden);
        assert!(!presenter.expand(presenter.generation()));

        placeholders.set_available(true);
        assert_eq!(presenter.apply(true, markup), Transition::Shown);
    }

    #[test]
    fn test_teardown_releases_placeholder() {
        let placeholders = RecordingPlaceholders::new();
        let mut presenter = BannerPresenter::new(placeholders.clone(), "40px");

        presenter.apply(true, markup);
        presenter.teardown();

        assert!(!presenter.has_placeholder());
        assert_eq!(presenter.state(), BannerState::Hidden);
        assert_eq!(placeholders.events().last(), Some(&PlaceholderEvent::Released));
    }

    #[test]
    fn test_teardown_without_placeholder_is_quiet() {
        let placeholders = RecordingPlaceholders::new();
        let mut presenter = BannerPresenter::new(placeholders.clone(), "40px");

        presenter.teardown();
        assert!(placeholders.events().is_empty());
    }
}
