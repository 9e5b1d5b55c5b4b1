//! Tests for the navigation driver.

use core::time::Duration;
use std::sync::OnceLock;

use future_form::Sendable;
use sharing_banner_core::{
    BannerConfig, SharingBanner,
    banner::{BannerState, Transition, VisualState},
    context::PageContext,
    extension::{Activation, InitError, NavigationOutcome, SuppressReason},
    scope::Scope,
    storage::memory::MemoryStorage,
    test_utils::{
        ManualClock, MockSearchClient, PlaceholderEvent, RecordingPlaceholders, SearchResponse,
        StaticContext,
    },
    timer::FuturesTimerTimeout,
};
use testresult::TestResult;

const SITE_A: &str = "0b7b4f4b-8a6c-4a39-9a3d-1f5a0a3c1e01";
const SITE_B: &str = "5f0e3f0c-2d1f-4a7c-b0f2-7c9e3d0e8a02";
const WEB: &str = "c2d7d5a6-1e3b-4f8a-9c4d-2b6e8f0a1d03";

type TestBanner = SharingBanner<
    Sendable,
    MemoryStorage,
    ManualClock,
    MockSearchClient,
    FuturesTimerTimeout,
    RecordingPlaceholders,
    StaticContext,
>;

fn init_tracing() {
    static ONCE: OnceLock<()> = OnceLock::new();
    ONCE.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

struct Harness {
    banner: TestBanner,
    search: MockSearchClient,
    placeholders: RecordingPlaceholders,
    context: StaticContext,
    storage: MemoryStorage,
}

fn page(site_id: &str, site_url: &str) -> PageContext {
    PageContext {
        site_id: site_id.into(),
        web_id: WEB.into(),
        site_url: site_url.into(),
        web_url: format!("{site_url}/web"),
        ..PageContext::default()
    }
}

fn site_a() -> PageContext {
    page(SITE_A, "https://contoso.sharepoint.com/sites/a")
}

fn site_b() -> PageContext {
    page(SITE_B, "https://contoso.sharepoint.com/sites/b")
}

fn harness(config: BannerConfig, context: PageContext) -> Harness {
    init_tracing();
    let search = MockSearchClient::new();
    let placeholders = RecordingPlaceholders::new();
    let context = StaticContext::new(context);
    let storage = MemoryStorage::new();
    let banner = SharingBanner::new(
        config,
        storage.clone(),
        ManualClock::new(1_700_000_000_000),
        search.clone(),
        FuturesTimerTimeout,
        placeholders.clone(),
        context.clone(),
    );
    Harness {
        banner,
        search,
        placeholders,
        context,
        storage,
    }
}

fn expanded_class_is_applied(placeholders: &RecordingPlaceholders) -> bool {
    matches!(
        placeholders.current_visual(),
        Some(VisualState::Expanded { .. })
    )
}

#[tokio::test]
async fn test_shared_site_shows_and_expands() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search.respond(SITE_A, SearchResponse::rows(1));

    assert_eq!(h.banner.initialize()?, Activation::Active);
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Shown)
    );
    assert_eq!(h.banner.banner_state(), BannerState::Showing);
    assert_eq!(
        h.placeholders.current_visual(),
        Some(VisualState::Expanded {
            height: "40px".into()
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_unshared_site_shows_nothing() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search.respond(SITE_A, SearchResponse::rows(0));

    h.banner.initialize()?;
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Unchanged)
    );
    assert!(h.placeholders.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_repeated_navigation_within_site_renders_once() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search.respond(SITE_A, SearchResponse::rows(4));

    h.banner.initialize()?;
    h.banner.navigate().await;
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Unchanged)
    );

    assert_eq!(h.placeholders.injected_count(), 1);
    assert_eq!(h.placeholders.visual_history().len(), 2);
    assert_eq!(h.search.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_moving_between_sites_shows_hides_shows() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search.respond(SITE_A, SearchResponse::rows(1));
    h.search.respond(SITE_B, SearchResponse::rows(0));

    h.banner.initialize()?;
    h.banner.navigate().await;
    assert!(expanded_class_is_applied(&h.placeholders));

    h.context.set(site_b());
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Hidden)
    );
    assert_eq!(h.placeholders.current_visual(), Some(VisualState::Collapsed));

    h.context.set(site_a());
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Shown)
    );
    assert!(expanded_class_is_applied(&h.placeholders));
    assert_eq!(h.placeholders.created_count(), 1);
    assert_eq!(h.placeholders.injected_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_rendered_markup_substitutes_tokens() -> TestResult {
    let config = BannerConfig {
        message: "Shared content in {siteurl} (web {weburl})".into(),
        ..BannerConfig::default()
    };
    let h = harness(config, site_a());
    h.search.respond(SITE_A, SearchResponse::rows(1));

    h.banner.initialize()?;
    h.banner.navigate().await;

    let injected = h
        .placeholders
        .events()
        .into_iter()
        .find_map(|e| match e {
            PlaceholderEvent::Injected(markup) => Some(markup),
            _ => None,
        })
        .unwrap_or_default();
    assert!(injected.contains(
        "Shared content in https://contoso.sharepoint.com/sites/a \
         (web https://contoso.sharepoint.com/sites/a/web)"
    ));
    assert!(!injected.contains("{siteurl}"));
    assert!(!injected.contains("{weburl}"));
    Ok(())
}

#[tokio::test]
async fn test_excluded_site_is_never_resolved() -> TestResult {
    let config = BannerConfig {
        site_exclusion_list: vec!["https://contoso.sharepoint.com/sites/A/".into()],
        ..BannerConfig::default()
    };
    let h = harness(config, site_a());
    h.search.respond(SITE_A, SearchResponse::rows(1));

    assert_eq!(
        h.banner.initialize()?,
        Activation::Suppressed(SuppressReason::ExcludedSite)
    );
    assert_eq!(h.banner.navigate().await, NavigationOutcome::Inactive);
    assert_eq!(h.search.call_count(), 0);
    assert!(h.placeholders.events().is_empty());
    assert!(h.storage.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_external_user_is_suppressed_when_configured() -> TestResult {
    let mut context = site_a();
    context.is_external_user = true;
    let h = harness(BannerConfig::default(), context);
    h.search.respond(SITE_A, SearchResponse::rows(1));

    assert_eq!(
        h.banner.initialize()?,
        Activation::Suppressed(SuppressReason::ExternalUser)
    );
    assert_eq!(h.banner.navigate().await, NavigationOutcome::Inactive);
    assert_eq!(h.search.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_anonymous_user_is_suppressed_when_configured() -> TestResult {
    let mut context = site_a();
    context.is_anonymous_guest_user = true;
    let h = harness(BannerConfig::default(), context);

    assert_eq!(
        h.banner.initialize()?,
        Activation::Suppressed(SuppressReason::ExternalUser)
    );
    Ok(())
}

#[tokio::test]
async fn test_external_user_sees_banner_when_allowed() -> TestResult {
    let mut context = site_a();
    context.is_external_user = true;
    let config = BannerConfig {
        hidden_for_external_users: false,
        ..BannerConfig::default()
    };
    let h = harness(config, context);
    h.search.respond(SITE_A, SearchResponse::rows(1));

    assert_eq!(h.banner.initialize()?, Activation::Active);
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Shown)
    );
    Ok(())
}

#[tokio::test]
async fn test_navigation_before_initialize_is_inactive() {
    let h = harness(BannerConfig::default(), site_a());
    assert_eq!(h.banner.navigate().await, NavigationOutcome::Inactive);
    assert_eq!(h.search.call_count(), 0);
}

#[tokio::test]
async fn test_initialize_twice_fails() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.banner.initialize()?;
    assert_eq!(h.banner.initialize(), Err(InitError::AlreadyInitialized));
    Ok(())
}

#[tokio::test]
async fn test_initialize_without_context_fails() {
    let search = MockSearchClient::new();
    let banner: TestBanner = SharingBanner::new(
        BannerConfig::default(),
        MemoryStorage::new(),
        ManualClock::new(0),
        search,
        FuturesTimerTimeout,
        RecordingPlaceholders::new(),
        StaticContext::unavailable(),
    );
    assert_eq!(banner.initialize(), Err(InitError::ContextUnavailable));
}

#[tokio::test]
async fn test_search_failure_is_retried_next_navigation() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search.respond(SITE_A, SearchResponse::Fail);

    h.banner.initialize()?;
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Unchanged)
    );

    h.search.respond(SITE_A, SearchResponse::rows(1));
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Shown)
    );
    assert_eq!(h.search.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_placeholder_aborts_show() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search.respond(SITE_A, SearchResponse::rows(1));
    h.placeholders.set_available(false);

    h.banner.initialize()?;
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Aborted)
    );
    assert_eq!(h.banner.banner_state(), BannerState::Hidden);

    h.placeholders.set_available(true);
    assert_eq!(
        h.banner.navigate().await,
        NavigationOutcome::Applied(Transition::Shown)
    );
    Ok(())
}

#[tokio::test]
async fn test_stale_resolution_is_discarded() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search
        .respond(SITE_A, SearchResponse::Delayed(1, Duration::from_millis(100)));
    h.search.respond(SITE_B, SearchResponse::rows(0));
    h.banner.initialize()?;

    let slow = h.banner.navigate();
    let fast = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.context.set(site_b());
        h.banner.navigate().await
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(fast, NavigationOutcome::Applied(Transition::Unchanged));
    assert_eq!(slow, NavigationOutcome::Stale);
    assert_eq!(h.banner.banner_state(), BannerState::Hidden);
    assert!(h.placeholders.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_pending_expand_does_not_land_on_a_later_show() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search.respond(SITE_A, SearchResponse::rows(1));
    h.search.respond(SITE_B, SearchResponse::rows(0));
    h.banner.initialize()?;

    let (first, second, third) = tokio::join!(
        h.banner.navigate(),
        async {
            h.context.set(site_b());
            h.banner.navigate().await
        },
        async {
            h.context.set(site_a());
            h.banner.navigate().await
        },
    );

    assert_eq!(first, NavigationOutcome::Applied(Transition::Shown));
    assert_eq!(second, NavigationOutcome::Applied(Transition::Hidden));
    assert_eq!(third, NavigationOutcome::Applied(Transition::Shown));

    let expanded = VisualState::Expanded {
        height: "40px".into(),
    };
    assert_eq!(
        h.placeholders.visual_history(),
        vec![
            VisualState::Collapsed,
            VisualState::Collapsed,
            VisualState::Collapsed,
            expanded.clone(),
        ]
    );
    assert_eq!(h.placeholders.current_visual(), Some(expanded));
    Ok(())
}

#[tokio::test]
async fn test_web_scope_resolves_per_web() -> TestResult {
    let config = BannerConfig {
        scope: Scope::Web,
        ..BannerConfig::default()
    };
    let h = harness(config, site_a());
    h.search.respond(SITE_A, SearchResponse::rows(1));

    h.banner.initialize()?;
    h.banner.navigate().await;

    let queries = h.search.queries();
    assert_eq!(queries.len(), 1);
    assert!(
        queries[0]
            .query_template
            .contains(&format!("SiteId:{SITE_A} WebId:{WEB}"))
    );
    Ok(())
}

#[tokio::test]
async fn test_teardown_releases_and_stops() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search.respond(SITE_A, SearchResponse::rows(1));

    h.banner.initialize()?;
    h.banner.navigate().await;
    h.banner.teardown();

    assert_eq!(
        h.placeholders.events().last(),
        Some(&PlaceholderEvent::Released)
    );
    assert_eq!(h.banner.navigate().await, NavigationOutcome::Inactive);
    assert_eq!(h.banner.initialize(), Err(InitError::TornDown));
    assert_eq!(h.search.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_teardown_during_resolution_renders_nothing() -> TestResult {
    let h = harness(BannerConfig::default(), site_a());
    h.search
        .respond(SITE_A, SearchResponse::Delayed(1, Duration::from_millis(50)));
    h.banner.initialize()?;

    let navigation = h.banner.navigate();
    let teardown = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        h.banner.teardown();
    };
    let (outcome, ()) = tokio::join!(navigation, teardown);

    assert_eq!(outcome, NavigationOutcome::Inactive);
    assert!(h.placeholders.events().is_empty());
    Ok(())
}
