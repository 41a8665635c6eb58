//! Highlight side-effect tests.
//!
//! The highlight is cosmetic and exempt from the idempotence property; it
//! must recolor the control and revert to the prior background after the
//! fixed delay.

use std::time::Duration;

use formwright::coerce::{fill_control, HIGHLIGHT_COLOR};
use formwright::page::{Control, FormPage};

fn page_with_background(background: Option<&str>) -> FormPage {
    FormPage::new(
        vec![Control {
            id: "name".to_owned(),
            background: background.map(str::to_owned),
            ..Control::default()
        }],
        vec![],
    )
}

#[tokio::test(start_paused = true)]
async fn highlight_applies_then_reverts_to_prior_background() {
    let page = page_with_background(Some("gold"));
    assert!(fill_control(&page, "name", "Alice"));

    assert_eq!(
        page.control("name").expect("exists").background.as_deref(),
        Some(HIGHLIGHT_COLOR)
    );

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(
        page.control("name").expect("exists").background.as_deref(),
        Some("gold")
    );
}

#[tokio::test(start_paused = true)]
async fn highlight_reverts_to_stylesheet_default_when_unset() {
    let page = page_with_background(None);
    assert!(fill_control(&page, "name", "Alice"));
    assert_eq!(
        page.control("name").expect("exists").background.as_deref(),
        Some(HIGHLIGHT_COLOR)
    );

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert!(page.control("name").expect("exists").background.is_none());
}

#[test]
fn highlight_applies_without_async_runtime() {
    // Best-effort: no runtime means no revert task, but the functional
    // coercion and the recolor itself still happen.
    let page = page_with_background(Some("gold"));
    assert!(fill_control(&page, "name", "Alice"));
    assert_eq!(page.control("name").expect("exists").value, "Alice");
    assert_eq!(
        page.control("name").expect("exists").background.as_deref(),
        Some(HIGHLIGHT_COLOR)
    );
}
