//! Range coercion and clamping tests.

use formwright::coerce::fill_control;
use formwright::page::{Control, FormPage, UiEvent};

fn range(id: &str, min: Option<f64>, max: Option<f64>) -> Control {
    Control {
        id: id.to_owned(),
        type_attr: Some("range".to_owned()),
        min,
        max,
        ..Control::default()
    }
}

#[test]
fn value_above_max_clamps_to_max() {
    let page = FormPage::new(vec![range("volume", Some(0.0), Some(10.0))], vec![]);
    assert!(fill_control(&page, "volume", "15"));
    assert_eq!(page.control("volume").expect("exists").value, "10");
}

#[test]
fn value_below_min_clamps_to_min() {
    let page = FormPage::new(vec![range("volume", Some(0.0), Some(10.0))], vec![]);
    assert!(fill_control(&page, "volume", "-3"));
    assert_eq!(page.control("volume").expect("exists").value, "0");
}

#[test]
fn non_numeric_value_leaves_control_unchanged() {
    let mut control = range("volume", Some(0.0), Some(10.0));
    control.value = "5".to_owned();
    let page = FormPage::new(vec![control], vec![]);

    assert!(fill_control(&page, "volume", "abc"));
    let control = page.control("volume").expect("exists");
    assert_eq!(control.value, "5");
    assert!(control.events.is_empty());
}

#[test]
fn unset_bounds_default_to_zero_and_hundred() {
    let page = FormPage::new(vec![range("pct", None, None)], vec![]);
    assert!(fill_control(&page, "pct", "150"));
    assert_eq!(page.control("pct").expect("exists").value, "100");

    assert!(fill_control(&page, "pct", "-1"));
    assert_eq!(page.control("pct").expect("exists").value, "0");
}

#[test]
fn fractional_values_are_kept() {
    let page = FormPage::new(vec![range("pct", None, None)], vec![]);
    assert!(fill_control(&page, "pct", "7.5"));
    assert_eq!(page.control("pct").expect("exists").value, "7.5");
}

#[test]
fn in_range_value_emits_input_then_change() {
    let page = FormPage::new(vec![range("volume", Some(0.0), Some(10.0))], vec![]);
    assert!(fill_control(&page, "volume", "4"));
    assert_eq!(
        page.control("volume").expect("exists").events,
        vec![UiEvent::Input, UiEvent::Change]
    );
}

#[test]
fn range_coercion_is_idempotent() {
    let page = FormPage::new(vec![range("volume", Some(0.0), Some(10.0))], vec![]);
    assert!(fill_control(&page, "volume", "15"));
    assert!(fill_control(&page, "volume", "15"));
    assert_eq!(page.control("volume").expect("exists").value, "10");
}
