//! End-to-end coverage of the reactive core driving the render sink: a
//! value bound to a text node, a derived list view over an observable
//! array, and a provisioned value landing through the same pipeline.

use std::cell::RefCell;
use std::rc::Rc;

use tidal_reactive::{Observable, ObservableArray, ProvisionError};
use tidal_render::Renderable;

#[test]
fn counter_label_stays_in_sync() {
    let count = Observable::new(0u32);
    let label = count.render();
    assert_eq!(label.display_text(), "0");

    for _ in 0..3 {
        count.transform(|v| v + 1);
    }
    assert_eq!(label.display_text(), "3");
}

#[test]
fn list_view_follows_array_mutations() {
    let todos = ObservableArray::new(vec!["write".to_string(), "review".to_string()]);
    let view = todos.map(|items: &Vec<String>| items.join(", "));
    let slot = view.mounted();
    assert_eq!(slot.display_text(), "write, review");

    todos.push("ship".to_string());
    assert_eq!(slot.display_text(), "write, review, ship");

    todos.delete(&"write".to_string());
    assert_eq!(slot.display_text(), "review, ship");

    // On-demand render agrees with the refreshed slot.
    assert_eq!(view.render().display_text(), slot.display_text());
}

#[test]
fn provisioned_value_reaches_rendered_node() {
    let status: Observable<String> = Observable::uninitialized();
    let node = status.render();
    assert_eq!(node.display_text(), "");

    status.provide(|| Ok("ready".to_string()));
    status.block_on_provisions();
    assert_eq!(node.display_text(), "ready");
}

#[test]
fn failed_provision_leaves_view_empty() {
    let status: Observable<String> = Observable::uninitialized();
    let view = status.map(|s: &String| s.clone());
    let errors = Rc::new(RefCell::new(Vec::new()));
    let errors_clone = Rc::clone(&errors);
    let _sub = status.on_provision_failure(move |e| errors_clone.borrow_mut().push(e.clone()));

    status.provide(|| Err(ProvisionError::failed("fetch failed")));
    status.block_on_provisions();

    assert!(view.render().is_empty_placeholder());
    assert_eq!(errors.borrow().len(), 1);
}

#[test]
fn two_subscribers_and_a_view_observe_the_same_pass() {
    let value = Observable::new(1i64);
    let log = Rc::new(RefCell::new(Vec::new()));

    let log_a = Rc::clone(&log);
    let _a = value.subscribe_deferred(move |v| log_a.borrow_mut().push(("a", *v)));
    let node = value.render();
    let log_b = Rc::clone(&log);
    let _b = value.subscribe_deferred(move |v| log_b.borrow_mut().push(("b", *v)));

    value.emit(2);
    // Registration order: a, then the render binding, then b. The node was
    // already rewritten when b ran.
    assert_eq!(*log.borrow(), vec![("a", 2), ("b", 2)]);
    assert_eq!(node.display_text(), "2");
}
