use std::cell::RefCell;
use std::rc::Rc;

use super::*;

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&CanvasEvent) -> Result<(), MinimapError>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let log2 = Rc::clone(&log);
    let make = move |tag: &str| -> Box<dyn Fn(&CanvasEvent) -> Result<(), MinimapError>> {
        let log = Rc::clone(&log2);
        let tag = tag.to_string();
        Box::new(move |_ev: &CanvasEvent| {
            log.borrow_mut().push(tag.clone());
            Ok(())
        })
    };
    (log, make)
}

// =============================================================
// CanvasEvent
// =============================================================

#[test]
fn event_kind_mapping() {
    assert_eq!(CanvasEvent::Moved { node_id: None }.kind(), CanvasEventKind::Moved);
    assert_eq!(CanvasEvent::Dirty.kind(), CanvasEventKind::Dirty);
    assert_eq!(CanvasEvent::ViewportChanged.kind(), CanvasEventKind::ViewportChanged);
    assert_eq!(CanvasEvent::Tick.kind(), CanvasEventKind::Tick);
}

#[test]
fn all_kinds_listed_once() {
    let kinds = CanvasEventKind::ALL;
    for (i, a) in kinds.iter().enumerate() {
        for (j, b) in kinds.iter().enumerate() {
            assert_eq!(i == j, a == b);
        }
    }
}

// =============================================================
// Dispatch
// =============================================================

#[test]
fn publish_reaches_matching_subscribers_only() {
    let bus = EventBus::new();
    let (log, make) = recorder();
    bus.subscribe(CanvasEventKind::Tick, make("tick"));
    bus.subscribe(CanvasEventKind::Dirty, make("dirty"));

    assert_eq!(bus.publish(&CanvasEvent::Tick), 1);
    assert_eq!(*log.borrow(), vec!["tick"]);
}

#[test]
fn publish_runs_in_registration_order() {
    let bus = EventBus::new();
    let (log, make) = recorder();
    bus.subscribe(CanvasEventKind::Dirty, make("a"));
    bus.subscribe(CanvasEventKind::Dirty, make("b"));
    bus.subscribe(CanvasEventKind::Dirty, make("c"));

    bus.publish(&CanvasEvent::Dirty);
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
}

#[test]
fn publish_without_subscribers_is_noop() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(&CanvasEvent::ViewportChanged), 0);
}

#[test]
fn handler_receives_payload() {
    let bus = EventBus::new();
    let seen = Rc::new(RefCell::new(None));
    let seen2 = Rc::clone(&seen);
    bus.subscribe(CanvasEventKind::Moved, move |ev| {
        if let CanvasEvent::Moved { node_id } = ev {
            *seen2.borrow_mut() = node_id.clone();
        }
        Ok(())
    });

    bus.publish(&CanvasEvent::Moved { node_id: Some("n1".into()) });
    assert_eq!(seen.borrow().as_deref(), Some("n1"));
}

#[test]
fn failing_subscriber_does_not_block_others() {
    crate::test_support::init_tracing();
    let bus = EventBus::new();
    let (log, make) = recorder();
    bus.subscribe(CanvasEventKind::Tick, make("before"));
    bus.subscribe(CanvasEventKind::Tick, |_| Err(MinimapError::Surface("boom".into())));
    bus.subscribe(CanvasEventKind::Tick, make("after"));

    assert_eq!(bus.publish(&CanvasEvent::Tick), 2);
    assert_eq!(*log.borrow(), vec!["before", "after"]);

    // Later dispatches still work.
    assert_eq!(bus.publish(&CanvasEvent::Tick), 2);
    assert_eq!(log.borrow().len(), 4);
}

// =============================================================
// Subscription management
// =============================================================

#[test]
fn unsubscribe_stops_delivery() {
    let bus = EventBus::new();
    let (log, make) = recorder();
    let id = bus.subscribe(CanvasEventKind::Tick, make("x"));

    assert!(bus.unsubscribe(id));
    bus.publish(&CanvasEvent::Tick);
    assert!(log.borrow().is_empty());
    assert_eq!(bus.subscriber_count(CanvasEventKind::Tick), 0);
}

#[test]
fn unsubscribe_unknown_id_returns_false() {
    let bus = EventBus::new();
    let id = bus.subscribe(CanvasEventKind::Tick, |_| Ok(()));
    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
}

#[test]
fn subscription_ids_are_unique() {
    let bus = EventBus::new();
    let a = bus.subscribe(CanvasEventKind::Tick, |_| Ok(()));
    let b = bus.subscribe(CanvasEventKind::Tick, |_| Ok(()));
    assert_ne!(a, b);
}

#[test]
fn counts_by_kind() {
    let bus = EventBus::new();
    assert!(bus.is_empty());
    bus.subscribe(CanvasEventKind::Tick, |_| Ok(()));
    bus.subscribe(CanvasEventKind::Tick, |_| Ok(()));
    bus.subscribe(CanvasEventKind::Moved, |_| Ok(()));
    assert_eq!(bus.subscriber_count(CanvasEventKind::Tick), 2);
    assert_eq!(bus.subscriber_count(CanvasEventKind::Moved), 1);
    assert_eq!(bus.subscriber_count(CanvasEventKind::Dirty), 0);
    assert_eq!(bus.len(), 3);
}

#[test]
fn handler_may_unsubscribe_itself_during_dispatch() {
    let bus = Rc::new(EventBus::new());
    let calls = Rc::new(RefCell::new(0));
    let own_id = Rc::new(RefCell::new(None));

    let bus2 = Rc::clone(&bus);
    let calls2 = Rc::clone(&calls);
    let own_id2 = Rc::clone(&own_id);
    let id = bus.subscribe(CanvasEventKind::Dirty, move |_| {
        *calls2.borrow_mut() += 1;
        if let Some(id) = *own_id2.borrow() {
            bus2.unsubscribe(id);
        }
        Ok(())
    });
    *own_id.borrow_mut() = Some(id);

    bus.publish(&CanvasEvent::Dirty);
    bus.publish(&CanvasEvent::Dirty);
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(bus.subscriber_count(CanvasEventKind::Dirty), 0);
}

#[test]
fn handler_may_subscribe_during_dispatch_without_running_new_handler() {
    let bus = Rc::new(EventBus::new());
    let (log, make) = recorder();
    let make = Rc::new(make);

    let bus2 = Rc::clone(&bus);
    let make2 = Rc::clone(&make);
    bus.subscribe(CanvasEventKind::Tick, move |_| {
        bus2.subscribe(CanvasEventKind::Tick, make2("late"));
        Ok(())
    });

    bus.publish(&CanvasEvent::Tick);
    assert!(log.borrow().is_empty());
    assert_eq!(bus.subscriber_count(CanvasEventKind::Tick), 2);
}
