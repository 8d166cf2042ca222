mod common;

use common::*;
use reflux_core::ActionRef;

#[test]
fn test_observe_actions() {
    let store = create_store();
    let actions: Recorder<ActionRef> = Recorder::new();
    let _sub = store.observe_action().subscribe(actions.sink());

    dispatch_all_actions(&store);

    assert_eq!(actions.count(), 4);
    assert!(actions.last().unwrap().is::<AddTodoItem>());
}

#[test]
fn test_observe_single_action_type() {
    let store = create_store();
    let switches = Recorder::new();
    let _sub = store.observe::<SwitchUser>().subscribe(switches.sink());

    dispatch_all_actions(&store);

    assert_eq!(switches.count(), 1);
    assert_eq!(switches.last().unwrap().name, "Emily");
}

#[test]
fn test_observe_typed_preserves_dispatch_order() {
    let store = create_store();
    let ids = Recorder::new();
    let _sub = store
        .observe::<AddTodoItem>()
        .map(|action| action.item.id)
        .subscribe(ids.sink());

    dispatch_all_actions(&store);

    assert_eq!(ids.values(), vec![1, 2, 3]);
}

#[test]
fn test_unhandled_action_is_still_observed() {
    let store = create_store();
    let before = store.state();
    let seen = Recorder::new();
    let _sub = store.observe::<Unhandled>().subscribe(seen.sink());

    store.dispatch(Unhandled).unwrap();

    assert_eq!(seen.count(), 1);
    assert_eq!(*store.state(), *before);
}

#[test]
fn test_no_replay_for_late_observers() {
    let store = create_store();
    add_todo_item(&store, 1, "Create unit tests");

    let actions: Recorder<ActionRef> = Recorder::new();
    let _sub = store.observe_action().subscribe(actions.sink());
    switch_user(&store, "Emily");

    assert_eq!(actions.count(), 1);
    assert!(actions.last().unwrap().is::<SwitchUser>());
}

#[test]
fn test_dropped_subscription_stops_delivery() {
    let store = create_store();
    let actions: Recorder<ActionRef> = Recorder::new();
    let sub = store.observe_action().subscribe(actions.sink());

    add_todo_item(&store, 1, "Create unit tests");
    drop(sub);
    add_todo_item(&store, 2, "Create Models");

    assert_eq!(actions.count(), 1);
}
