//! Unit tests for event derivation

use crate::csm::{Action, Event, EventChannel, State, StateMachine, Transition};
use crate::events::{collect_events, derive_event_links, unconsumed_events, EventLink, MachineEvents};
use crate::fixtures::sample_csm;

fn raiser(name: &str, event: Event) -> StateMachine {
    StateMachine::new(name).with_state(State::new(format!("{name}Start")).initial().with_entry(Action::raise(event)))
}

fn consumer(name: &str, event: &str) -> StateMachine {
    let state = format!("{name}Wait");
    StateMachine::new(name).with_state(
        State::new(state.clone())
            .initial()
            .with_transition(Transition::new(state, "Elsewhere").with_event(event)),
    )
}

#[test]
fn test_machine_events_of_sample() {
    let csm = sample_csm();
    let worker = MachineEvents::of(&csm.state_machines[0]);

    assert_eq!(worker.machine, "Worker");
    assert!(worker.consumes("start"));
    assert!(worker.consumes("expired"));
    assert!(worker
        .raised
        .contains(&("finished".to_string(), EventChannel::Global)));
    assert!(worker
        .raised
        .contains(&("tooMany".to_string(), EventChannel::Internal)));

    let outgoing = worker.outgoing().map(|(name, _)| name).collect::<Vec<_>>();
    assert_eq!(outgoing, vec!["finished", "weatherDone"]);
}

#[test]
fn test_sample_links_controller_to_worker() {
    let csm = sample_csm();
    let events = collect_events(&csm.state_machines);
    let links = derive_event_links(&events);

    assert_eq!(
        links,
        vec![EventLink {
            source: "Controller".to_string(),
            target: "Worker".to_string(),
            event: "start".to_string(),
            channel: EventChannel::External,
        }]
    );
    assert_eq!(
        unconsumed_events(&events),
        vec![
            ("Worker".to_string(), "finished".to_string()),
            ("Worker".to_string(), "weatherDone".to_string()),
        ]
    );
}

#[test]
fn test_internal_events_never_link() {
    let machines = [
        raiser("A", Event::internal("ping")),
        consumer("B", "ping"),
    ];
    assert!(derive_event_links(&collect_events(&machines)).is_empty());
}

#[test]
fn test_global_event_links_every_consumer_but_self() {
    let mut a = raiser("A", Event::new("tick", EventChannel::Global));
    a.children.extend(consumer("Inner", "tick").children);
    let machines = [a, consumer("B", "tick"), consumer("C", "tick")];

    let links = derive_event_links(&collect_events(&machines));
    let targets = links.iter().map(|link| link.target.as_str()).collect::<Vec<_>>();
    assert_eq!(targets, vec!["B", "C"]);
    assert!(links.iter().all(|link| link.source == "A"));
}
