//! Shared sample trees for unit tests.

use crate::csm::{
    Action, ActionKind, CollaborativeStateMachine, ContextType, ContextVariable, Event,
    EventChannel, Guard, InvokeAction, MatchCase, State, StateMachine, Transition,
};

/// "Root" with an initial and a terminal state linked by `go` guarded by `g1`.
pub(crate) fn root_machine() -> StateMachine {
    StateMachine::new("Root")
        .with_state(
            State::new("Initial").initial().with_transition(
                Transition::new("Initial", "Terminal")
                    .with_event("go")
                    .with_guard(Guard::named("g1", "x > 0")),
            ),
        )
        .with_state(State::new("Terminal").terminal())
}

/// One state exercising every action type.
pub(crate) fn state_with_every_action() -> State {
    let mut invoke = InvokeAction::new("weather");
    invoke.is_local = true;
    invoke.input.push(ContextVariable::new("city", "\"Innsbruck\""));
    invoke.output.push("temperature".to_string());
    invoke.done.push(Event::new("weatherDone", EventChannel::External));

    State::new("Busy")
        .with_entry(Action::new(ActionKind::Invoke(invoke)))
        .with_entry(Action::create(ContextVariable::new("counter", "0"), true))
        .with_entry(Action::assign("counter", "counter + 1"))
        .with_exit(Action::raise(
            Event::new("finished", EventChannel::Global).with_data(ContextVariable::new("n", "counter")),
        ))
        .with_exit(Action::timeout_reset("watchdog"))
        .with_exit(Action::matching(
            "counter",
            vec![
                MatchCase::new("counter > 10", Action::raise(Event::internal("tooMany"))),
                MatchCase::new("true", Action::assign("counter", "0")),
            ],
        ))
        .with_context(ContextType::Local, ContextVariable::new("busyLocal", "1"))
        .with_context(ContextType::Static, ContextVariable::new("busyStatic", "2"))
}

/// Sample CSM: two top-level machines, one with a nested machine.
pub(crate) fn sample_csm() -> CollaborativeStateMachine {
    let mut busy = state_with_every_action();
    busy.after
        .push(Action::timeout("watchdog", "5000", Event::internal("expired")));
    busy.add_transition(
        Transition::new("Busy", "Idle")
            .with_event("expired")
            .with_guard(Guard::new("counter > 0"))
            .with_guard(Guard::named("notEmpty", "size(queue) > 0"))
            .with_action(Action::assign("counter", "0"))
            .with_else("Busy"),
    );

    let worker = StateMachine::new("Worker")
        .with_state(
            State::new("Idle")
                .initial()
                .with_transition(Transition::new("Idle", "Busy").with_event("start"))
                .with_context(ContextType::Persistent, ContextVariable::new("idleCount", "0")),
        )
        .with_state(busy)
        .with_state_machine(
            StateMachine::new("Logger")
                .with_state(State::new("Logging").initial().terminal())
                .with_context(ContextType::Local, ContextVariable::new("lines", "0")),
        )
        .with_context(ContextType::Persistent, ContextVariable::new("jobs", "[]"));

    let controller = StateMachine::new("Controller")
        .with_state(
            State::new("Waiting").initial().with_entry(Action::raise(Event::new(
                "start",
                EventChannel::External,
            ))),
        )
        .with_state(
            State::new("Done")
                .terminal()
                .with_transition(Transition::new("Done", "Waiting")),
        );

    CollaborativeStateMachine::new("Factory", "2.0")
        .with_state_machine(worker)
        .with_state_machine(controller)
        .with_context(ContextType::Local, ContextVariable::new("shift", "1"))
        .with_context(ContextType::Persistent, ContextVariable::new("total", "0"))
}
