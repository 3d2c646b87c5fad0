//! Event Derivation
//! Raised and consumed event sets per state machine, and the cross-machine
//! links inferred from them.
//!
//! A link runs from machine A to machine B when A raises an event on a channel
//! that leaves the machine (external or global) and B has an `on` transition
//! for an event of that name.

use std::collections::BTreeSet;

use log::debug;

use crate::csm::{EventChannel, StateMachine};

#[cfg(test)]
mod tests;

/// Event sets of a single state machine, nested machines included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineEvents {
    pub machine: String,
    /// Raised events as (name, channel), without duplicates.
    pub raised: BTreeSet<(String, EventChannel)>,
    pub consumed: BTreeSet<String>,
}

impl MachineEvents {
    pub fn of(machine: &StateMachine) -> Self {
        Self {
            machine: machine.name.clone(),
            raised: machine
                .raised_events()
                .into_iter()
                .map(|event| (event.name.clone(), event.channel))
                .collect(),
            consumed: machine
                .consumed_events()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Events this machine sends to other machines.
    pub fn outgoing(&self) -> impl Iterator<Item = (&str, EventChannel)> {
        self.raised
            .iter()
            .filter(|(_, channel)| channel.crosses_machines())
            .map(|(name, channel)| (name.as_str(), *channel))
    }

    pub fn consumes(&self, event: &str) -> bool {
        self.consumed.contains(event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventLink {
    pub source: String,
    pub target: String,
    pub event: String,
    pub channel: EventChannel,
}

/// Compute event sets for each machine, in order.
pub fn collect_events<'a>(machines: impl IntoIterator<Item = &'a StateMachine>) -> Vec<MachineEvents> {
    machines.into_iter().map(MachineEvents::of).collect()
}

/// Links from raisers to consumers of cross-machine events. A machine never
/// links to itself.
pub fn derive_event_links(machines: &[MachineEvents]) -> Vec<EventLink> {
    let mut links = Vec::new();

    for source in machines {
        for (event, channel) in source.outgoing() {
            for target in machines {
                if target.machine == source.machine || !target.consumes(event) {
                    continue;
                }
                debug!("'{}' -> '{}' on '{}'", source.machine, target.machine, event);
                links.push(EventLink {
                    source: source.machine.clone(),
                    target: target.machine.clone(),
                    event: event.to_string(),
                    channel,
                });
            }
        }
    }

    links
}

/// Cross-machine events raised somewhere that no other machine consumes.
pub fn unconsumed_events(machines: &[MachineEvents]) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for source in machines {
        for (event, _) in source.outgoing() {
            let consumed = machines
                .iter()
                .any(|target| target.machine != source.machine && target.consumes(event));
            if !consumed {
                out.push((source.machine.clone(), event.to_string()));
            }
        }
    }
    out.dedup();
    out
}
