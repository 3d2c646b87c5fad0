//! PKL Code Generator
//! Emits the textual configuration projection of a description tree.
//!
//! The output is a pure function of the input: one tab per nesting level,
//! `key: value` properties, `key { ... }` objects and `new { ... }` list elements.

use thiserror::Error;

use crate::description::{
    ActionDescription, CollaborativeStateMachineDescription, ContextVariableDescription,
    EventDescription, GuardDescription, OnTransitionDescription, RaiseActionDescription,
    StateDescription, StateMachineDescription,
};


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("cannot emit action in '{owner}': unknown action type")]
    UnknownActionType { owner: String },
}

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Generate the PKL projection of a collaborative state machine description.
pub fn generate_pkl(description: &CollaborativeStateMachineDescription) -> CodegenResult<String> {
    let mut writer = PklWriter::default();
    emit_collaborative_state_machine(&mut writer, description)?;
    Ok(writer.finish())
}

#[derive(Default)]
struct PklWriter {
    out: String,
    depth: usize,
}

impl PklWriter {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn string(&mut self, key: &str, value: &str) {
        self.line(&format!("{key}: {}", quote(value)));
    }

    fn boolean(&mut self, key: &str, value: bool) {
        self.line(&format!("{key}: {value}"));
    }

    /// A name reference: bare when it is a plain identifier.
    fn reference(&mut self, key: &str, value: &str) {
        if is_plain_identifier(value) {
            self.line(&format!("{key}: {value}"));
        } else {
            self.string(key, value);
        }
    }

    fn object(
        &mut self,
        key: &str,
        body: impl FnOnce(&mut Self) -> CodegenResult<()>,
    ) -> CodegenResult<()> {
        self.line(&format!("{key} {{"));
        self.depth += 1;
        body(self)?;
        self.depth -= 1;
        self.line("}");
        Ok(())
    }

    fn listing<T>(
        &mut self,
        key: &str,
        items: &[T],
        mut element: impl FnMut(&mut Self, &T) -> CodegenResult<()>,
    ) -> CodegenResult<()> {
        if items.is_empty() {
            self.line(&format!("{key} {{}}"));
            return Ok(());
        }
        self.object(key, |writer| {
            for item in items {
                writer.object("new", |writer| element(writer, item))?;
            }
            Ok(())
        })
    }

    fn finish(self) -> String {
        self.out
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn is_plain_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(value, "true" | "false" | "new")
}

// ============================================================================
// ENTITIES
// ============================================================================

fn emit_collaborative_state_machine(
    writer: &mut PklWriter,
    csm: &CollaborativeStateMachineDescription,
) -> CodegenResult<()> {
    writer.string("name", &csm.name);
    writer.string("version", &csm.version);
    writer.listing("stateMachines", &csm.state_machines, emit_state_machine)?;
    writer.listing("localContext", &csm.local_context, emit_context_variable)?;
    writer.listing("persistentContext", &csm.persistent_context, emit_context_variable)
}

fn emit_state_machine(
    writer: &mut PklWriter,
    machine: &StateMachineDescription,
) -> CodegenResult<()> {
    writer.string("name", &machine.name);
    if let Some(inherit) = &machine.inherit {
        writer.reference("inherit", inherit);
    }
    if machine.is_abstract {
        writer.boolean("abstract", true);
    }
    writer.listing("states", &machine.states, emit_state)?;
    writer.listing("stateMachines", &machine.state_machines, emit_state_machine)?;
    writer.listing("localContext", &machine.local_context, emit_context_variable)?;
    writer.listing("persistentContext", &machine.persistent_context, emit_context_variable)
}

fn emit_state(writer: &mut PklWriter, state: &StateDescription) -> CodegenResult<()> {
    let owner = state.name.as_str();
    let action =
        |writer: &mut PklWriter, item: &ActionDescription| emit_action(writer, owner, item);
    let transition =
        |writer: &mut PklWriter, item: &OnTransitionDescription| emit_transition(writer, owner, item);

    writer.string("name", &state.name);
    writer.boolean("initial", state.initial);
    writer.boolean("terminal", state.terminal);
    if state.is_virtual {
        writer.boolean("virtual", true);
    }
    if state.is_abstract {
        writer.boolean("abstract", true);
    }
    writer.listing("entry", &state.entry, action)?;
    writer.listing("exit", &state.exit, action)?;
    writer.listing("while", &state.while_actions, action)?;
    writer.listing("after", &state.after, action)?;
    writer.listing("on", &state.on, transition)?;
    writer.listing("always", &state.always, transition)?;
    writer.listing("localContext", &state.local_context, emit_context_variable)?;
    writer.listing("persistentContext", &state.persistent_context, emit_context_variable)?;
    writer.listing("staticContext", &state.static_context, emit_context_variable)
}

fn emit_transition(
    writer: &mut PklWriter,
    owner: &str,
    transition: &OnTransitionDescription,
) -> CodegenResult<()> {
    writer.reference("target", &transition.target);
    if let Some(event) = &transition.event {
        writer.string("event", event);
    }
    writer.listing("guards", &transition.guards, emit_guard)?;
    writer.listing("actions", &transition.actions, |writer, action| {
        emit_action(writer, owner, action)
    })?;
    if let Some(else_target) = &transition.else_target {
        writer.reference("else", else_target);
    }
    Ok(())
}

fn emit_guard(writer: &mut PklWriter, guard: &GuardDescription) -> CodegenResult<()> {
    writer.string("expression", &guard.expression);
    Ok(())
}

fn emit_context_variable(
    writer: &mut PklWriter,
    variable: &ContextVariableDescription,
) -> CodegenResult<()> {
    writer.string("name", &variable.name);
    writer.string("value", &variable.value);
    Ok(())
}

fn emit_event(writer: &mut PklWriter, event: &EventDescription) -> CodegenResult<()> {
    writer.string("name", &event.name);
    writer.string("channel", event.channel.as_str());
    writer.listing("data", &event.data, emit_context_variable)
}

fn emit_raise_payload(writer: &mut PklWriter, raise: &RaiseActionDescription) -> CodegenResult<()> {
    writer.object("event", |writer| emit_event(writer, &raise.event))
}

// ============================================================================
// ACTIONS
// ============================================================================

fn emit_action(
    writer: &mut PklWriter,
    owner: &str,
    action: &ActionDescription,
) -> CodegenResult<()> {
    let Some(tag) = action.type_tag() else {
        return Err(CodegenError::UnknownActionType {
            owner: owner.to_owned(),
        });
    };
    writer.string("type", tag);

    match action {
        ActionDescription::Invoke(invoke) => {
            writer.string("serviceType", &invoke.service_type);
            writer.boolean("isLocal", invoke.is_local);
            writer.listing("input", &invoke.input, emit_context_variable)?;
            writer.listing("output", &invoke.output, |writer, output| {
                writer.string("reference", &output.reference);
                Ok(())
            })?;
            writer.listing("done", &invoke.done, emit_event)
        }
        ActionDescription::Create(create) => {
            writer.object("variable", |writer| {
                emit_context_variable(writer, &create.variable)
            })?;
            writer.boolean("isPersistent", create.is_persistent);
            Ok(())
        }
        ActionDescription::Assign(assign) => {
            writer.object("variable", |writer| {
                writer.string("reference", &assign.variable.reference);
                Ok(())
            })?;
            writer.string("value", &assign.value);
            Ok(())
        }
        ActionDescription::Raise(raise) => emit_raise_payload(writer, raise),
        ActionDescription::Timeout(timeout) => {
            writer.string("name", &timeout.name);
            writer.string("delay", &timeout.delay);
            writer.object("action", |writer| emit_raise_payload(writer, &timeout.action))
        }
        ActionDescription::TimeoutReset(reset) => {
            writer.string("action", &reset.action);
            Ok(())
        }
        ActionDescription::Match(matching) => {
            writer.string("expression", &matching.expression);
            writer.listing("cases", &matching.cases, |writer, case| {
                writer.string("case", &case.case);
                writer.object("action", |writer| emit_action(writer, owner, &case.action))
            })
        }
        ActionDescription::Unknown => Ok(()),
    }
}
