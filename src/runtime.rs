//! Runtime state: variable environment, function table, and the three
//! control-flow stacks (call, exception, loop) plus the block-depth
//! counter.

use std::collections::HashMap;

use crate::declension::DeclensionTable;
use crate::value::Value;

/// `FAC F p1 p2 ...` registers one of these. The body is never executed
/// at definition time; `body_start`/`body_end` bound the line range
/// `VOCA` jumps into.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub params: Vec<String>,
    pub body_start: usize,
    pub body_end: usize,
}

/// A call-stack frame. `destination` replaces the original's process-wide
/// `__CALLING_VAR__` sentinel with an explicit field — the sentinel form
/// in the original prototype is a porting artifact, not a design worth
/// carrying forward.
#[derive(Debug, Clone)]
pub struct CallFrame {
    pub caller_ip: usize,
    pub snapshot: HashMap<String, Value>,
    pub destination: Option<String>,
    /// Line index of the callee's own `FINIS`. Falling through to this
    /// line without a `REDDO` is an implicit `REDDO NIHIL`.
    pub finis_line: usize,
}

/// An installed `CAPE` handler. `cape_line` is the line index of the
/// `CAPE` statement itself — propagation jumps back there (not straight
/// into the body) so that `CAPE`'s own "fall through into the body if an
/// exception is in flight" re-check is what actually admits control into
/// the handler. `pending_skip` is set when the handler's body was
/// skipped at install time (no exception was in flight yet); the next
/// `FINIS` this frame's depth reaches consumes the flag instead of
/// running the normal termination check. Carrying the flag on the frame
/// itself (rather than a one-shot engine-level flag) keeps it scoped to
/// the handler it describes.
/// `depth_at_entry` is the block depth immediately before `CAPE`'s own
/// increment (install-time or catch-time), letting `FINIS` recognize
/// exactly the `CAPE` block's own closing line rather than any later
/// one, the same way `LoopFrame::depth_at_entry` identifies a loop's
/// own closing `FINIS`. `caught` is set only when an exception actually
/// admits control into the handler body — termination should never
/// fire just because execution happened to fall through some later,
/// unrelated block while this frame was still installed.
#[derive(Debug, Clone)]
pub struct ExceptionFrame {
    pub exception_name: String,
    pub cape_line: usize,
    pub pending_skip: bool,
    pub depth_at_entry: usize,
    pub caught: bool,
}

/// `(loop_header_line, block_depth_at_entry)`.
#[derive(Debug, Clone, Copy)]
pub struct LoopFrame {
    pub header_line: usize,
    pub depth_at_entry: usize,
}

/// A `Thrown` exception in flight, consumed by the handler it jumped to.
#[derive(Debug, Clone)]
pub struct ActiveException {
    pub name: String,
    pub message: Option<String>,
}

/// All mutable interpreter state for one program run. Owned by a single
/// `Engine` instance for its lifetime.
#[derive(Debug)]
pub struct Runtime {
    env: HashMap<String, Value>,
    pub declensions: DeclensionTable,
    pub functions: HashMap<String, FunctionEntry>,
    pub call_stack: Vec<CallFrame>,
    pub exception_stack: Vec<ExceptionFrame>,
    pub loop_stack: Vec<LoopFrame>,
    pub block_depth: usize,
    pub current_exception: Option<ActiveException>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            env: HashMap::new(),
            declensions: DeclensionTable::with_builtins(),
            functions: HashMap::new(),
            call_stack: Vec::new(),
            exception_stack: Vec::new(),
            loop_stack: Vec::new(),
            block_depth: 0,
            current_exception: None,
        }
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// `SIT V`: declares `V`, initializing it to `Integer(0)`, and
    /// registers a declension entry if one doesn't already exist. A
    /// name's presence as a key in `env` *is* the "declared" marker —
    /// declaration always writes an entry immediately, so a separate
    /// declared-names set would only duplicate the map's own keys.
    pub fn declare(&mut self, name: &str) {
        self.env.entry(name.to_string()).or_insert(Value::Integer(0));
        self.declensions.register(name);
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.env.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.env.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.env.insert(name.to_string(), value);
    }

    pub fn declared_names(&self) -> impl Iterator<Item = &String> {
        self.env.keys()
    }

    /// Snapshot the whole environment, for a call frame.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.env.clone()
    }

    /// Restore a previously taken snapshot (on `REDDO`).
    pub fn restore(&mut self, snapshot: HashMap<String, Value>) {
        self.env = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_initializes_to_zero() {
        let mut rt = Runtime::new();
        rt.declare("NUMERUS");
        assert_eq!(rt.get("NUMERUS"), Some(&Value::Integer(0)));
    }

    #[test]
    fn test_declare_registers_declension() {
        let mut rt = Runtime::new();
        rt.declare("AMICITIA");
        assert!(rt.declensions.contains("AMICITIA"));
    }

    #[test]
    fn test_undeclared_name_is_absent() {
        let rt = Runtime::new();
        assert!(!rt.is_declared("NUMERUS"));
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut rt = Runtime::new();
        rt.declare("NUMERUS");
        rt.set("NUMERUS", Value::Integer(5));
        let snap = rt.snapshot();
        rt.set("NUMERUS", Value::Integer(99));
        rt.restore(snap);
        assert_eq!(rt.get("NUMERUS"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_call_stack_lifo() {
        let mut rt = Runtime::new();
        rt.call_stack.push(CallFrame { caller_ip: 0, snapshot: HashMap::new(), destination: None, finis_line: 3 });
        rt.call_stack.push(CallFrame { caller_ip: 5, snapshot: HashMap::new(), destination: Some("X".into()), finis_line: 8 });
        let top = rt.call_stack.pop().unwrap();
        assert_eq!(top.caller_ip, 5);
        assert_eq!(top.destination.as_deref(), Some("X"));
    }
}
