//! The interpreter: evaluator loop, substitution, command dispatch, and
//! the host-facing API.

use std::rc::Rc;

use tico_lex::{TokenKind, Tokenizer};

use crate::builtins;
use crate::env::{Binding, Env};
use crate::error::{ErrorKind, Flow, ScriptError, ScriptResult};
use crate::list::List;
use crate::value::Value;

/// Longest accepted `$name` span, including the dollar sign.
pub const MAX_VAR_LENGTH: usize = 256;

/// A command handler. The argument list is borrowed; the result is
/// communicated through [`Interp::set_result`].
pub type CmdHandler = dyn Fn(&mut Interp, &List) -> Flow;

struct Cmd {
    name: Vec<u8>,
    /// 0 = variadic, otherwise the exact word count including the
    /// command name.
    arity: usize,
    handler: Rc<CmdHandler>,
}

/// An interpreter instance: environment, command registry, result slot,
/// and the latched first-error state.
pub struct Interp {
    pub(crate) env: Env,
    cmds: Vec<Cmd>,
    result: Value,
    nest: usize,
    error_pos: usize,
    error_kind: Option<ErrorKind>,
}

impl Interp {
    /// A fresh interpreter with the root frame and all built-ins
    /// registered.
    pub fn new() -> Self {
        let mut interp = Self {
            env: Env::new(),
            cmds: Vec::new(),
            result: Value::empty(),
            nest: 0,
            error_pos: 0,
            error_kind: None,
        };
        builtins::register_all(&mut interp);
        interp
    }

    /// Register a command. The newest registration of a name wins, so
    /// procs can shadow built-ins and redefine themselves.
    pub fn register<F>(&mut self, name: &[u8], arity: usize, handler: F)
    where
        F: Fn(&mut Interp, &List) -> Flow + 'static,
    {
        self.cmds.push(Cmd {
            name: name.to_vec(),
            arity,
            handler: Rc::new(handler),
        });
    }

    /// The current result value.
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Store `value` as the result and return `flow`, latching the
    /// error kind of an error flow if none is latched yet.
    pub fn set_result(&mut self, flow: Flow, value: Value) -> Flow {
        self.result = value;
        if let Flow::Error(kind) = flow {
            if self.error_kind.is_none() {
                self.error_kind = Some(kind);
            }
        }
        flow
    }

    /// Empty the result and return an error flow of `kind`.
    pub fn set_error(&mut self, kind: ErrorKind) -> Flow {
        self.set_result(Flow::Error(kind), Value::empty())
    }

    /// Read or write a variable in the current scope.
    ///
    /// A binding marked as a global alias redirects to the root frame.
    /// Reading a name with no binding latches `VarUnknown` but still
    /// creates an empty binding, and evaluation continues; the latched
    /// error surfaces when the top-level evaluation finishes.
    ///
    /// Returns a copy of the binding's value after the operation.
    pub fn var(&mut self, name: &[u8], value: Option<Value>) -> Value {
        let target = self.env.resolve(name);
        let exists = matches!(self.env.binding(target, name), Some(Binding::Local(_)));
        if !exists && value.is_none() {
            self.set_error(ErrorKind::VarUnknown);
        }
        let slot = self.env.slot(target, name);
        if let Some(v) = value {
            *slot = Binding::Local(v);
        }
        match slot {
            Binding::Local(v) => v.clone(),
            Binding::GlobalAlias => Value::empty(),
        }
    }

    /// Resolve one lexed span into the result slot: brace literal,
    /// `$variable`, `[nested script]`, or bare text.
    pub fn subst(&mut self, span: &[u8]) -> Flow {
        if span.is_empty() {
            return self.set_result(Flow::Normal, Value::empty());
        }
        match span[0] {
            b'{' => {
                if span.len() <= 1 {
                    return self.set_error(ErrorKind::Syntax);
                }
                let inner = Value::from_script(&span[1..span.len() - 1]);
                self.set_result(Flow::Normal, inner)
            }
            b'$' => {
                if span.len() >= MAX_VAR_LENGTH {
                    return self.set_error(ErrorKind::VarName);
                }
                let value = self.var(&span[1..], None);
                self.set_result(Flow::Normal, value)
            }
            b'[' => {
                if span.len() <= 1 {
                    return self.set_error(ErrorKind::Syntax);
                }
                self.eval_flow(&span[1..span.len() - 1])
            }
            _ => {
                let value = Value::from_script(span);
                self.set_result(Flow::Normal, value)
            }
        }
    }

    fn dispatch(&mut self, args: &List) -> Flow {
        let Some(name) = args.at(0) else {
            return Flow::Normal;
        };
        let count = args.len();
        let handler = self
            .cmds
            .iter()
            .rev()
            .find(|cmd| {
                cmd.name.as_slice() == name.bytes() && (cmd.arity == 0 || cmd.arity == count)
            })
            .map(|cmd| cmd.handler.clone());
        match handler {
            Some(handler) => handler(self, args),
            None => self.set_error(ErrorKind::CmdUnknown),
        }
    }

    /// Evaluate a script, returning the raw flow code.
    ///
    /// This is the entry point used by nested substitution and by the
    /// control-flow built-ins. At nesting depth zero the flow collapses
    /// to an error if any error was latched during the run.
    pub fn eval_flow(&mut self, script: &[u8]) -> Flow {
        self.nest += 1;
        let mut args = List::new();
        let mut cur: Option<Value> = None;
        let mut flow = Flow::Normal;

        for lexeme in Tokenizer::new(script) {
            if self.nest == 1 && self.env.at_root() && self.error_kind.is_none() {
                self.error_pos = lexeme.from;
            }
            match lexeme.kind {
                TokenKind::Error => {
                    flow = self.set_error(ErrorKind::Syntax);
                }
                TokenKind::Word => {
                    flow = self.subst(lexeme.bytes(script));
                    let part = self.result.clone();
                    let word = match cur.take() {
                        Some(mut acc) => {
                            acc.append(part);
                            acc
                        }
                        None => part,
                    };
                    args.push(word);
                }
                TokenKind::Part => {
                    flow = self.subst(lexeme.bytes(script));
                    let part = self.result.clone();
                    match cur.as_mut() {
                        Some(acc) => acc.append(part),
                        None => cur = Some(part),
                    }
                }
                TokenKind::Cmd => {
                    if args.is_empty() {
                        flow = Flow::Normal;
                    } else {
                        flow = self.dispatch(&args);
                        args = List::new();
                    }
                }
            }
            if let Flow::Error(kind) = flow {
                self.set_error(kind);
                break;
            }
        }

        self.nest -= 1;
        if self.nest == 0 {
            if let Some(kind) = self.error_kind {
                flow = Flow::Error(kind);
            }
        }
        flow
    }

    /// Evaluate a script as a fresh top-level run.
    ///
    /// Clears any previously latched error first, so an interpreter
    /// stays usable after a failed script. On success the final result
    /// value is returned.
    pub fn eval(&mut self, script: &[u8]) -> ScriptResult<Value> {
        self.error_kind = None;
        self.error_pos = 0;
        match self.eval_flow(script) {
            Flow::Error(kind) => Err(ScriptError {
                kind,
                offset: self.error_pos,
            }),
            _ => Ok(self.result.clone()),
        }
    }

    /// Translate the latched error offset into a 1-based line and
    /// column within `script`. CR, LF, and CRLF each count as a single
    /// line terminator.
    pub fn error_position(&self, script: &[u8]) -> Option<(usize, usize)> {
        self.error_kind?;
        let end = self.error_pos.min(script.len());
        let mut line = 1;
        let mut base = 0;
        let mut i = 0;
        while i < end {
            let b = script[i];
            i += 1;
            if b == b'\r' || b == b'\n' {
                if b == b'\r' && i < end && script.get(i) == Some(&b'\n') {
                    i += 1;
                }
                line += 1;
                base = i;
            }
        }
        Some((line, end - base + 1))
    }

    /// The latched error kind of the last evaluation, if any.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}
