//! The line-oriented execution engine: an instruction pointer walking a
//! line array, dispatching each tokenized statement and mutating runtime
//! state or jumping.

use std::io::{BufRead, Write};

use tracing::{error, trace};

use crate::error::RuntimeError;
use crate::runtime::{ActiveException, CallFrame, ExceptionFrame, LoopFrame, Runtime};
use crate::token::{tokenize, Token, TokenizerContext};
use crate::value::{self, Value};

/// A `RuntimeError` tagged with the 1-based source line it occurred on,
/// matching the `Error on line <N>: ...` reporting format. Rendering that
/// line belongs one layer up, in the CLI — this type only carries the
/// information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub line: usize,
    pub error: RuntimeError,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error on line {}: {}", self.line, self.error)
    }
}

impl std::error::Error for EngineError {}

/// What a block-opening line starts.
const BLOCK_OPENERS: &[&str] = &["SI", "DUM", "FAC", "CAPE"];

fn strip_comment_and_trim(line: &str) -> &str {
    let code = match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    };
    code.trim()
}

/// Forward-scan from `start` (the line after a block opener) for the
/// matching `FINIS`, optionally stopping early at an `ALITER` seen at
/// depth 1. This only ever looks at the span it's asked to scan, so it
/// is blind to blocks outside that span.
fn scan_to_terminator(lines: &[String], start: usize, stop_at_else: bool) -> Option<ScanResult> {
    let mut depth = 1usize;
    let mut i = start;
    while i < lines.len() {
        let code = strip_comment_and_trim(&lines[i]);
        if code == "FINIS" {
            depth -= 1;
            if depth == 0 {
                return Some(ScanResult::Finis(i));
            }
        } else if stop_at_else && depth == 1 && code == "ALITER" {
            return Some(ScanResult::Aliter(i));
        } else if BLOCK_OPENERS.iter().any(|kw| code == *kw || code.starts_with(&format!("{kw} "))) {
            depth += 1;
        }
        i += 1;
    }
    None
}

enum ScanResult {
    Finis(usize),
    Aliter(usize),
}

/// `(Value, tokens_consumed)` for a single operand term: a literal, a
/// bare variable reference, or a `Variable Genitive` field read.
fn eval_operand(tokens: &[Token], runtime: &Runtime) -> Result<(Value, usize), RuntimeError> {
    match tokens.first() {
        Some(Token::Number(n)) => Ok((Value::Integer(*n), 1)),
        Some(Token::Str(s)) => Ok((Value::Str(s.clone()), 1)),
        Some(Token::Variable(v)) => {
            if let Some(Token::Genitive(obj)) = tokens.get(1) {
                Ok((read_field(runtime, obj, v)?, 2))
            } else {
                let value = runtime
                    .get(v)
                    .cloned()
                    .ok_or_else(|| RuntimeError::Undeclared { name: v.clone() })?;
                Ok((value, 1))
            }
        }
        _ => Err(RuntimeError::Syntax { after: "operand".to_string() }),
    }
}

fn read_field(runtime: &Runtime, obj_nom: &str, field: &str) -> Result<Value, RuntimeError> {
    match runtime.get(obj_nom) {
        Some(Value::Record(map)) => map.get(field).cloned().ok_or_else(|| RuntimeError::FieldMiss {
            record: obj_nom.to_string(),
            field: field.to_string(),
        }),
        Some(other) => Err(RuntimeError::TypeMismatch {
            expected: "Record",
            found: other.type_name(),
        }),
        None => Err(RuntimeError::Undeclared { name: obj_nom.to_string() }),
    }
}

/// Evaluate a full right-hand-side token sequence: either a two-operand
/// operator keyword (`ADDE`, `IVNGE`, ...) or a single operand term.
fn eval_expr(tokens: &[Token], runtime: &Runtime) -> Result<Value, RuntimeError> {
    if let Some(Token::Keyword(kw)) = tokens.first() {
        let op = kw.as_str();
        let rest = &tokens[1..];
        let (a, used_a) = eval_operand(rest, runtime)
            .map_err(|_| RuntimeError::Syntax { after: format!("{op} (first operand)") })?;
        let (b, _) = eval_operand(&rest[used_a..], runtime)
            .map_err(|_| RuntimeError::Syntax { after: format!("{op} (second operand)") })?;
        return match op {
            "IVNGE" => Ok(value::concat(&a, &b)),
            "INCIPITCVM" => Ok(value::starts_with(&a, &b)),
            "FINITVRCVM" => Ok(value::ends_with(&a, &b)),
            "CONTINET" => Ok(value::contains(&a, &b)),
            "INDICEDE" => Ok(value::index_of(&a, &b)),
            "ADDE" => value::add(&a, &b),
            "DEME" => value::sub(&a, &b),
            "MVLTIPLICA" => value::mul(&a, &b),
            "DVCE" => value::div(&a, &b),
            _ => Err(RuntimeError::Syntax { after: "EST".to_string() }),
        };
    }
    let (value, _) = eval_operand(tokens, runtime)?;
    Ok(value)
}

/// Locate the comparison keyword (`AEQUAT`/`MAIVS`/`MINOR`) in a `SI`/
/// `DUM` condition, splitting it into its `a` and `b` operand spans. The
/// first operand may be one token (literal/variable) or two (a field
/// read), so the operator's position isn't fixed — it's the first
/// keyword token after the statement's own leading keyword.
fn locate_operator(tokens: &[Token]) -> Option<(usize, &str)> {
    tokens.iter().enumerate().skip(1).find_map(|(i, t)| match t {
        Token::Keyword(k) => Some((i, k.as_str())),
        _ => None,
    })
}

/// `SI`/`DUM` condition evaluation: both operands are simple terms,
/// evaluated with the same rules as any other read site.
fn eval_condition(op: &str, a_tokens: &[Token], b_tokens: &[Token], runtime: &Runtime) -> Result<bool, RuntimeError> {
    let (a, _) = eval_operand(a_tokens, runtime)?;
    let (b, _) = eval_operand(b_tokens, runtime)?;
    match op {
        "AEQUAT" => value::equals(&a, &b),
        "MAIVS" => Ok(value::compare(&a, &b)?.is_gt()),
        "MINOR" => Ok(value::compare(&a, &b)?.is_lt()),
        _ => Err(RuntimeError::Syntax { after: "SI/DUM".to_string() }),
    }
}

/// What happened after executing one line: advance, or jump to a
/// specific line, or the program terminated (a handled exception that
/// consumes the rest of the run, per `FINIS`'s termination clause).
enum Outcome {
    Next,
    Jump(usize),
    Terminate,
}

/// One interpreter session. Owns all runtime state and is reused across
/// lines in both file mode and the REPL.
pub struct Engine {
    pub runtime: Runtime,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self { runtime: Runtime::new() }
    }

    fn tokenizer_context(&self) -> (Vec<String>, Vec<String>, Vec<String>) {
        let declared_order: Vec<String> = self.runtime.declared_names().cloned().collect();
        let function_names: Vec<String> = self.runtime.functions.keys().cloned().collect();
        let exception_names: Vec<String> = self
            .runtime
            .exception_stack
            .iter()
            .map(|f| f.exception_name.clone())
            .collect();
        (declared_order, function_names, exception_names)
    }

    fn tokenize_line(&self, line: &str) -> Result<Vec<Token>, RuntimeError> {
        let (declared_order, function_names, exception_names) = self.tokenizer_context();
        let ctx = TokenizerContext {
            declared_order: &declared_order,
            declensions: &self.runtime.declensions,
            function_names: &function_names,
            exception_names: &exception_names,
        };
        tokenize(line, &ctx)
    }

    /// Run a complete program: source text split into lines, executed
    /// from line 0 until the instruction pointer runs off the end.
    pub fn run_program<R: BufRead, W: Write, Err: Write>(
        &mut self,
        source: &str,
        stdin: &mut R,
        stdout: &mut W,
        stderr: &mut Err,
    ) -> Result<(), EngineError> {
        let lines: Vec<String> = source.lines().map(|l| l.to_string()).collect();
        trace!(lines = lines.len(), "program loaded");
        let mut ip = 0usize;
        while ip < lines.len() {
            trace!(line = ip + 1, code = %lines[ip], "executing line");
            match self.execute_line(&lines, ip, stdin, stdout, stderr) {
                Ok(Outcome::Next) => ip += 1,
                Ok(Outcome::Jump(target)) => ip = target,
                Ok(Outcome::Terminate) => break,
                Err(runtime_error) => {
                    error!(line = ip + 1, %runtime_error, "fatal error");
                    return Err(EngineError { line: ip + 1, error: runtime_error });
                }
            }
        }
        Ok(())
    }

    /// Execute a single already-tokenized-able line, used directly by the
    /// REPL, which has no surrounding line array to scan blocks against —
    /// block-forming statements are rejected there by the one-line-at-a-
    /// time contract's own grammar (a `FAC`/`SI`/`DUM` header has nowhere
    /// to forward-scan to).
    pub fn execute_repl_line<R: BufRead, W: Write, Err: Write>(
        &mut self,
        line: &str,
        stdin: &mut R,
        stdout: &mut W,
        stderr: &mut Err,
    ) -> Result<(), RuntimeError> {
        let single = [line.to_string()];
        match self.execute_line(&single, 0, stdin, stdout, stderr)? {
            Outcome::Next | Outcome::Terminate => Ok(()),
            Outcome::Jump(_) => Ok(()),
        }
    }

    fn execute_line<R: BufRead, W: Write, Err: Write>(
        &mut self,
        lines: &[String],
        ip: usize,
        stdin: &mut R,
        stdout: &mut W,
        stderr: &mut Err,
    ) -> Result<Outcome, RuntimeError> {
        let code = strip_comment_and_trim(&lines[ip]);
        if code.is_empty() {
            return Ok(Outcome::Next);
        }
        let tokens = self.tokenize_line(code)?;
        if tokens.is_empty() {
            return Ok(Outcome::Next);
        }

        let result = self.dispatch(&tokens, lines, ip, stdin, stdout, stderr);
        self.catch_if_possible(result)
    }

    /// If a dispatched statement raised a catchable error (division by
    /// zero, or `IACE` of a thrown exception) and a matching `CAPE`
    /// handler is installed, jump to its body instead of propagating.
    fn catch_if_possible(&mut self, result: Result<Outcome, RuntimeError>) -> Result<Outcome, RuntimeError> {
        let error = match result {
            Ok(outcome) => return Ok(outcome),
            Err(error) => error,
        };
        let Some(name) = error.exception_name().map(str::to_string) else {
            return Err(error);
        };
        if let Some(pos) = self
            .runtime
            .exception_stack
            .iter()
            .rposition(|frame| frame.exception_name == name)
        {
            let cape_line = self.runtime.exception_stack[pos].cape_line;
            let message = match &error {
                RuntimeError::Thrown { message, .. } => message.clone(),
                _ => None,
            };
            self.runtime.current_exception = Some(ActiveException { name, message });
            // Jump back to the `CAPE` line itself, not straight into the
            // body: CAPE's own in-flight check is what admits control.
            return Ok(Outcome::Jump(cape_line));
        }
        Err(error)
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch<R: BufRead, W: Write, Err: Write>(
        &mut self,
        tokens: &[Token],
        lines: &[String],
        ip: usize,
        stdin: &mut R,
        stdout: &mut W,
        stderr: &mut Err,
    ) -> Result<Outcome, RuntimeError> {
        match &tokens[0] {
            Token::Keyword(kw) => self.dispatch_keyword(kw, tokens, lines, ip, stdin, stdout, stderr),
            Token::Variable(_) => self.dispatch_assignment(tokens, ip),
            Token::Genitive(_) | Token::Number(_) | Token::Str(_) => {
                Err(RuntimeError::UnknownStatement)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch_keyword<R: BufRead, W: Write, Err: Write>(
        &mut self,
        kw: &str,
        tokens: &[Token],
        lines: &[String],
        ip: usize,
        stdin: &mut R,
        stdout: &mut W,
        stderr: &mut Err,
    ) -> Result<Outcome, RuntimeError> {
        match kw {
            "SIT" => {
                let Token::Variable(name) = &tokens[1] else {
                    return Err(RuntimeError::Syntax { after: "SIT".to_string() });
                };
                self.runtime.declare(name);
                Ok(Outcome::Next)
            }
            "SCRIBE" => self.print_statement(tokens, stdout, "SCRIBE"),
            "AVDI" => self.print_statement(tokens, stderr, "AVDI"),
            "NOTA" => self.print_statement(tokens, stderr, "NOTA"),
            "LEGO" => self.read_statement(tokens, stdin),
            "SI" => self.si_statement(tokens, lines, ip),
            "ALITER" => {
                match scan_to_terminator(lines, ip + 1, false) {
                    Some(ScanResult::Finis(line)) => Ok(Outcome::Jump(line)),
                    _ => Err(RuntimeError::UnterminatedBlock { opener: "ALITER" }),
                }
            }
            "DUM" => self.dum_statement(tokens, lines, ip),
            "FAC" => self.fac_statement(tokens, lines, ip),
            "REDDO" => self.reddo_statement(tokens, ip),
            "IACE" => self.iace_statement(tokens),
            "CAPE" => self.cape_statement(tokens, lines, ip),
            "FINIS" => self.finis_statement(lines, ip),
            _ => Err(RuntimeError::UnknownStatement),
        }
    }

    fn print_statement<W: Write>(&self, tokens: &[Token], out: &mut W, after: &str) -> Result<Outcome, RuntimeError> {
        if tokens.len() < 2 {
            return Err(RuntimeError::Syntax { after: after.to_string() });
        }
        let value = eval_expr(&tokens[1..], &self.runtime)?;
        let prefix = match after {
            "AVDI" => "[DEBUG] ",
            "NOTA" => "[LOG] ",
            _ => "",
        };
        let _ = writeln!(out, "{prefix}{value}");
        Ok(Outcome::Next)
    }

    fn read_statement<R: BufRead>(&mut self, tokens: &[Token], stdin: &mut R) -> Result<Outcome, RuntimeError> {
        let Some(Token::Variable(name)) = tokens.get(1) else {
            return Err(RuntimeError::Syntax { after: "LEGO".to_string() });
        };
        if !self.runtime.is_declared(name) {
            return Err(RuntimeError::Undeclared { name: name.clone() });
        }
        let mut line = String::new();
        // EOF or any read failure falls back to Integer 0.
        let value = match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => Value::Integer(0),
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']).trim();
                if let Some(n) = crate::roman::parse(trimmed) {
                    Value::Integer(n)
                } else {
                    let unquoted = trimmed
                        .strip_prefix('"')
                        .and_then(|s| s.strip_suffix('"'))
                        .unwrap_or(trimmed);
                    Value::Str(unquoted.to_string())
                }
            }
        };
        self.runtime.set(name, value);
        Ok(Outcome::Next)
    }

    fn si_statement(&mut self, tokens: &[Token], lines: &[String], ip: usize) -> Result<Outcome, RuntimeError> {
        let (op_idx, op) =
            locate_operator(tokens).ok_or(RuntimeError::Syntax { after: "SI".to_string() })?;
        let is_true = eval_condition(op, &tokens[1..op_idx], &tokens[op_idx + 1..], &self.runtime)?;
        if is_true {
            self.runtime.block_depth += 1;
            Ok(Outcome::Next)
        } else {
            match scan_to_terminator(lines, ip + 1, true) {
                Some(ScanResult::Aliter(line)) => {
                    self.runtime.block_depth += 1;
                    Ok(Outcome::Jump(line + 1))
                }
                Some(ScanResult::Finis(line)) => {
                    self.runtime.block_depth += 1;
                    Ok(Outcome::Jump(line))
                }
                None => Err(RuntimeError::UnterminatedBlock { opener: "SI" }),
            }
        }
    }

    fn dum_statement(&mut self, tokens: &[Token], lines: &[String], ip: usize) -> Result<Outcome, RuntimeError> {
        let (op_idx, op) =
            locate_operator(tokens).ok_or(RuntimeError::Syntax { after: "DUM".to_string() })?;
        let is_true = eval_condition(op, &tokens[1..op_idx], &tokens[op_idx + 1..], &self.runtime)?;
        if is_true {
            self.runtime.loop_stack.push(LoopFrame { header_line: ip, depth_at_entry: self.runtime.block_depth });
            self.runtime.block_depth += 1;
            Ok(Outcome::Next)
        } else {
            match scan_to_terminator(lines, ip + 1, false) {
                Some(ScanResult::Finis(line)) => Ok(Outcome::Jump(line + 1)),
                _ => Err(RuntimeError::UnterminatedBlock { opener: "DUM" }),
            }
        }
    }

    fn fac_statement(&mut self, tokens: &[Token], lines: &[String], ip: usize) -> Result<Outcome, RuntimeError> {
        let Some(Token::Variable(name)) = tokens.get(1) else {
            return Err(RuntimeError::Syntax { after: "FAC".to_string() });
        };
        let params: Vec<String> = tokens[2..]
            .iter()
            .map(|t| match t {
                Token::Variable(p) => Ok(p.clone()),
                _ => Err(RuntimeError::Syntax { after: "FAC".to_string() }),
            })
            .collect::<Result<_, _>>()?;
        match scan_to_terminator(lines, ip + 1, false) {
            Some(ScanResult::Finis(finis_line)) => {
                self.runtime.functions.insert(
                    name.clone(),
                    crate::runtime::FunctionEntry {
                        params,
                        body_start: ip + 1,
                        body_end: finis_line.saturating_sub(1),
                    },
                );
                Ok(Outcome::Jump(finis_line + 1))
            }
            _ => Err(RuntimeError::UnterminatedBlock { opener: "FAC" }),
        }
    }

    fn reddo_statement(&mut self, tokens: &[Token], _ip: usize) -> Result<Outcome, RuntimeError> {
        let value = eval_expr(&tokens[1..], &self.runtime)?;
        let frame = self
            .runtime
            .call_stack
            .pop()
            .ok_or(RuntimeError::ReddoOutsideFunction)?;
        self.runtime.restore(frame.snapshot);
        if let Some(dest) = &frame.destination {
            self.runtime.set(dest, value);
        }
        Ok(Outcome::Jump(frame.caller_ip + 1))
    }

    fn iace_statement(&mut self, tokens: &[Token]) -> Result<Outcome, RuntimeError> {
        let Some(Token::Variable(name)) = tokens.get(1) else {
            return Err(RuntimeError::Syntax { after: "IACE".to_string() });
        };
        let message = match tokens.get(2) {
            Some(Token::Str(s)) => Some(s.clone()),
            _ => None,
        };
        Err(RuntimeError::Thrown { name: name.clone(), message })
    }

    fn cape_statement(&mut self, tokens: &[Token], lines: &[String], ip: usize) -> Result<Outcome, RuntimeError> {
        let Some(Token::Variable(name)) = tokens.get(1) else {
            return Err(RuntimeError::Syntax { after: "CAPE".to_string() });
        };
        let in_flight = self
            .runtime
            .current_exception
            .as_ref()
            .map(|e| &e.name == name)
            .unwrap_or(false);
        if in_flight {
            // Already installed (every CAPE line runs once, not-in-flight,
            // before any exception can target it); just enter the body.
            self.runtime.current_exception = None;
            if let Some(frame) = self.runtime.exception_stack.iter_mut().find(|f| f.cape_line == ip) {
                frame.caught = true;
            }
            self.runtime.block_depth += 1;
            Ok(Outcome::Next)
        } else {
            let depth_at_entry = self.runtime.block_depth;
            match scan_to_terminator(lines, ip + 1, false) {
                Some(ScanResult::Finis(finis_line)) => {
                    self.runtime.exception_stack.push(ExceptionFrame {
                        exception_name: name.clone(),
                        cape_line: ip,
                        pending_skip: true,
                        depth_at_entry,
                        caught: false,
                    });
                    // Pre-increment so this FINIS's decrement nets to
                    // zero, the same trick SI's false-with-no-ALITER
                    // branch uses when jumping straight to FINIS.
                    self.runtime.block_depth += 1;
                    Ok(Outcome::Jump(finis_line))
                }
                None => Err(RuntimeError::UnterminatedBlock { opener: "CAPE" }),
            }
        }
    }

    fn finis_statement(&mut self, lines: &[String], ip: usize) -> Result<Outcome, RuntimeError> {
        // Falling through to a function's own FINIS without a REDDO is an
        // implicit `REDDO NIHIL`. This FINIS never had a matching block-depth
        // increment (FAC doesn't open a block for its own definition), so it
        // must not go through the SI/DUM/CAPE decrement below.
        if matches!(self.runtime.call_stack.last(), Some(frame) if frame.finis_line == ip) {
            let frame = self.runtime.call_stack.pop().unwrap();
            self.runtime.restore(frame.snapshot);
            if let Some(dest) = &frame.destination {
                self.runtime.set(dest, Value::Integer(0));
            }
            return Ok(Outcome::Jump(frame.caller_ip + 1));
        }

        self.runtime.block_depth = self.runtime.block_depth.saturating_sub(1);

        if let Some(frame) = self.runtime.exception_stack.last_mut() {
            if frame.pending_skip {
                frame.pending_skip = false;
                return self.pop_matching_loop(ip);
            }
        }

        if let Some(frame) = self.runtime.exception_stack.last() {
            // Only the CAPE frame's *own* closing FINIS — reached after an
            // exception actually admitted control into its body — ends the
            // program. Matching `depth_at_entry` (not merely "some FINIS
            // after this CAPE's line") keeps unrelated later blocks, and
            // blocks nested inside the handler body itself, from tripping
            // this check.
            if frame.caught && self.runtime.block_depth == frame.depth_at_entry {
                self.runtime.exception_stack.pop();
                return Ok(Outcome::Terminate);
            }
        }

        self.pop_matching_loop(ip)
    }

    fn pop_matching_loop(&mut self, _ip: usize) -> Result<Outcome, RuntimeError> {
        if let Some(frame) = self.runtime.loop_stack.last() {
            if frame.depth_at_entry == self.runtime.block_depth {
                let header = self.runtime.loop_stack.pop().unwrap().header_line;
                return Ok(Outcome::Jump(header));
            }
        }
        Ok(Outcome::Next)
    }

    fn dispatch_assignment(&mut self, tokens: &[Token], ip: usize) -> Result<Outcome, RuntimeError> {
        // Field assignment: `Fname Gen EST rhs`.
        if let (Token::Variable(field), Some(Token::Genitive(obj))) = (&tokens[0], tokens.get(1)) {
            if matches!(tokens.get(2), Some(Token::Keyword(k)) if k == "EST") {
                if !self.runtime.is_declared(obj) {
                    return Err(RuntimeError::Undeclared { name: obj.clone() });
                }
                let value = eval_expr(&tokens[3..], &self.runtime)?;
                let mut record = match self.runtime.get(obj) {
                    Some(Value::Record(map)) => map.clone(),
                    Some(Value::Integer(0)) | None => std::collections::HashMap::new(),
                    Some(other) => {
                        return Err(RuntimeError::TypeMismatch {
                            expected: "Record",
                            found: other.type_name(),
                        })
                    }
                };
                record.insert(field.clone(), value);
                self.runtime.set(obj, Value::Record(record));
                return Ok(Outcome::Next);
            }
        }

        // Plain assignment: `V EST rhs`, including `V EST VOCA F args...`.
        let Token::Variable(name) = &tokens[0] else {
            return Err(RuntimeError::UnknownStatement);
        };
        if !matches!(tokens.get(1), Some(Token::Keyword(k)) if k == "EST") {
            return Err(RuntimeError::UnknownStatement);
        }
        if !self.runtime.is_declared(name) {
            return Err(RuntimeError::Undeclared { name: name.clone() });
        }
        if let Some(Token::Keyword(k)) = tokens.get(2) {
            if k == "VOCA" {
                return self.voca_call(name, &tokens[3..], ip);
            }
        }
        let value = eval_expr(&tokens[2..], &self.runtime)?;
        self.runtime.set(name, value);
        Ok(Outcome::Next)
    }

    /// Function-call mechanics: snapshot, bind parameters, push a call
    /// frame carrying the destination variable explicitly (replacing a
    /// process-wide `__CALLING_VAR__` sentinel with an explicit field),
    /// and jump into the body.
    fn voca_call(&mut self, dest: &str, rest: &[Token], ip: usize) -> Result<Outcome, RuntimeError> {
        let Some(Token::Variable(fname)) = rest.first() else {
            return Err(RuntimeError::Syntax { after: "VOCA".to_string() });
        };
        let entry = self
            .runtime
            .functions
            .get(fname)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedFunction { name: fname.clone() })?;

        let mut args = Vec::new();
        let mut cursor = &rest[1..];
        while !cursor.is_empty() {
            let (value, used) = eval_operand(cursor, &self.runtime)?;
            args.push(value);
            cursor = &cursor[used..];
        }
        if args.len() != entry.params.len() {
            return Err(RuntimeError::Arity {
                function: fname.clone(),
                expected: entry.params.len(),
                found: args.len(),
            });
        }

        let snapshot = self.runtime.snapshot();
        for (param, value) in entry.params.iter().zip(args) {
            self.runtime.set(param, value);
        }
        self.runtime.call_stack.push(CallFrame {
            caller_ip: ip,
            snapshot,
            destination: Some(dest.to_string()),
            finis_line: entry.body_end + 1,
        });
        Ok(Outcome::Jump(entry.body_start))
    }
}
