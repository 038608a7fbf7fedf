//! The built-in command set.

use crate::error::{ErrorKind, Flow};
use crate::expr;
use crate::interp::Interp;
use crate::list::List;
use crate::value::{self, Value};

/// Longest field width honored by `scan` conversions.
const SCAN_FIELD_MAX: usize = 30;

pub(crate) fn register_all(interp: &mut Interp) {
    interp.register(b"set", 0, cmd_set);
    interp.register(b"global", 0, cmd_global);
    interp.register(b"subst", 2, cmd_subst);
    interp.register(b"proc", 4, cmd_proc);
    interp.register(b"if", 0, cmd_if);
    interp.register(b"while", 3, cmd_while);
    interp.register(b"return", 0, cmd_flow);
    interp.register(b"break", 1, cmd_flow);
    interp.register(b"continue", 1, cmd_flow);
    interp.register(b"expr", 0, cmd_expr);
    interp.register(b"incr", 0, cmd_incr);
    interp.register(b"scan", 0, cmd_scan);
    #[cfg(feature = "puts")]
    interp.register(b"puts", 2, cmd_puts);
}

/// Word-count check: at least `min`, at most `max` (0 = unbounded).
fn args_ok(args: &List, min: usize, max: usize) -> bool {
    let n = args.len();
    min <= n && (n <= max || max == 0)
}

/// `set name ?value?`: read or assign a variable; the result is the
/// variable's (new) value.
fn cmd_set(interp: &mut Interp, args: &List) -> Flow {
    if !args_ok(args, 2, 3) {
        return interp.set_error(ErrorKind::Param);
    }
    let name = args.at(1).unwrap_or_default();
    let value = args.at(2);
    let current = interp.var(name.bytes(), value);
    interp.set_result(Flow::Normal, current)
}

/// `global name...`: alias names in the current frame to their root
/// frame bindings.
fn cmd_global(interp: &mut Interp, args: &List) -> Flow {
    if !args_ok(args, 2, 0) {
        return interp.set_error(ErrorKind::Param);
    }
    let mut flow = Flow::Normal;
    for i in 1..args.len() {
        let name = args.at(i).unwrap_or_default();
        if interp.env.current_has(name.bytes()) {
            // A local of that name already exists; it cannot become an
            // alias.
            flow = interp.set_error(ErrorKind::VarName);
        } else if !interp.env.root_has(name.bytes()) {
            flow = interp.set_error(ErrorKind::VarUnknown);
        } else {
            interp.env.alias_to_root(name.bytes());
        }
    }
    flow
}

/// `subst s`: substitute `s` once as a single span.
fn cmd_subst(interp: &mut Interp, args: &List) -> Flow {
    let s = args.at(1).unwrap_or_default();
    interp.subst(s.bytes())
}

/// `proc name params body`: register a user procedure. The handler
/// captures a duplicate of the whole definition argument list.
fn cmd_proc(interp: &mut Interp, args: &List) -> Flow {
    let name = args.at(1).unwrap_or_default();
    let def = args.clone();
    interp.register(name.bytes(), 0, move |interp, call| {
        user_proc(interp, &def, call)
    });
    interp.set_result(Flow::Normal, Value::empty())
}

fn user_proc(interp: &mut Interp, def: &List, args: &List) -> Flow {
    let params = def.at(2).unwrap_or_default();
    let body = def.at(3).unwrap_or_default();
    interp.env.push_frame();
    let params = List::from_value(&params);
    let mut i = 0;
    while let Some(param) = params.at(i) {
        // Missing actuals bind as the empty string.
        let actual = args.at(i + 1).unwrap_or_default();
        interp.var(param.bytes(), Some(actual));
        i += 1;
    }
    let flow = interp.eval_flow(body.bytes());
    interp.env.pop_frame();
    match flow {
        // A return terminates the proc; the frame boundary absorbs it.
        Flow::Return | Flow::Normal => Flow::Normal,
        other => other,
    }
}

/// Build the `expr <cond>` command list used by `if` and `while`.
fn condition_list(cond: &Value) -> List {
    let mut list = List::new();
    list.push(Value::new(b"expr", false));
    list.push(cond.clone());
    list
}

fn eval_condition(interp: &mut Interp, cond: &Value) -> Flow {
    let list = condition_list(cond);
    interp.eval_flow(list.bytes())
}

/// `if cond body ?then? ?elseif cond body?* ?else body?` with the
/// keywords optional: two consecutive blocks form an implicit `elseif`
/// pair, a trailing lone block an implicit `else`.
fn cmd_if(interp: &mut Interp, args: &List) -> Flow {
    if !args_ok(args, 3, 0) {
        return interp.set_error(ErrorKind::Param);
    }
    let n = args.len();
    let mut i = 1;
    let mut flow = Flow::Normal;
    while i < n {
        let cond = args.at(i).unwrap_or_default();
        i += 1;
        let mut branch = if i < n {
            let b = args.at(i);
            i += 1;
            b
        } else {
            None
        };
        if branch.as_ref().is_some_and(|b| b.bytes() == b"then") {
            branch = if i < n {
                let b = args.at(i);
                i += 1;
                b
            } else {
                None
            };
        }
        flow = eval_condition(interp, &cond);
        if flow != Flow::Normal {
            break;
        }
        let Some(branch) = branch else {
            return interp.set_error(ErrorKind::Param);
        };
        if interp.result().int() != 0 {
            flow = interp.eval_flow(branch.bytes());
            break;
        }
        // Branch not taken; see how the chain continues.
        if i < n {
            let peek = args.at(i).unwrap_or_default();
            if peek.bytes() == b"elseif" {
                i += 1;
            } else if peek.bytes() == b"else" {
                i += 1;
                if i >= n {
                    return interp.set_error(ErrorKind::Param);
                }
                let branch = args.at(i).unwrap_or_default();
                flow = interp.eval_flow(branch.bytes());
                break;
            } else if i + 1 < n {
                // No keyword but two blocks remain: implicit elseif,
                // `peek` is the next condition.
            } else {
                // A trailing lone block is the implicit else.
                flow = interp.eval_flow(peek.bytes());
                break;
            }
        }
    }
    flow
}

/// `while cond body`: `continue` re-tests the condition, `break` exits
/// as normal, `return` and errors propagate.
fn cmd_while(interp: &mut Interp, args: &List) -> Flow {
    let cond = args.at(1).unwrap_or_default();
    let body = args.at(2).unwrap_or_default();
    loop {
        let flow = eval_condition(interp, &cond);
        if flow != Flow::Normal {
            return flow;
        }
        if interp.result().int() == 0 {
            return Flow::Normal;
        }
        match interp.eval_flow(body.bytes()) {
            Flow::Normal | Flow::Again => {}
            Flow::Break => return Flow::Normal,
            other => return other,
        }
    }
}

/// `return ?v?`, `break`, `continue`: emit the flow code named by the
/// command word.
fn cmd_flow(interp: &mut Interp, args: &List) -> Flow {
    let name = args.at(0).unwrap_or_default();
    match name.bytes() {
        b"break" => Flow::Break,
        b"continue" => Flow::Again,
        b"return" => {
            let value = args.at(1).unwrap_or_default();
            interp.set_result(Flow::Return, value)
        }
        _ => interp.set_error(ErrorKind::CmdUnknown),
    }
}

/// `incr name ?by?`: add `by` (default 1) to an integer variable.
fn cmd_incr(interp: &mut Interp, args: &List) -> Flow {
    if !args_ok(args, 2, 3) {
        return interp.set_error(ErrorKind::Param);
    }
    let by = if args.len() == 3 {
        args.at(2).unwrap_or_default().int()
    } else {
        1
    };
    let name = args.at(1).unwrap_or_default();
    let current = interp.var(name.bytes(), None).int();
    let updated = Value::from_int(current.wrapping_add(by));
    interp.var(name.bytes(), Some(updated.clone()));
    interp.set_result(Flow::Normal, updated)
}

/// `expr ...`: rejoin the pre-tokenized arguments with single spaces
/// and evaluate the integer expression.
fn cmd_expr(interp: &mut Interp, args: &List) -> Flow {
    let mut src = Vec::new();
    for i in 1..args.len() {
        let tok = args.at(i).unwrap_or_default();
        if !src.is_empty() {
            src.push(b' ');
        }
        src.extend_from_slice(tok.bytes());
    }
    match expr::eval(interp, &src) {
        Ok(v) => interp.set_result(Flow::Normal, Value::from_int(v)),
        Err(_) => interp.set_result(Flow::Error(ErrorKind::Expr), Value::empty()),
    }
}

/// `scan str fmt ?vars?`: restricted sscanf with `%c`, `%d`, `%i`,
/// `%x`, and optional field widths. Assigns each conversion to the next
/// positional variable; the result is the number of conversions made.
fn cmd_scan(interp: &mut Interp, args: &List) -> Flow {
    if !args_ok(args, 3, 0) {
        return interp.set_error(ErrorKind::Param);
    }
    let input = args.at(1).unwrap_or_default();
    let format = args.at(2).unwrap_or_default();
    let s = input.bytes();
    let f = format.bytes();
    let mut si = 0;
    let mut fi = 0;
    let mut matches = 0usize;

    while fi < f.len() {
        if f[fi] == b'%' {
            fi += 1;
            let mut field: &[u8] = &[];
            if f.get(fi).is_some_and(u8::is_ascii_digit) {
                let mut width = 0usize;
                while f.get(fi).is_some_and(u8::is_ascii_digit) {
                    width = width * 10 + (f[fi] - b'0') as usize;
                    fi += 1;
                }
                if width > 0 && width <= SCAN_FIELD_MAX {
                    let take = width.min(s.len() - si.min(s.len()));
                    field = &s[si..si + take];
                    si += take;
                }
            }
            let conv = f.get(fi).copied().unwrap_or(0);
            fi += 1;
            let mut v: i64 = 0;
            match conv {
                b'c' => {
                    if let Some(&b) = field.first() {
                        v = b as i64;
                    } else if let Some(&b) = s.get(si) {
                        v = b as i64;
                        si += 1;
                    }
                }
                b'd' | b'i' | b'x' => {
                    let radix = match conv {
                        b'd' => 10,
                        b'x' => 16,
                        _ => 0,
                    };
                    v = if field.is_empty() {
                        value::scan_integer(s, &mut si, radix)
                    } else {
                        let mut p = 0;
                        value::scan_integer(field, &mut p, radix)
                    };
                }
                _ => {}
            }
            matches += 1;
            if let Some(var) = args.at(matches + 2) {
                interp.var(var.bytes(), Some(Value::from_int(v)));
            }
        } else if s.get(si) == Some(&f[fi]) {
            fi += 1;
            si += 1;
        } else {
            break;
        }
    }

    interp.set_result(Flow::Normal, Value::from_int(matches as i64))
}

/// `puts s`: write `s` and a newline to stdout; the result is `s`.
#[cfg(feature = "puts")]
fn cmd_puts(interp: &mut Interp, args: &List) -> Flow {
    use std::io::Write;

    let text = args.at(1).unwrap_or_default();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let _ = out.write_all(text.bytes());
    let _ = out.write_all(b"\n");
    interp.set_result(Flow::Normal, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &[u8]) -> Value {
        let mut interp = Interp::new();
        interp.eval(script).expect("script should succeed")
    }

    fn run_err(script: &[u8]) -> ErrorKind {
        let mut interp = Interp::new();
        interp.eval(script).expect_err("script should fail").kind
    }

    #[test]
    fn test_set_read_and_write() {
        assert_eq!(run(b"set a 7; set a").bytes(), b"7");
    }

    #[test]
    fn test_set_wrong_arity() {
        assert_eq!(run_err(b"set"), ErrorKind::Param);
        assert_eq!(run_err(b"set a b c"), ErrorKind::Param);
    }

    #[test]
    fn test_incr_default_and_by() {
        assert_eq!(run(b"set i 4; incr i").bytes(), b"5");
        assert_eq!(run(b"set i 4; incr i 10").bytes(), b"14");
        assert_eq!(run(b"set i 4; incr i -1").bytes(), b"3");
    }

    #[test]
    fn test_incr_unset_variable_latches() {
        assert_eq!(run_err(b"incr nope"), ErrorKind::VarUnknown);
    }

    #[test]
    fn test_subst_single_span() {
        assert_eq!(run(b"subst {hello world}").bytes(), b"hello world");
        // The brace quoting defers substitution to `subst` itself.
        assert_eq!(run(b"set a 5; subst {$a}").bytes(), b"5");
        assert_eq!(run(b"set a 5; subst \"$a\"").bytes(), b"5");
    }

    #[test]
    fn test_proc_definition_and_call() {
        assert_eq!(run(b"proc add {x y} { expr $x + $y }; add 2 3").bytes(), b"5");
    }

    #[test]
    fn test_proc_missing_actuals_bind_empty() {
        let result = run(b"proc p {a b} { set b }; p only");
        assert!(result.is_empty());
    }

    #[test]
    fn test_proc_return_collapses_at_boundary() {
        assert_eq!(run(b"proc p {} { return 9 }; p").bytes(), b"9");
    }

    #[test]
    fn test_proc_redefinition_shadows() {
        assert_eq!(
            run(b"proc p {} { return 1 }; proc p {} { return 2 }; p").bytes(),
            b"2"
        );
    }

    #[test]
    fn test_global_requires_existing_root() {
        assert_eq!(run_err(b"proc p {} { global nope }; p"), ErrorKind::VarUnknown);
    }

    #[test]
    fn test_global_collision_with_local() {
        assert_eq!(
            run_err(b"set g 1; proc p {} { set g 2; global g }; p"),
            ErrorKind::VarName
        );
    }

    #[test]
    fn test_if_true_branch() {
        assert_eq!(run(b"if {1 < 2} { set x A }; set x").bytes(), b"A");
    }

    #[test]
    fn test_if_then_else_keywords() {
        assert_eq!(
            run(b"if {0} then { set x A } else { set x B }; set x").bytes(),
            b"B"
        );
    }

    #[test]
    fn test_if_implicit_elseif_and_else() {
        assert_eq!(
            run(b"if {0} { set x A } {0} { set x B } { set x C }; set x").bytes(),
            b"C"
        );
        assert_eq!(
            run(b"if {0} { set x A } {1} { set x B } { set x C }; set x").bytes(),
            b"B"
        );
    }

    #[test]
    fn test_if_without_branch_is_param_error() {
        assert_eq!(run_err(b"if {1}"), ErrorKind::Param);
        assert_eq!(run_err(b"if {0} { set x A } else"), ErrorKind::Param);
    }

    #[test]
    fn test_while_counts() {
        assert_eq!(run(b"set i 0; while {$i < 5} { incr i }; set i").bytes(), b"5");
    }

    #[test]
    fn test_while_break_returns_normal() {
        assert_eq!(run(b"set i 0; while {1} { break }; set i").bytes(), b"0");
    }

    #[test]
    fn test_while_continue_keeps_looping() {
        assert_eq!(
            run(b"set i 0; while {$i < 3} { incr i; continue }; set i").bytes(),
            b"3"
        );
    }

    #[test]
    fn test_while_condition_error_propagates() {
        assert_eq!(run_err(b"while {1 /} { break }"), ErrorKind::Expr);
    }

    #[test]
    fn test_return_value_defaults_to_empty() {
        let mut interp = Interp::new();
        interp.eval(b"proc p {} { return }; p").unwrap();
        assert!(interp.result().is_empty());
    }

    #[test]
    fn test_scan_decimal_pair() {
        assert_eq!(run(b"scan {42 7} {%d %d} a b; set a").bytes(), b"42");
        assert_eq!(run(b"scan {42 7} {%d %d} a b; set b").bytes(), b"7");
        assert_eq!(run(b"scan {42 7} {%d %d} a b").bytes(), b"2");
    }

    #[test]
    fn test_scan_hex_and_char() {
        assert_eq!(run(b"scan ff %x v; set v").bytes(), b"255");
        assert_eq!(run(b"scan abc %c v; set v").bytes(), b"97");
    }

    #[test]
    fn test_scan_auto_radix() {
        assert_eq!(run(b"scan 0x20 %i v; set v").bytes(), b"32");
    }

    #[test]
    fn test_scan_field_width() {
        assert_eq!(run(b"scan 1234 {%2d%2d} a b; expr $a + $b").bytes(), b"46");
    }

    #[test]
    fn test_scan_literal_mismatch_stops() {
        assert_eq!(run(b"scan {1,2} {%d.%d} a b").bytes(), b"1");
    }

    #[test]
    fn test_expr_builtin_joins_words() {
        assert_eq!(run(b"set a 10; set b 20; expr $a + $b").bytes(), b"30");
    }

    #[test]
    fn test_expr_error_kind() {
        assert_eq!(run_err(b"expr {1 / 0}"), ErrorKind::Expr);
    }
}
