//! tico-interp - the Tico language engine.
//!
//! An embeddable interpreter for a small command-oriented scripting
//! language in the Tcl tradition. The host creates an [`Interp`],
//! registers any commands of its own, and evaluates byte buffers:
//!
//! ```
//! use tico_interp::Interp;
//!
//! let mut interp = Interp::new();
//! let result = interp.eval(b"set a 10; set b 20; expr $a + $b").unwrap();
//! assert_eq!(result.int(), 30);
//! ```
//!
//! Values are byte strings and may carry embedded NUL bytes; scripts
//! are plain byte buffers with commands separated by line terminators
//! or `;`. See [`Interp::register`] for extending the command set from
//! the host.

pub mod cobs;

mod builtins;
mod env;
mod error;
mod expr;
mod interp;
mod list;
mod value;

pub use error::{ErrorKind, Flow, ScriptError, ScriptResult};
pub use interp::{CmdHandler, Interp, MAX_VAR_LENGTH};
pub use list::List;
pub use value::{Value, ValueKind};
