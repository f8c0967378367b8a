pub mod cli;
pub mod declension;
pub mod engine;
pub mod error;
pub mod repl;
pub mod roman;
pub mod runtime;
pub mod token;
pub mod value;

pub use cli::Cli;
pub use declension::{Case, DeclensionEntry, DeclensionTable};
pub use engine::{Engine, EngineError};
pub use error::{Lang, RuntimeError};
pub use repl::Repl;
pub use runtime::Runtime;
pub use token::{Token, TokenizerContext};
pub use value::Value;

mod tests;
