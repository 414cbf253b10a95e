pub mod context;
pub mod dictionary;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod instances;
pub mod interpreter;
pub mod prelude;
pub mod traits;
pub mod value;

pub use interpreter::Interpreter;
