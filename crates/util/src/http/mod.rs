pub mod error_message;
pub mod parser;
pub mod path;

pub use error_message::*;
pub use parser::*;
pub use path::*;
