pub mod dispatcher;
pub mod route;

pub use dispatcher::{Dispatcher, Outcome, StageError};
pub use route::{classify, Route};
