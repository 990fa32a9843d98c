pub mod mime;
pub mod record;
pub mod simplify;

pub use mime::{ComposedMessage, compose, compose_reply};
pub use record::MessageRecord;
pub use simplify::simplify;
