//! Request, response and the JSON envelope handlers answer with.

mod envelope;
mod request;
mod response;

pub use envelope::ApiEnvelope;
pub use request::{Method, Part, Request};
pub use response::Response;
