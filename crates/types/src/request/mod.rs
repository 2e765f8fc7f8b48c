mod error;
pub use error::RequestError;

mod input;
pub use input::GenerateInput;

mod model;
pub use model::{ModelKind, ParseModelError};

mod signed;
pub use signed::{build_signed_request, build_signed_request_with, HashableRequest, SignedRequest};
