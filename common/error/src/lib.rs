//! Shared error primitives for the cmdtree workspace.
//!
//! Every crate defines its own snafu error enum and implements [`ErrorExt`]
//! on it, mapping each variant to a [`StatusCode`].

mod ext;
mod status_code;

pub use ext::BoxedError;
pub use ext::ErrorExt;
pub use ext::PlainError;
pub use ext::boxed;
pub use snafu::Location;
pub use status_code::StatusCategory;
pub use status_code::StatusCode;
pub use status_code::StatusMeta;
