//! Client for the account identity service, used to put names to the admins
//! who issued bans.

mod response;
pub use response::*;

mod http_resolver;
pub use http_resolver::*;
