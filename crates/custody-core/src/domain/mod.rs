pub mod access;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod query;
pub mod transfer;

pub use access::*;
pub use entities::*;
pub use errors::*;
pub use identity::*;
pub use query::*;
pub use transfer::*;
