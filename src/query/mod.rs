//! Named-query cache with declarative invalidation.
//! A small fixed set of parameterized result sets for one screen's lifetime,
//! kept mutually consistent after post mutations. Not a general-purpose cache.

mod coordinator;
mod entry;
mod invalidation;
mod key;

pub use coordinator::{Loader, QueryCoordinator};
pub use entry::{QueryData, QueryEntry, QueryStatus};
pub use invalidation::{invalidated_names, MutationKind};
pub use key::{names, Param, QueryKey};
