mod constrainable;
mod ty;
mod variable;

pub use constrainable::{Backing, Constrainable, Container, Indexer, Nominal, Placeholder, Shape, Slot, StructOptions};
pub use ty::Type;
pub use variable::{PlaceholderId, TypeVar, VarSupply};
