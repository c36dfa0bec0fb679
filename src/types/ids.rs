use std::fmt;

use serde_derive::{Deserialize, Serialize};

/// Identifies a simulation object. `ObjectId::INVALID` refers to nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Identifies a drawable attached to an object. `DrawableId::INVALID` refers to nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DrawableId(pub u32);

macro_rules! id_type {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                pub const INVALID: $ty = $ty(0);

                pub fn is_valid(self) -> bool {
                    self != $ty::INVALID
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({})", stringify!($ty), self.0)
                }
            }

            impl crate::transfer::Transferable for $ty {
                fn transfer<S: crate::transfer::TransferSink>(
                    &mut self,
                    xfer: &mut crate::transfer::Transfer<S>,
                ) -> crate::error::Result<()> {
                    xfer.transfer_u32(&mut self.0)
                }
            }
        )*
    };
}

id_type!(ObjectId, DrawableId);
