//! Fixed-field composites moved through a transfer.
//!
//! A composite always travels as its fields in declaration order. That order is part of the
//! saved and checksummed layout: reordering fields requires bumping the owning entity's version.

/// Implements `Transferable` for a struct by transferring the listed fields in order.
macro_rules! transfer_fields {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::transfer::Transferable for $ty {
            fn transfer<S: $crate::transfer::TransferSink>(
                &mut self,
                xfer: &mut $crate::transfer::Transfer<S>,
            ) -> $crate::error::Result<()> {
                $( xfer.transfer_value(&mut self.$field)?; )+
                Ok(())
            }
        }
    };
}

mod color;
mod coord;
mod ids;

pub use self::color::*;
pub use self::coord::*;
pub use self::ids::*;
