use std::collections::{LinkedList, VecDeque};

use num_traits::ToPrimitive;

use super::{Mode, Transfer, TransferSink, TransferVersion, Transferable};
use crate::error::{Result, TransferError};

/// Layout version written at the head of every container.
pub const CONTAINER_VERSION: TransferVersion = 1;

/// ## Container transfer
///
/// Every variable-length collection travels as
///
/// ```text
/// +---------+-----------+------------------------+
/// | version |   count   | element 0 .. count - 1 |
/// |   u8    |  u16 (LE) |   each element's own   |
/// +---------+-----------+------------------------+
/// ```
///
/// Save and Checksum iterate the collection in order. Load requires an empty destination and
/// appends exactly `count` elements.
pub(crate) trait Sequence<T> {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn for_each_mut<F>(&mut self, f: F) -> Result<()>
    where
        F: FnMut(&mut T) -> Result<()>;
    fn push_back(&mut self, value: T);
}

macro_rules! sequence {
    ($($container:ident => $push:ident),* $(,)?) => {
        $(
            impl<T> Sequence<T> for $container<T> {
                fn len(&self) -> usize {
                    $container::len(self)
                }

                fn is_empty(&self) -> bool {
                    $container::is_empty(self)
                }

                fn for_each_mut<F>(&mut self, mut f: F) -> Result<()>
                where
                    F: FnMut(&mut T) -> Result<()>,
                {
                    self.iter_mut().try_for_each(|value| f(value))
                }

                fn push_back(&mut self, value: T) {
                    $container::$push(self, value)
                }
            }
        )*
    };
}

sequence! {
    Vec => push,
    LinkedList => push_back,
    VecDeque => push_back,
}

impl<S: TransferSink> Transfer<S> {
    pub fn transfer_vec<T>(&mut self, items: &mut Vec<T>) -> Result<()>
    where
        T: Transferable + Default,
    {
        self.transfer_sequence("transfer_vec", items)
    }

    pub fn transfer_linked_list<T>(&mut self, items: &mut LinkedList<T>) -> Result<()>
    where
        T: Transferable + Default,
    {
        self.transfer_sequence("transfer_linked_list", items)
    }

    pub fn transfer_deque<T>(&mut self, items: &mut VecDeque<T>) -> Result<()>
    where
        T: Transferable + Default,
    {
        self.transfer_sequence("transfer_deque", items)
    }

    fn transfer_sequence<C, T>(&mut self, operation: &'static str, items: &mut C) -> Result<()>
    where
        C: Sequence<T>,
        T: Transferable + Default,
    {
        let mode = self.dispatch(operation)?;

        let mut version = CONTAINER_VERSION;
        self.transfer_version(&mut version, CONTAINER_VERSION)?;

        let mut count = items
            .len()
            .to_u16()
            .ok_or(TransferError::ContainerTooLarge { len: items.len() })?;
        self.transfer_u16(&mut count)?;
        log::trace!("{}: {} elements", operation, count);

        match mode {
            Mode::Save | Mode::Checksum => items.for_each_mut(|item| item.transfer(self)),
            Mode::Load => {
                if !items.is_empty() {
                    return Err(TransferError::ContainerNotEmptyOnLoad);
                }
                for _ in 0..count {
                    let mut item = T::default();
                    item.transfer(self)?;
                    items.push_back(item);
                }
                Ok(())
            }
            Mode::Uninitialized => Err(TransferError::UnknownMode { operation }),
        }
    }
}

impl<T: Transferable + Default> Transferable for Vec<T> {
    fn transfer<S: TransferSink>(&mut self, xfer: &mut Transfer<S>) -> Result<()> {
        xfer.transfer_vec(self)
    }
}

impl<T: Transferable + Default> Transferable for LinkedList<T> {
    fn transfer<S: TransferSink>(&mut self, xfer: &mut Transfer<S>) -> Result<()> {
        xfer.transfer_linked_list(self)
    }
}

impl<T: Transferable + Default> Transferable for VecDeque<T> {
    fn transfer<S: TransferSink>(&mut self, xfer: &mut Transfer<S>) -> Result<()> {
        xfer.transfer_deque(self)
    }
}
