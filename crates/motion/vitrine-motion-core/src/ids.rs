//! Handles for the components an [`Engine`](crate::Engine) owns. Each kind
//! is numbered independently from zero, in registration order.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// One intersection observer the host creates.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct WatchId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CarouselId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RotatorId(pub u32);

macro_rules! numbered {
    ($($id:ident),*) => {$(
        impl From<u32> for $id {
            fn from(n: u32) -> Self {
                Self(n)
            }
        }
    )*};
}

numbered!(WatchId, CarouselId, RotatorId);

/// Hands out `Id(0)`, `Id(1)`, ... for one handle type.
#[derive(Debug)]
pub(crate) struct Sequence<Id> {
    next: u32,
    _id: PhantomData<Id>,
}

impl<Id> Default for Sequence<Id> {
    fn default() -> Self {
        Self {
            next: 0,
            _id: PhantomData,
        }
    }
}

impl<Id: From<u32>> Sequence<Id> {
    pub(crate) fn next_id(&mut self) -> Id {
        let id = Id::from(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_counts_on_its_own() {
        let mut watches = Sequence::<WatchId>::default();
        let mut carousels = Sequence::<CarouselId>::default();
        assert_eq!(watches.next_id(), WatchId(0));
        assert_eq!(watches.next_id(), WatchId(1));
        assert_eq!(carousels.next_id(), CarouselId(0));
    }
}
