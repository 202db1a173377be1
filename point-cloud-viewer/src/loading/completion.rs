use futures::channel::oneshot;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Every resolver was dropped before one fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abandoned;

/// Write side of a completion. Clones share the same slot; the first
/// [`Resolver::resolve`] wins.
pub struct Resolver<T> {
    slot: Rc<RefCell<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> Resolver<T> {
    /// Returns `false` if the completion was already resolved or nobody is
    /// waiting for it anymore.
    pub fn resolve(&self, value: T) -> bool {
        let sender = self.slot.borrow_mut().take();
        match sender {
            Some(sender) => sender.send(value).is_ok(),
            None => false,
        }
    }
}

/// Read side of a completion.
pub struct Completion<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> Future for Completion<T> {
    type Output = Result<T, Abandoned>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| Abandoned))
    }
}

pub fn completion<T>() -> (Resolver<T>, Completion<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Resolver {
            slot: Rc::new(RefCell::new(Some(sender))),
        },
        Completion { receiver },
    )
}
