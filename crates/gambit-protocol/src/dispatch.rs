//! The dispatch registry: routes decoded messages to interested handlers.
//!
//! After a frame is decoded, *something* has to decide who reacts to it.
//! The [`Dispatcher`] keeps, for every `(OperationCode, Side)` pair, an
//! ordered list of handlers and runs them all when a message with that
//! code is published on that side (the "observer pattern").
//!
//! # Why a context parameter?
//!
//! Handlers don't capture the state they mutate. Instead the owner of the
//! dispatcher passes a `&mut Ctx` into [`Dispatcher::publish`] and every
//! handler receives it. That keeps handlers `'static` closures with no
//! `Rc<RefCell<..>>` plumbing, and it means each match owns its own
//! dispatcher and its own context; nothing global outlives a match.

use std::collections::HashMap;
use std::fmt;

use gambit_transport::ConnectionId;

use crate::{NetMessage, OperationCode};

/// Which end of the connection a handler runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Server,
    Client,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Server => f.write_str("server"),
            Side::Client => f.write_str("client"),
        }
    }
}

/// Token returned by [`Dispatcher::subscribe`]; hand it back to
/// [`Dispatcher::unsubscribe`] to remove exactly that handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A registered reaction to a message.
///
/// Arguments: the owner's context, the message, and the connection it
/// came from (servers know it; clients pass `None`).
pub type Handler<Ctx> =
    Box<dyn FnMut(&mut Ctx, &NetMessage, Option<ConnectionId>) + Send>;

struct Subscription<Ctx> {
    id: SubscriptionId,
    handler: Handler<Ctx>,
}

/// Maps `(code, side)` to the handlers that care about it.
pub struct Dispatcher<Ctx> {
    subscriptions: HashMap<(OperationCode, Side), Vec<Subscription<Ctx>>>,
    next_id: u64,
}

impl<Ctx> Dispatcher<Ctx> {
    /// Creates a registry with no handlers.
    pub fn new() -> Self {
        Self {
            subscriptions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers `handler` for messages with `code` published on `side`.
    ///
    /// Handlers for the same key run in the order they were subscribed.
    pub fn subscribe<F>(
        &mut self,
        code: OperationCode,
        side: Side,
        handler: F,
    ) -> SubscriptionId
    where
        F: FnMut(&mut Ctx, &NetMessage, Option<ConnectionId>) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        self.subscriptions
            .entry((code, side))
            .or_default()
            .push(Subscription {
                id,
                handler: Box::new(handler),
            });

        tracing::trace!(%code, %side, ?id, "handler subscribed");
        id
    }

    /// Removes the handler registered under `id`.
    ///
    /// Returns `false` if it was already removed (or never existed).
    /// Other handlers on the same key are untouched.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for subs in self.subscriptions.values_mut() {
            if let Some(pos) = subs.iter().position(|s| s.id == id) {
                // `remove` (not `swap_remove`) keeps registration order.
                subs.remove(pos);
                return true;
            }
        }
        false
    }

    /// Runs every handler registered for `(message.code(), side)`.
    ///
    /// Returns how many handlers ran, so the caller can log messages
    /// nobody listens to.
    pub fn publish(
        &mut self,
        side: Side,
        ctx: &mut Ctx,
        message: &NetMessage,
        origin: Option<ConnectionId>,
    ) -> usize {
        let code = message.code();
        let Some(subs) = self.subscriptions.get_mut(&(code, side)) else {
            return 0;
        };

        for sub in subs.iter_mut() {
            (sub.handler)(ctx, message, origin);
        }
        subs.len()
    }

    /// Number of handlers registered for a key.
    pub fn handler_count(&self, code: OperationCode, side: Side) -> usize {
        self.subscriptions
            .get(&(code, side))
            .map_or(0, Vec::len)
    }

    /// Removes every handler.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl<Ctx> Default for Dispatcher<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}
