//! Keeps the quote log in identifier order.
//!
//! Quotes are exported concurrently, and a small order can finish its export long before a large one that arrived
//! earlier. Each quote therefore takes a [`LogTicket`] when its identifier is issued, and waits for every quote with a
//! lower identifier to finish (or give up) before it appends to the log.
use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use log::*;
use tokio::sync::Notify;

use crate::{quote_types::QuoteId, record_builder::QuoteIdGenerator};

#[derive(Debug, Default)]
struct InFlight {
    pending: Mutex<BTreeSet<i64>>,
    turn: Notify,
}

impl InFlight {
    fn pending(&self) -> MutexGuard<'_, BTreeSet<i64>> {
        // Every critical section leaves the set consistent, so a poisoned lock is still usable
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Issues quote identifiers and hands out log turns in identifier order.
#[derive(Debug, Default)]
pub struct LogSequencer {
    ids: QuoteIdGenerator,
    in_flight: Arc<InFlight>,
}

impl LogSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next identifier, and a ticket that holds its place in the log until it is dropped.
    pub fn issue(&self, now: DateTime<Utc>) -> LogTicket {
        let mut pending = self.in_flight.pending();
        // Issued under the lock, so that a higher id can never be registered before a lower one
        let seq = self.ids.next_millis(now);
        pending.insert(seq);
        trace!("🎫️ Issued ticket {seq}. {} quote(s) in flight", pending.len());
        LogTicket { id: QuoteId::from_millis(seq), seq, in_flight: Arc::clone(&self.in_flight) }
    }

    /// The number of issued tickets that have not been dropped yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.pending().len()
    }
}

/// A place in the log queue. Dropping the ticket gives up the place and lets the next quote through.
#[derive(Debug)]
pub struct LogTicket {
    id: QuoteId,
    seq: i64,
    in_flight: Arc<InFlight>,
}

impl LogTicket {
    pub fn id(&self) -> &QuoteId {
        &self.id
    }

    /// Wait until every ticket issued before this one has been dropped.
    pub async fn wait_turn(&self) {
        loop {
            // Registered before the check, so a drop between the check and the await still wakes us
            let notified = self.in_flight.turn.notified();
            if self.in_flight.pending().first() == Some(&self.seq) {
                return;
            }
            trace!("🎫️ Quote {} is waiting for earlier quotes to be logged", self.id);
            notified.await;
        }
    }
}

impl Drop for LogTicket {
    fn drop(&mut self) {
        self.in_flight.pending().remove(&self.seq);
        self.in_flight.turn.notify_waiters();
    }
}
