//! Per-interaction request sequencing.
//!
//! Each interaction owns one slot. `begin` hands out a ticket and marks the
//! slot busy; `finish` only accepts the ticket that is currently in flight.
//! Invalidating the slot (reset, replay toggle) makes any outstanding reply
//! stale so it is discarded instead of overwriting newer state.

/// Identifies one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

#[derive(Debug, Clone, Default)]
pub struct RequestSlot {
    issued: u64,
    in_flight: Option<u64>,
}

impl RequestSlot {
    /// `None` when a request is already in flight.
    pub fn begin(&mut self) -> Option<RequestTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        self.issued += 1;
        self.in_flight = Some(self.issued);
        Some(RequestTicket(self.issued))
    }

    /// Releases the slot. Returns false for a stale ticket.
    pub fn finish(&mut self, ticket: RequestTicket) -> bool {
        if self.in_flight == Some(ticket.0) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Whether `ticket` is the request in flight, without releasing it.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.in_flight == Some(ticket.0)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn invalidate(&mut self) {
        self.in_flight = None;
    }
}
