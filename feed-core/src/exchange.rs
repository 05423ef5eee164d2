//! Single-flight guard for the OAuth authorization-code exchange.
//!
//! Tracks which code is currently being exchanged. Re-submitting the same
//! code while it is in flight is rejected; a different code supersedes the
//! pending exchange. Each accepted exchange gets a [`Ticket`] so that a
//! superseded exchange cannot clear the state of its replacement.

use thiserror::Error;

/// Reasons an exchange is refused before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeRejected {
    /// The same code is already being exchanged.
    #[error("authorization code is already being exchanged")]
    DuplicateRequest,

    /// The code was empty or whitespace.
    #[error("authorization code is empty")]
    EmptyCode,
}

/// Identifies one accepted exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Result of [`ExchangeState::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Begin {
    /// Ticket for the new exchange.
    pub ticket: Ticket,
    /// Ticket of the exchange this one replaced, which must be cancelled.
    pub superseded: Option<Ticket>,
}

#[derive(Debug, Clone)]
struct InFlight {
    code: String,
    ticket: Ticket,
}

/// In-flight exchange tracking - NO I/O.
#[derive(Debug, Clone, Default)]
pub struct ExchangeState {
    in_flight: Option<InFlight>,
    next_ticket: u64,
}

impl ExchangeState {
    /// Create an idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to start exchanging `code`.
    pub fn begin(&mut self, code: &str) -> Result<Begin, ExchangeRejected> {
        if code.trim().is_empty() {
            return Err(ExchangeRejected::EmptyCode);
        }
        if self.in_flight_code() == Some(code) {
            return Err(ExchangeRejected::DuplicateRequest);
        }

        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = Ticket(self.next_ticket);
        let superseded = self
            .in_flight
            .replace(InFlight {
                code: code.to_string(),
                ticket,
            })
            .map(|previous| previous.ticket);

        Ok(Begin { ticket, superseded })
    }

    /// Mark the exchange identified by `ticket` as finished.
    ///
    /// Returns `false` (and leaves state alone) if the ticket was superseded.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if self.is_current(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Whether `ticket` is the exchange currently in flight.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.ticket == ticket)
    }

    /// Code currently being exchanged.
    pub fn in_flight_code(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|in_flight| in_flight.code.as_str())
    }

    /// Check if an exchange is in flight.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}
