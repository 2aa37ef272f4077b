//! Ticket data model shared by intake, storage and the staleness sweeper.

mod types;

pub use types::{
    generate_ticket_id, ProblemType, StoredTicket, TicketStatus, UnknownProblemType,
    TICKET_ID_PREFIX,
};
