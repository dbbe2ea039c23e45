//! 工单内存存储实现

use super::InMemoryStore;
use crate::error::StorageError;
use crate::models::{TicketCounts, TicketFilter, TicketUpdate};
use crate::traits::TicketStore;
use domain::{Ticket, TicketStatus};
use std::cmp::Reverse;
use uuid::Uuid;

#[async_trait::async_trait]
impl TicketStore for InMemoryStore {
    async fn list_tickets(&self, filter: TicketFilter) -> Result<Vec<Ticket>, StorageError> {
        let state = self.read()?;
        let mut items: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|ticket| filter.status.is_none_or(|status| ticket.status == status))
            .filter(|ticket| filter.entry_type.is_none_or(|entry| ticket.entry_type == entry))
            .filter(|ticket| filter.gop_id.is_none_or(|gop_id| ticket.gop_id == gop_id))
            .filter(|ticket| filter.date_from.is_none_or(|from| ticket.date >= from))
            .filter(|ticket| filter.date_to.is_none_or(|to| ticket.date <= to))
            .filter(|ticket| {
                filter.unit_type.is_none_or(|wanted| {
                    state
                        .units
                        .get(&ticket.unit_id)
                        .is_some_and(|unit| unit.unit_type() == wanted)
                })
            })
            .cloned()
            .collect();
        items.sort_by_key(|ticket| (Reverse(ticket.date), Reverse(ticket.number.clone())));
        Ok(items)
    }

    async fn count_tickets_by_status(&self) -> Result<TicketCounts, StorageError> {
        let state = self.read()?;
        let mut counts = TicketCounts::default();
        for ticket in state.tickets.values() {
            match ticket.status {
                TicketStatus::Pending => counts.pending += 1,
                TicketStatus::Completed => counts.completed += 1,
            }
        }
        Ok(counts)
    }

    async fn find_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StorageError> {
        Ok(self.read()?.tickets.get(&ticket_id).cloned())
    }

    async fn find_ticket_by_number(&self, number: &str) -> Result<Option<Ticket>, StorageError> {
        let state = self.read()?;
        Ok(state
            .tickets
            .values()
            .find(|ticket| ticket.number == number)
            .cloned())
    }

    async fn list_ticket_numbers(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let state = self.read()?;
        Ok(state
            .tickets
            .values()
            .filter(|ticket| ticket.number.starts_with(prefix))
            .map(|ticket| ticket.number.clone())
            .collect())
    }

    async fn create_ticket(&self, ticket: Ticket) -> Result<Ticket, StorageError> {
        let mut state = self.write()?;
        if state
            .tickets
            .values()
            .any(|item| item.number == ticket.number)
        {
            return Err(StorageError::Conflict(format!("ticket number {}", ticket.number)));
        }
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        ticket_id: Uuid,
        update: TicketUpdate,
    ) -> Result<Option<Ticket>, StorageError> {
        let mut state = self.write()?;
        let ticket = match state.tickets.get_mut(&ticket_id) {
            Some(ticket) => ticket,
            None => return Ok(None),
        };
        update.apply_to(ticket);
        Ok(Some(ticket.clone()))
    }

    async fn save_ticket_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<bool, StorageError> {
        let mut state = self.write()?;
        let Some(ticket) = state.tickets.get_mut(&ticket_id) else {
            return Ok(false);
        };
        ticket.status = status;
        Ok(true)
    }
}
