//! Servers: an attendant pool plus one pending queue per category.

use crate::{
    attendant::{Attendant, Category},
    buffer::RequestToken,
    error::{SimError, SimResult},
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// FIFO of requests waiting at one server for one category.
/// `capacity == None` means unbounded.
#[derive(Debug, Clone)]
pub struct RequestQueue {
    capacity: Option<usize>,
    items: VecDeque<RequestToken>,
}

impl RequestQueue {
    pub fn new(capacity: Option<usize>) -> Self {
        Self { capacity, items: VecDeque::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.items.len() >= cap)
    }

    /// Returns the token back when the queue has no room.
    pub fn enqueue(&mut self, token: RequestToken) -> Result<(), RequestToken> {
        if self.is_full() {
            return Err(token);
        }
        self.items.push_back(token);
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<RequestToken> {
        self.items.pop_front()
    }
}

/// Exactly one queue per category.
#[derive(Debug, Clone)]
pub struct CategoryQueues {
    pub sales: RequestQueue,
    pub support: RequestQueue,
}

impl CategoryQueues {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            sales: RequestQueue::new(capacity),
            support: RequestQueue::new(capacity),
        }
    }

    pub fn get(&self, category: Category) -> &RequestQueue {
        match category {
            Category::Sales => &self.sales,
            Category::Support => &self.support,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut RequestQueue {
        match category {
            Category::Sales => &mut self.sales,
            Category::Support => &mut self.support,
        }
    }
}

/// Requests retired by one server in one timestep.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServedCounts {
    pub sales: u64,
    pub support: u64,
}

impl ServedCounts {
    pub fn total(&self) -> u64 {
        self.sales + self.support
    }

    fn add(&mut self, category: Category) {
        match category {
            Category::Sales => self.sales += 1,
            Category::Support => self.support += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Server {
    pub name: String,
    capacity: usize,
    attendants: Vec<Attendant>,
    pub queues: CategoryQueues,
}

impl Server {
    pub fn new(name: impl Into<String>, capacity: usize, queue_capacity: Option<usize>) -> Self {
        Self {
            name: name.into(),
            capacity,
            attendants: Vec::with_capacity(capacity),
            queues: CategoryQueues::new(queue_capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn attendants(&self) -> &[Attendant] {
        &self.attendants
    }

    /// Mutable access for the failure monitor.
    pub fn attendants_mut(&mut self) -> &mut [Attendant] {
        &mut self.attendants
    }

    pub fn add_attendant(&mut self, attendant: Attendant) -> SimResult<()> {
        if self.attendants.len() >= self.capacity {
            return Err(SimError::ServerFull {
                server: self.name.clone(),
                capacity: self.capacity,
            });
        }
        self.attendants.push(attendant);
        Ok(())
    }

    pub fn active_count(&self, category: Category) -> usize {
        self.attendants.iter().filter(|a| a.can_serve(category)).count()
    }

    pub fn pending(&self, category: Category) -> usize {
        self.queues.get(category).len()
    }

    /// Drain queues against available attendants.
    ///
    /// Categories run in `Category::ALL` order. For each queued request the
    /// first active, not-yet-busy attendant of the category takes it; each
    /// attendant serves at most one request per timestep. When nobody is
    /// left, the rest of the queue waits for the next timestep.
    pub fn process(&mut self) -> ServedCounts {
        let mut served = ServedCounts::default();
        let mut busy = vec![false; self.attendants.len()];

        for category in Category::ALL {
            let queue = self.queues.get_mut(category);
            while !queue.is_empty() {
                let free = self
                    .attendants
                    .iter()
                    .enumerate()
                    .find(|(i, a)| !busy[*i] && a.can_serve(category))
                    .map(|(i, _)| i);

                let Some(idx) = free else { break };
                if queue.dequeue().is_some() {
                    busy[idx] = true;
                    served.add(category);
                }
            }
        }

        served
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: u64, category: Category) -> RequestToken {
        RequestToken { id, category, created_at: 0 }
    }

    fn server_with(categories: &[Category]) -> Server {
        let mut s = Server::new("Server-1", categories.len(), None);
        for (i, c) in categories.iter().enumerate() {
            s.add_attendant(Attendant::new(format!("Server-1-{i}"), *c)).unwrap();
        }
        s
    }

    #[test]
    fn add_beyond_capacity_is_rejected() {
        let mut s = server_with(&[Category::Sales]);
        let err = s.add_attendant(Attendant::new("extra", Category::Support)).unwrap_err();
        assert!(matches!(err, SimError::ServerFull { capacity: 1, .. }));
        assert_eq!(s.attendants().len(), 1);
    }

    #[test]
    fn each_attendant_serves_once_per_step() {
        let mut s = server_with(&[Category::Sales, Category::Sales, Category::Support]);
        for id in 0..5 {
            s.queues.sales.enqueue(token(id, Category::Sales)).unwrap();
        }
        let served = s.process();
        assert_eq!(served, ServedCounts { sales: 2, support: 0 });
        assert_eq!(s.pending(Category::Sales), 3, "leftovers carry over");
    }

    #[test]
    fn no_matching_attendant_leaves_queue_untouched() {
        let mut s = server_with(&[Category::Sales]);
        s.queues.support.enqueue(token(0, Category::Support)).unwrap();
        assert_eq!(s.process().total(), 0);
        assert_eq!(s.pending(Category::Support), 1);
    }

    #[test]
    fn failed_attendants_do_not_serve() {
        let mut s = server_with(&[Category::Support]);
        s.attendants_mut()[0].fail();
        s.queues.support.enqueue(token(0, Category::Support)).unwrap();
        assert_eq!(s.process().total(), 0);
        assert_eq!(s.active_count(Category::Support), 0);
    }

    #[test]
    fn bounded_queue_hands_token_back_when_full() {
        let mut q = RequestQueue::new(Some(1));
        q.enqueue(token(0, Category::Sales)).unwrap();
        assert!(q.is_full());
        assert_eq!(q.enqueue(token(1, Category::Sales)), Err(token(1, Category::Sales)));
    }
}
