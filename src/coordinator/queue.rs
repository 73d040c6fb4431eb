use std::collections::VecDeque;

use crate::shared::Request;

/// FIFO of hall calls no car could take when they arrived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQueue {
    requests: VecDeque<Request>,
}

impl RequestQueue {
    pub fn new() -> RequestQueue {
        RequestQueue::default()
    }

    pub fn enqueue(&mut self, request: Request) {
        self.requests.push_back(request);
    }

    /// Puts `requests` ahead of everything already waiting, keeping their order.
    pub fn requeue_front(&mut self, requests: Vec<Request>) {
        for request in requests.into_iter().rev() {
            self.requests.push_front(request);
        }
    }

    pub fn head(&self) -> Option<&Request> {
        self.requests.front()
    }

    pub fn pop_head(&mut self) -> Option<Request> {
        self.requests.pop_front()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Drops calls for floors that no longer exist and returns them.
    pub fn retain_floors_below(&mut self, floor_count: u8) -> Vec<Request> {
        let (kept, dropped): (VecDeque<Request>, VecDeque<Request>) = self
            .requests
            .drain(..)
            .partition(|request| request.floor < floor_count);
        self.requests = kept;
        dropped.into()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.requests.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Direction::{Down, Up};

    #[test]
    fn test_requeue_front_keeps_order_ahead_of_waiting_requests() {
        let mut queue = RequestQueue::new();
        queue.enqueue(Request::new(4, Down));

        queue.requeue_front(vec![Request::new(1, Up), Request::new(2, Up)]);

        let order: Vec<u8> = queue.iter().map(|r| r.floor).collect();
        assert_eq!(order, vec![1, 2, 4]);
    }

    #[test]
    fn test_retain_floors_below() {
        let mut queue = RequestQueue::new();
        for floor in [6, 1, 7, 3] {
            queue.enqueue(Request::new(floor, Down));
        }

        let dropped = queue.retain_floors_below(5);

        assert_eq!(dropped, vec![Request::new(6, Down), Request::new(7, Down)]);
        assert_eq!(queue.pop_head(), Some(Request::new(1, Down)));
        assert_eq!(queue.pop_head(), Some(Request::new(3, Down)));
        assert!(queue.is_empty());
    }
}
