/*
 * Last-write-wins bookkeeping for requests that feed the same view. Each outgoing request
 * takes a ticket carrying a per-channel generation number; when its response arrives, it is
 * applied only if no newer ticket has been issued on that channel since.
 */
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestChannel {
    Search,
    Trending,
    Details,
    Recommendations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub channel: RequestChannel,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct RequestGenerations {
    latest: HashMap<RequestChannel, u64>,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes every earlier ticket on `channel`.
    pub fn issue(&mut self, channel: RequestChannel) -> RequestTicket {
        let generation = self.latest.entry(channel).or_insert(0);
        *generation += 1;
        RequestTicket {
            channel,
            generation: *generation,
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.get(&ticket.channel) == Some(&ticket.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_is_current() {
        let mut generations = RequestGenerations::new();
        let first = generations.issue(RequestChannel::Search);
        assert!(generations.is_current(&first));

        let second = generations.issue(RequestChannel::Search);

        assert!(!generations.is_current(&first));
        assert!(generations.is_current(&second));
        assert!(second.generation > first.generation);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut generations = RequestGenerations::new();
        let search = generations.issue(RequestChannel::Search);
        let trending = generations.issue(RequestChannel::Trending);
        generations.issue(RequestChannel::Trending);

        assert!(generations.is_current(&search));
        assert!(!generations.is_current(&trending));
    }

    #[test]
    fn test_foreign_ticket_is_not_current() {
        let generations = RequestGenerations::new();
        let ticket = RequestTicket {
            channel: RequestChannel::Details,
            generation: 1,
        };
        assert!(!generations.is_current(&ticket));
    }
}
