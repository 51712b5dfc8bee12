// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Identifies one subscriber attached to an [`EventFanout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Delivers every published event to all attached channels.
///
/// Unlike a single-consumer bus, the fan-out keeps one `flume` sender per
/// subscriber and clones each event into all of them, in publication order.
/// Subscribers whose receiver has been dropped are detached on the next
/// [`publish`](EventFanout::publish).
#[derive(Debug)]
pub struct EventFanout<T: Clone + Send + 'static> {
    subscribers: Vec<(SubscriptionId, flume::Sender<T>)>,
    next_id: u64,
}

impl<T: Clone + Send + 'static> EventFanout<T> {
    /// Creates a fan-out with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Creates an unbounded channel, attaches its sender and returns the receiver.
    pub fn subscribe(&mut self) -> (SubscriptionId, flume::Receiver<T>) {
        let (sender, receiver) = flume::unbounded();
        (self.attach(sender), receiver)
    }

    /// Attaches an existing sender, returning the id needed to detach it again.
    pub fn attach(&mut self, sender: flume::Sender<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, sender));
        id
    }

    /// Detaches a subscriber. Returns `false` if the id was not attached.
    pub fn detach(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Sends a clone of `event` to every subscriber.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn publish(&mut self, event: T) -> usize {
        log::trace!("Publishing an event to {} subscriber(s).", self.subscribers.len());

        self.subscribers.retain(|(id, sender)| {
            if sender.send(event.clone()).is_err() {
                log::debug!("Detaching subscriber {id:?}: receiver disconnected.");
                return false;
            }
            true
        });
        self.subscribers.len()
    }

    /// Returns the number of attached subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns `true` if nobody is attached.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T: Clone + Send + 'static> Default for EventFanout<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::TryRecvError;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Toggled { on: bool },
        Renamed(String),
    }

    #[test]
    fn every_subscriber_receives_every_event() {
        let mut fanout = EventFanout::<TestEvent>::new();
        let (_a, rx_a) = fanout.subscribe();
        let (_b, rx_b) = fanout.subscribe();

        let delivered = fanout.publish(TestEvent::Toggled { on: true });

        assert_eq!(delivered, 2);
        assert_eq!(rx_a.try_recv(), Ok(TestEvent::Toggled { on: true }));
        assert_eq!(rx_b.try_recv(), Ok(TestEvent::Toggled { on: true }));
    }

    #[test]
    fn events_arrive_in_publication_order() {
        let mut fanout = EventFanout::<TestEvent>::new();
        let (_id, rx) = fanout.subscribe();

        fanout.publish(TestEvent::Toggled { on: true });
        fanout.publish(TestEvent::Renamed("x".to_string()));
        fanout.publish(TestEvent::Toggled { on: false });

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                TestEvent::Toggled { on: true },
                TestEvent::Renamed("x".to_string()),
                TestEvent::Toggled { on: false },
            ]
        );
    }

    #[test]
    fn detached_subscriber_stops_receiving() {
        let mut fanout = EventFanout::<TestEvent>::new();
        let (id, rx) = fanout.subscribe();

        assert!(fanout.detach(id));
        assert!(!fanout.detach(id));
        fanout.publish(TestEvent::Toggled { on: true });

        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn dropped_receiver_is_pruned_on_publish() {
        let mut fanout = EventFanout::<TestEvent>::new();
        let (_kept, rx_kept) = fanout.subscribe();
        let (_gone, rx_gone) = fanout.subscribe();
        drop(rx_gone);

        let delivered = fanout.publish(TestEvent::Toggled { on: false });

        assert_eq!(delivered, 1);
        assert_eq!(fanout.len(), 1);
        assert!(rx_kept.try_recv().is_ok());
    }

    #[test]
    fn attach_external_sender() {
        let mut fanout = EventFanout::<TestEvent>::new();
        let (tx, rx) = flume::unbounded();
        fanout.attach(tx.clone());
        fanout.attach(tx);

        fanout.publish(TestEvent::Renamed("dup".to_string()));

        assert_eq!(rx.try_iter().count(), 2);
    }
}
