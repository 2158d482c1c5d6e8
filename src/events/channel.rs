//! Event channel built on crossbeam-channel.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sending half handed to the pipeline.
///
/// Cheap to clone. Sends never block and never fail: once the receiver is
/// gone, events are dropped.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half held by the UI layer
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event arrives or all senders are dropped
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Iterate until all senders are dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Factory for sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    /// Create an unbounded event channel
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender whose events go nowhere, for runs without a UI
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PhotoEvent, PipelineEvent};
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Photo(PhotoEvent::Started {
                index: 1,
                total: 3,
                filename: "IMG_0001.HEIC".to_string(),
            }));
        });
        handle.join().unwrap();

        match receiver.recv() {
            Some(Event::Photo(PhotoEvent::Started { index, total, .. })) => {
                assert_eq!((index, total), (1, 3));
            }
            _ => panic!("Wrong event type"),
        }
        // Sender was dropped with the thread
        assert!(receiver.recv().is_none());
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Pipeline(PipelineEvent::Started { total_photos: 0 }));
    }
}
