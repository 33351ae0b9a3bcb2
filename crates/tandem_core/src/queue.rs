//! # Command Queue
//!
//! Single-producer/single-consumer FIFO from the simulation thread to the
//! render thread, built on a bounded crossbeam channel.
//!
//! ```text
//! CommandSender ──[ seq 0 | seq 1 | ... | seq n | Shutdown ]──> CommandReceiver
//! ```
//!
//! - Enqueue never blocks unless the channel is full (backpressure).
//! - The consumer blocks in [`CommandReceiver::wait_batch`] when idle.
//! - Shutdown is a marker queued behind everything already sent, so every
//!   command submitted before shutdown is applied before the consumer stops.

use crossbeam_channel::{bounded, Receiver, RecvError, Sender, TryRecvError, TrySendError};

use crate::command::{RenderCommand, SequencedCommand};
use crate::error::{QueueError, QueueResult};

/// What actually travels through the channel.
#[derive(Debug)]
enum Message {
    Command(SequencedCommand),
    Shutdown,
}

/// Outcome of one [`CommandReceiver::wait_batch`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Batch {
    /// More batches will follow.
    Open,
    /// Shutdown marker reached (or the producer is gone). The batch holds
    /// every command that was queued ahead of it.
    ShutdownRequested,
}

/// Creates a connected sender/receiver pair.
///
/// # Arguments
///
/// * `capacity` - Maximum commands in flight before the producer blocks.
///
/// # Panics
///
/// Panics if `capacity` is zero. A rendezvous channel would turn every
/// enqueue into a hand-off with the render thread.
#[must_use]
pub fn command_queue(capacity: usize) -> (CommandSender, CommandReceiver) {
    assert!(capacity > 0, "command queue capacity must be greater than zero");
    let (sender, receiver) = bounded(capacity);
    (
        CommandSender {
            sender,
            next_sequence: 0,
            closed: false,
        },
        CommandReceiver { receiver },
    )
}

/// Producer half. Owned by the simulation thread.
#[derive(Debug)]
pub struct CommandSender {
    sender: Sender<Message>,
    next_sequence: u64,
    closed: bool,
}

impl CommandSender {
    /// Appends a command.
    ///
    /// Blocks only while the queue is full. Returns the sequence number
    /// assigned to the command.
    ///
    /// # Errors
    ///
    /// - [`QueueError::ShuttingDown`] after [`close`](Self::close): the
    ///   command is dropped.
    /// - [`QueueError::Disconnected`] if the receiver is gone.
    pub fn enqueue(&mut self, command: RenderCommand) -> QueueResult<u64> {
        if self.closed {
            tracing::debug!(kind = command.kind(), "dropping command enqueued after shutdown");
            return Err(QueueError::ShuttingDown);
        }

        let sequence = self.next_sequence;
        let message = Message::Command(SequencedCommand { sequence, command });

        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                // Flow control, not an error: wait for the render thread to drain
                tracing::debug!(sequence, "command queue full, producer waiting");
                self.sender.send(message).map_err(|_| QueueError::Disconnected)?;
            }
            Err(TrySendError::Disconnected(_)) => return Err(QueueError::Disconnected),
        }

        self.next_sequence += 1;
        Ok(sequence)
    }

    /// Queues the shutdown marker behind every command sent so far.
    ///
    /// Idempotent. Later enqueues fail with [`QueueError::ShuttingDown`].
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // A disconnected receiver is already shut down
        let _ = self.sender.send(Message::Shutdown);
    }

    /// Whether [`close`](Self::close) was called.
    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Sequence number the next command will get.
    #[inline]
    #[must_use]
    pub const fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Number of messages waiting in the channel.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.sender.len()
    }
}

/// Consumer half. Owned by the render thread.
#[derive(Debug)]
pub struct CommandReceiver {
    receiver: Receiver<Message>,
}

impl CommandReceiver {
    /// Blocks until work arrives, then drains everything queued.
    ///
    /// Commands are appended to `out` in submission order. `out` is not
    /// cleared first.
    ///
    /// Draining stops at the shutdown marker; nothing is queued behind it
    /// because the sender rejects commands after closing.
    pub fn wait_batch(&self, out: &mut Vec<SequencedCommand>) -> Batch {
        let first = match self.receiver.recv() {
            Ok(message) => message,
            Err(RecvError) => return Batch::ShutdownRequested,
        };
        if Self::push(first, out) == Batch::ShutdownRequested {
            return Batch::ShutdownRequested;
        }
        self.drain_ready(out)
    }

    /// Drains everything queued without blocking.
    pub fn try_batch(&self, out: &mut Vec<SequencedCommand>) -> Batch {
        self.drain_ready(out)
    }

    /// Number of messages waiting in the channel.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    fn drain_ready(&self, out: &mut Vec<SequencedCommand>) -> Batch {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    if Self::push(message, out) == Batch::ShutdownRequested {
                        return Batch::ShutdownRequested;
                    }
                }
                Err(TryRecvError::Empty) => return Batch::Open,
                Err(TryRecvError::Disconnected) => return Batch::ShutdownRequested,
            }
        }
    }

    fn push(message: Message, out: &mut Vec<SequencedCommand>) -> Batch {
        match message {
            Message::Command(command) => {
                out.push(command);
                Batch::Open
            }
            Message::Shutdown => Batch::ShutdownRequested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameToken;
    use crate::handle::RenderObjectId;

    fn destroy(index: u32) -> RenderCommand {
        RenderCommand::DestroyRenderObject { id: RenderObjectId::new(index, 0) }
    }

    #[test]
    fn test_fifo_sequence_numbers() {
        let (mut tx, rx) = command_queue(16);
        for i in 0..5 {
            assert_eq!(tx.enqueue(destroy(i)).unwrap(), u64::from(i));
        }

        let mut batch = Vec::new();
        assert_eq!(rx.wait_batch(&mut batch), Batch::Open);
        let sequences: Vec<u64> = batch.iter().map(|c| c.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);
        assert_eq!(batch[3].command, destroy(3));
    }

    #[test]
    fn test_shutdown_marker_after_commands() {
        let (mut tx, rx) = command_queue(16);
        tx.enqueue(destroy(0)).unwrap();
        tx.enqueue(RenderCommand::EndFrame { frame: FrameToken::new(0, 0) }).unwrap();
        tx.close();

        assert_eq!(tx.enqueue(destroy(1)), Err(QueueError::ShuttingDown));

        let mut batch = Vec::new();
        assert_eq!(rx.wait_batch(&mut batch), Batch::ShutdownRequested);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_dropped_sender_is_shutdown() {
        let (tx, rx) = command_queue(4);
        drop(tx);

        let mut batch = Vec::new();
        assert_eq!(rx.wait_batch(&mut batch), Batch::ShutdownRequested);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_disconnected_receiver() {
        let (mut tx, rx) = command_queue(4);
        drop(rx);
        assert_eq!(tx.enqueue(destroy(0)), Err(QueueError::Disconnected));
    }

    #[test]
    fn test_full_queue_blocks_until_drained() {
        let (mut tx, rx) = command_queue(2);
        tx.enqueue(destroy(0)).unwrap();
        tx.enqueue(destroy(1)).unwrap();

        let consumer = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            let mut all = Vec::new();
            while all.len() < 3 {
                rx.wait_batch(&mut all);
            }
            all
        });

        // Third enqueue waits for the consumer
        tx.enqueue(destroy(2)).unwrap();
        let all = consumer.join().unwrap();
        assert_eq!(all.iter().map(|c| c.sequence).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
