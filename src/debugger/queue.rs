use std::collections::VecDeque;

use crate::protocol::Command;

/// Ordered sequence of commands waiting to go to the backend. The backend
/// classifies its own messages purely by declared type, so callers must only
/// ever enqueue `info_locals`/`backtrace` through the fixed sequences below;
/// anything else desynchronizes the driver's interpretation of responses.
#[derive(Debug, Default)]
pub struct CommandQueue {
    queue: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Insert ahead of every normal-flow command, but behind urgent commands
    /// already waiting: two urgent inserts must keep their relative order.
    pub fn enqueue_urgent(&mut self, command: Command) {
        let at = self
            .queue
            .iter()
            .position(|c| !c.is_urgent())
            .unwrap_or(self.queue.len());
        self.queue.insert(at, command);
    }

    pub fn dequeue(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.queue.iter()
    }

    /// `step` followed by its fixed inspection followers.
    pub fn step_sequence(&mut self) {
        self.enqueue(Command::Step);
        self.inspect_sequence();
    }

    /// `continue` followed by its fixed inspection followers.
    pub fn continue_sequence(&mut self) {
        self.enqueue(Command::Continue);
        self.inspect_sequence();
    }

    /// The `info_locals` + `backtrace` pair, in that order. Also used on its
    /// own to capture final state after a revert.
    pub fn inspect_sequence(&mut self) {
        self.enqueue(Command::InfoLocals);
        self.enqueue(Command::Backtrace);
    }
}
