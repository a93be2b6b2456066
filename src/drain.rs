use std::fmt::Write as _;
use std::io::Write;

use chrono::Local;

use crate::queue::ThreadQueueManager;

/// Runs one drain pass over every queue registered with `manager`: for each
/// queue, dequeue until empty, timestamp each message at drain time, format
/// it through its formatter handle, and append a line to `sink`. The sink is
/// flushed after every line, trading throughput for crash durability.
pub(crate) fn drain_once(manager: &ThreadQueueManager, sink: &mut dyn Write) {
    let mut line = String::new();
    manager.for_each(|queue| {
        while let Some(message) = queue.dequeue() {
            line.clear();
            let _ = write!(
                line,
                "[{}] [{}] ",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                message.level.name()
            );
            message.formatter.format(&message.payload, &mut line);
            line.push('\n');

            if let Err(err) = sink.write_all(line.as_bytes()) {
                log::error!("fluxlog: failed to write log line: {err}");
                continue;
            }
            if let Err(err) = sink.flush() {
                log::error!("fluxlog: failed to flush sink: {err}");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{intern, ArgKind, LogArg};
    use crate::level::LogLevel;
    use crate::queue::ThreadQueue;
    use std::sync::Arc;

    #[test]
    fn drain_once_renders_and_flushes_every_pending_message() {
        let manager = ThreadQueueManager::new();
        let queue = Arc::new(ThreadQueue::new(8, 64));

        let handle = intern("drain::tests", "x={}", &[ArgKind::I64]);
        let args = [LogArg::I64(7)];
        queue.enqueue(LogLevel::Info, handle, |buf| handle.encode(&args, buf));

        manager.register(queue);

        let mut sink = Vec::new();
        drain_once(&manager, &mut sink);

        let text = String::from_utf8(sink).unwrap();
        assert!(text.ends_with("drain::tests:x=7\n"), "got: {text:?}");
        assert!(text.starts_with('['));
    }

    #[test]
    fn empty_manager_writes_nothing() {
        let manager = ThreadQueueManager::new();
        let mut sink = Vec::new();
        drain_once(&manager, &mut sink);
        assert!(sink.is_empty());
    }
}
