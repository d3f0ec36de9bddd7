//! Mock journal source for testing: serves pre-loaded lines.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::{LogError, LogResult};
use crate::source::JournalSource;

/// A journal source that replays a fixed list of lines.
pub struct MockJournalSource {
    lines: VecDeque<String>,
    /// Fail with an I/O error once this many lines have been served.
    fail_after: Option<usize>,
    served: usize,
    finished: bool,
    aborted: bool,
}

impl MockJournalSource {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into(),
            fail_after: None,
            served: 0,
            finished: false,
            aborted: false,
        }
    }

    /// Serve `lines`, then fail with a read error instead of ending.
    pub fn failing_after(lines: Vec<String>) -> Self {
        let count = lines.len();
        Self {
            fail_after: Some(count),
            ..Self::new(lines)
        }
    }

    /// A small sample of realistic journal output, including one bad line.
    pub fn with_sample() -> Self {
        Self::new(vec![
            r#"{"__CURSOR":"s=1;i=1","__REALTIME_TIMESTAMP":"1704164645000000","_BOOT_ID":"b1","_HOSTNAME":"web01","PRIORITY":"6","SYSLOG_IDENTIFIER":"nginx","_COMM":"nginx","_PID":"812","MESSAGE":"2024-01-02 03:04:05 [error] disk full"}"#.into(),
            r#"{"__CURSOR":"s=1;i=2","__REALTIME_TIMESTAMP":"1704164645100000","_BOOT_ID":"b1","_HOSTNAME":"web01","PRIORITY":"5","_COMM":"php-fpm","_PID":"900","MESSAGE":"pool www: server reached pm.max_children"}"#.into(),
            "this is not json".into(),
            r#"{"__CURSOR":"s=1;i=3","__REALTIME_TIMESTAMP":"1704164645200000","_BOOT_ID":"b1","_HOSTNAME":"web01","PRIORITY":"3","SYSLOG_IDENTIFIER":"api","MESSAGE":"unhandled exception\n  at Orders.Place()","EXCEPTION_TYPE":"NullReference","REQUESTID":"req-42"}"#.into(),
        ])
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl JournalSource for MockJournalSource {
    async fn next_line(&mut self) -> LogResult<Option<String>> {
        if self.fail_after == Some(self.served) {
            return Err(LogError::Io("mock read failure".into()));
        }
        let line = self.lines.pop_front();
        if line.is_some() {
            self.served += 1;
        }
        Ok(line)
    }

    async fn finish(&mut self) -> LogResult<()> {
        self.finished = true;
        Ok(())
    }

    async fn abort(&mut self) {
        self.aborted = true;
    }
}
