use chrono::{DateTime, Utc};
use log::{Level, Log, Metadata, Record};
use std::{
    cell::Cell,
    io::{BufWriter, Write},
    sync::Mutex,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct LogMessage<'a> {
    timestamp:   DateTime<Utc>,
    level:       String,
    level_num:   i32,
    target:      &'a str,
    module_path: Option<&'a str>,
    file:        Option<&'a str>,
    line:        Option<u32>,
    message:     String,
}

impl<'a> LogMessage<'a> {
    fn build(record: &Record<'a>) -> Self {
        LogMessage {
            timestamp:   Utc::now(),
            level:       record.level().to_string(),
            level_num:   record.level() as i32,
            target:      record.target(),
            module_path: record.module_path(),
            file:        record.file(),
            line:        record.line(),
            message:     format!("{:?}", record.args()),
        }
    }
}

/// A json logger which writes each log message as json encoded object on a new line.
pub struct Logger<W: Write> {
    level:  Level,
    writer: Mutex<Cell<BufWriter<W>>>,
}

impl<W: Write> Logger<W> {
    /// Create a new json logger with the given level and writer.
    ///
    /// ```
    /// use log::Level;
    /// use mqs_common::logger::json::Logger;
    /// use std::io::stdout;
    ///
    /// let logger = Logger::new(Level::Info, stdout());
    /// assert_eq!(logger.level(), Level::Info);
    /// ```
    pub fn new(level: Level, writer: W) -> Self {
        Self {
            level,
            writer: Mutex::new(Cell::new(BufWriter::new(writer))),
        }
    }

    /// Get the current level of the logger. This is not the level configured by the logging library,
    /// but an additional filter for messages which are reaching this logger!
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Change the current level of this logger. This is not the level configured by the logging library,
    /// but an additional filter for messages which are reaching this logger!
    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }
}

impl<W: Write + Send> Log for Logger<W> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let msg = LogMessage::build(record);
            if let Ok(mut line) = serde_json::to_vec(&msg) {
                line.push(b'\n');
                if let Ok(mut writer) = self.writer.lock() {
                    // we ignore the result of the call as we can't handle an error here
                    drop(writer.get_mut().write_all(line.as_slice()));
                }
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            // we ignore the result of the call as we can't handle an error here
            drop(writer.get_mut().flush());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct TestWriter {
        written: Vec<u8>,
        flushed: bool,
    }

    impl TestWriter {
        const fn new() -> Self {
            TestWriter {
                written: Vec::new(),
                flushed: false,
            }
        }

        fn assert_expectations(&self, expected_messages: &[(Level, &str)]) {
            assert!(self.flushed);
            let messages = String::from_utf8(self.written.clone()).unwrap();
            let lines: Vec<&str> = messages.split('\n').collect();
            assert_eq!(lines.len(), expected_messages.len() + 1); // final line ends with '\n', so final element is ""
            assert_eq!(lines[lines.len() - 1], ""); // final line should be empty
            for (line, (level, message)) in lines.iter().zip(expected_messages.iter()) {
                let parsed: LogMessage<'_> = serde_json::from_str(line).unwrap();
                assert_eq!(parsed.level, level.to_string());
                assert_eq!(parsed.message, *message);
            }
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.flushed = false;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    fn log(logger: &Logger<TestWriter>, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target("mqs_common::logger::json::test")
                .build(),
        );
    }

    #[test]
    fn filters_below_configured_level() {
        let logger = Logger::new(Level::Info, TestWriter::new());

        log(&logger, Level::Trace, "Should not appear");
        log(&logger, Level::Debug, "Should also not appear");
        log(&logger, Level::Info, "This should get logged");
        log(&logger, Level::Warn, "And of course this");
        log(&logger, Level::Error, "This has to get logged");
        logger.flush();

        logger
            .writer
            .lock()
            .unwrap()
            .get_mut()
            .get_ref()
            .assert_expectations(&[
                (Level::Info, "This should get logged"),
                (Level::Warn, "And of course this"),
                (Level::Error, "This has to get logged"),
            ]);
    }
}
