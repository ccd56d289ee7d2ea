// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event sources: where the records of a dataset come from.

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;

use crate::errors::SourceError;
use crate::model::{Dataset, EventRecord};

/// Records of one dataset, in source order.
pub type EventStream<'a> = Box<dyn Iterator<Item = Result<EventRecord, SourceError>> + 'a>;

/// Produces the events of a dataset. Shared read-only by every worker.
pub trait EventSource: Send + Sync {
    fn open(&self, dataset: &Dataset) -> Result<EventStream<'_>, SourceError>;
}

/// Events held in memory, keyed by dataset name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    events: HashMap<String, Vec<EventRecord>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dataset: impl Into<String>, events: Vec<EventRecord>) {
        self.events.insert(dataset.into(), events);
    }

    pub fn with_events(mut self, dataset: impl Into<String>, events: Vec<EventRecord>) -> Self {
        self.insert(dataset, events);
        self
    }
}

impl EventSource for MemorySource {
    fn open(&self, dataset: &Dataset) -> Result<EventStream<'_>, SourceError> {
        let events = self
            .events
            .get(dataset.name())
            .ok_or_else(|| SourceError::UnknownDataset {
                dataset: dataset.name().to_string(),
            })?;
        Ok(Box::new(events.iter().cloned().map(Ok)))
    }
}

/// Reads the dataset files in order, one JSON-encoded [`EventRecord`] per line.
/// Blank lines are skipped.
#[derive(Debug, Clone, Default)]
pub struct JsonLinesSource;

impl JsonLinesSource {
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for JsonLinesSource {
    fn open(&self, dataset: &Dataset) -> Result<EventStream<'_>, SourceError> {
        for path in dataset.files() {
            if !path.is_file() {
                return Err(SourceError::Io {
                    path: path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                });
            }
        }

        Ok(Box::new(JsonLinesStream {
            pending: dataset.files().iter().cloned().collect(),
            current: None,
        }))
    }
}

struct OpenFile {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line: usize,
}

struct JsonLinesStream {
    pending: VecDeque<PathBuf>,
    current: Option<OpenFile>,
}

impl Iterator for JsonLinesStream {
    type Item = Result<EventRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let path = self.pending.pop_front()?;
                match File::open(&path) {
                    Ok(file) => {
                        self.current = Some(OpenFile {
                            path,
                            lines: BufReader::new(file).lines(),
                            line: 0,
                        })
                    }
                    Err(source) => return Some(Err(SourceError::Io { path, source })),
                }
            }

            let open = self.current.as_mut()?;
            match open.lines.next() {
                None => self.current = None,
                Some(Err(source)) => {
                    let path = open.path.clone();
                    self.current = None;
                    return Some(Err(SourceError::Io { path, source }));
                }
                Some(Ok(text)) => {
                    open.line += 1;
                    if text.trim().is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(&text).map_err(|source| {
                        SourceError::Malformed {
                            path: open.path.clone(),
                            line: open.line,
                            source,
                        }
                    }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_source_unknown_dataset() {
        let source = MemorySource::new();
        let result = source.open(&Dataset::data("missing"));
        assert!(matches!(result, Err(SourceError::UnknownDataset { .. })));
    }

    #[test]
    fn test_json_lines_reads_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.jsonl");
        let second = dir.path().join("b.jsonl");

        let mut file = File::create(&first).unwrap();
        writeln!(file, r#"{{"id":{{"run":1,"lumi":1,"event":1}}}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"id":{{"run":1,"lumi":1,"event":2}}}}"#).unwrap();
        let mut file = File::create(&second).unwrap();
        writeln!(file, r#"{{"id":{{"run":2,"lumi":5,"event":7}}}}"#).unwrap();

        let dataset = Dataset::data("JetHT").with_files([first, second]);
        let events: Vec<u64> = JsonLinesSource::new()
            .open(&dataset)
            .unwrap()
            .map(|r| r.unwrap().id.event)
            .collect();

        assert_eq!(events, vec![1, 2, 7]);
    }

    #[test]
    fn test_json_lines_reports_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{{}}").unwrap();
        writeln!(file, "not json").unwrap();

        let dataset = Dataset::data("JetHT").with_files([path]);
        let results: Vec<_> = JsonLinesSource::new().open(&dataset).unwrap().collect();

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SourceError::Malformed { line: 2, .. })));
    }

    #[test]
    fn test_json_lines_missing_file_fails_on_open() {
        let dataset = Dataset::data("JetHT").with_files(["/nonexistent/events.jsonl"]);
        assert!(matches!(
            JsonLinesSource::new().open(&dataset),
            Err(SourceError::Io { .. })
        ));
    }
}
