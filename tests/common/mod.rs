// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Common test utilities and helpers for logbook integration tests.

use logbook::config::{ConfigError, ConfigProvider};
use logbook::{HttpLogWriter, LogbookError, LogbookLoader, LogbookSink};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Flat-key configuration provider
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct TestConfigProvider {
    values: HashMap<String, Value>,
}

#[allow(dead_code)]
impl TestConfigProvider {
    /// Enabled logbook for `app_name`, everything else default
    pub fn enabled(app_name: &str) -> Self {
        Self {
            values: HashMap::new(),
        }
        .with_value("logbook.enabled", Value::Bool(true))
        .with_value("logbook.app_name", Value::String(app_name.to_string()))
    }

    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

impl ConfigProvider for TestConfigProvider {
    fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn provider_name(&self) -> &str {
        "test"
    }

    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Writer keeping every record in memory
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct RecordingWriter {
    records: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingWriter {
    pub fn records(&self) -> Vec<Value> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    pub fn raw(&self) -> Vec<String> {
        self.records.lock().unwrap().clone()
    }
}

impl HttpLogWriter for RecordingWriter {
    fn write_request(&self, _: &str, record: &str) -> Result<(), LogbookError> {
        self.records.lock().unwrap().push(record.to_string());
        Ok(())
    }

    fn write_response(&self, _: &str, record: &str) -> Result<(), LogbookError> {
        self.records.lock().unwrap().push(record.to_string());
        Ok(())
    }
}

/// Sink built through the loader with `provider` and a recording writer
#[allow(dead_code)]
pub fn recording_sink(provider: TestConfigProvider) -> (LogbookSink, RecordingWriter) {
    let writer = RecordingWriter::default();
    let sink = LogbookLoader::new()
        .with_provider(provider)
        .with_writer(writer.clone())
        .build()
        .unwrap()
        .expect("logbook should be enabled");
    (sink, writer)
}
