use crate::error::{IterGraphError, IterGraphResult};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Default)]
pub struct Configuration {
    config: HashMap<String, String>,
}

impl Configuration {
    pub fn new() -> Self {
        Self {
            config: HashMap::new(),
        }
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.put(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.config.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.config.contains_key(key)
    }

    pub fn get_string(&self, key: &str, default_value: &str) -> String {
        self.config
            .get(key)
            .cloned()
            .unwrap_or_else(|| default_value.to_string())
    }

    pub fn get_u64(&self, key: &str) -> IterGraphResult<Option<u64>> {
        self.parse(key)
    }

    pub fn get_usize(&self, key: &str) -> IterGraphResult<Option<usize>> {
        self.parse(key)
    }

    pub fn get_f64(&self, key: &str) -> IterGraphResult<Option<f64>> {
        self.parse(key)
    }

    pub fn get_bool(&self, key: &str) -> IterGraphResult<Option<bool>> {
        self.parse(key)
    }

    fn parse<T>(&self, key: &str) -> IterGraphResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.config
            .get(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    IterGraphError::InvalidArgument(format!("config {key}={raw}: {e}"))
                })
            })
            .transpose()
    }
}

