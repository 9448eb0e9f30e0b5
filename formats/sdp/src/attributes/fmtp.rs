use std::{fmt, str::FromStr};

use crate::errors::SDPError;

/// a=fmtp:<format> <key>=<value>;<key>=<value>;…
///
/// Parameters are kept as parsed pairs; codec-specific interpretation
/// (AAC mode parameters, sprop parameter sets) happens in the payload
/// format crates.
#[derive(Debug, Clone)]
pub struct FormatParameters {
    pub format: u8,
    pub parameters: Vec<(String, String)>,
}

impl FormatParameters {
    /// Case-insensitive lookup, since servers disagree on casing for
    /// parameters like `sizeLength`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_u64(&self, key: &str) -> Result<Option<u64>, SDPError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|err| {
                SDPError::InvalidAttributeLine(format!(
                    "parse fmtp parameter {} failed: {}, {}",
                    key, value, err
                ))
            }),
        }
    }
}

impl FromStr for FormatParameters {
    type Err = SDPError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (first, second) = s
            .split_once(' ')
            .ok_or_else(|| SDPError::InvalidAttributeLine(format!("invalid fmtp: {}", s)))?;
        let format: u8 = first.parse().map_err(|err| {
            SDPError::InvalidAttributeLine(format!("parse fmtp format failed: {}, {}", first, err))
        })?;

        let mut parameters = Vec::new();
        for part in second.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((key, value)) => parameters.push((key.trim().to_owned(), value.to_owned())),
                None => parameters.push((part.to_owned(), String::new())),
            }
        }

        Ok(Self { format, parameters })
    }
}

impl fmt::Display for FormatParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.format)?;
        let mut first = true;
        for (key, value) in &self.parameters {
            if !first {
                write!(f, ";")?;
            }
            first = false;
            if value.is_empty() {
                write!(f, "{}", key)?;
            } else {
                write!(f, "{}={}", key, value)?;
            }
        }
        Ok(())
    }
}
