use serde::Serialize;
use ::url::{Host, Url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

pub fn required(value: &str) -> Validation {
    if value.trim().is_empty() {
        Validation::Invalid("This field is required.".to_owned())
    } else {
        Validation::Valid
    }
}

/// Accepts absolute http(s) URLs whose host is an IP literal or a dotted
/// domain with a non-numeric top level label, so `localhost` is rejected.
pub fn url(value: &str) -> Validation {
    let valid = match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => match url.host() {
            Some(Host::Domain(domain)) => has_tld(domain),
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
            None => false,
        },
        _ => false,
    };
    if valid {
        Validation::Valid
    } else {
        Validation::Invalid("Invalid URL.".to_owned())
    }
}

fn has_tld(domain: &str) -> bool {
    match domain.rsplit_once('.') {
        Some((name, tld)) => {
            !name.is_empty() && !tld.is_empty() && !tld.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Collects the first failure of each field's checks.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(
        mut self,
        field: &'static str,
        value: &str,
        rules: &[fn(&str) -> Validation],
    ) -> Self {
        for rule in rules {
            if let Validation::Invalid(message) = rule(value) {
                self.errors.push(FieldError { field, message });
                break;
            }
        }
        self
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
