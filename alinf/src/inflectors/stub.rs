//! Offline inflector with a fixed table. Debug mode only.

use super::Inflector;
use alinf_types::{InflectionOptions, InflectorKind};
use async_trait::async_trait;

/// Forms returned for any phrase missing from the table
pub const PLACEHOLDER_FORMS: [&str; 2] = ["кого-то", "кому-то"];

pub struct StubInflector;

impl StubInflector {
    pub fn lookup(phrase: &str) -> &'static [&'static str] {
        match phrase {
            "Василий Афанасьевич Пупкин" => &[
                "Василия Афанасьевича Пупкина",
                "Василию Афанасьевичу Пупкину",
            ],
            "Вася" => &["Васи", "Васе"],
            "стол" => &["стола", "столу"],
            _ => &PLACEHOLDER_FORMS,
        }
    }
}

#[async_trait]
impl Inflector for StubInflector {
    fn kind(&self) -> InflectorKind {
        InflectorKind::Stub
    }

    async fn inflect(
        &self,
        phrase: &str,
        _options: &InflectionOptions,
    ) -> Result<Vec<String>, String> {
        Ok(Self::lookup(phrase).iter().map(|f| f.to_string()).collect())
    }
}
