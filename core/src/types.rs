//! Wire schemas for the fakebank operations resource.
//!
//! # Design
//! Three shapes share one set of fields:
//! - `CreateOperation` always serializes every field; missing values are
//!   filled by the generator before the request is built, never by serde.
//! - `UpdateOperation` wraps each field in `Patch`, which separates "not
//!   set" from "set to null" so partial updates only send what the caller
//!   touched.
//! - `Operation` is the server's answer: the create fields flattened next
//!   to the assigned `id`.
//!
//! `transaction_date` travels as `transactionDate`; the snake-case name is
//! still accepted on input.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// A field of a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Not set; left out of the payload.
    Absent,
    /// Explicitly cleared; sent as `null`.
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            Patch::Absent | Patch::Null => None,
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Value(value)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Patch::Value(v) => v.serialize(serializer),
            // Absent only gets here when the container does not skip it.
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Only called for keys that are present; missing keys hit `default`.
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Patch::Null, Patch::Value))
    }
}

/// Payload for creating an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOperation {
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    pub category: String,
    pub description: String,
    #[serde(rename = "transactionDate", alias = "transaction_date")]
    pub transaction_date: NaiveDate,
}

/// Payload for a PATCH. Only fields that are not `Patch::Absent` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOperation {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub debit: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub credit: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub category: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub description: Patch<String>,
    #[serde(
        rename = "transactionDate",
        alias = "transaction_date",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub transaction_date: Patch<NaiveDate>,
}

impl UpdateOperation {
    pub fn with_debit(mut self, debit: Option<f64>) -> Self {
        self.debit = debit.map_or(Patch::Null, Patch::Value);
        self
    }

    pub fn with_credit(mut self, credit: Option<f64>) -> Self {
        self.credit = credit.map_or(Patch::Null, Patch::Value);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Patch::Value(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Patch::Value(description.into());
        self
    }

    pub fn with_transaction_date(mut self, date: NaiveDate) -> Self {
        self.transaction_date = Patch::Value(date);
        self
    }

    /// True when nothing would be sent.
    pub fn is_empty(&self) -> bool {
        self.debit.is_absent()
            && self.credit.is_absent()
            && self.category.is_absent()
            && self.description.is_absent()
            && self.transaction_date.is_absent()
    }
}

/// An operation as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateOperation,
}

impl Operation {
    pub fn from_json(body: impl AsRef<[u8]>) -> Result<Self> {
        serde_json::from_slice(body.as_ref()).map_err(Error::Deserialization)
    }
}

/// The list returned by `GET /fakebank/accounts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Operations(pub Vec<Operation>);

impl Operations {
    pub fn from_json(body: impl AsRef<[u8]>) -> Result<Self> {
        serde_json::from_slice(body.as_ref()).map_err(Error::Deserialization)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.0.iter()
    }

    pub fn get(&self, id: i64) -> Option<&Operation> {
        self.0.iter().find(|op| op.id == id)
    }
}

impl IntoIterator for Operations {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
