//! Per-field encryption, hashing and decryption for one resource.

use crate::error::PipelineError;
use crate::normalize::HookError;
use fieldseal_crypto::FieldCrypto;
use fieldseal_model::{FieldClass, ResourceConfig};
use fieldseal_types::Record;
use serde_json::Value;

type FieldResult<T> = Result<T, HookError>;

/// Applies a resource's field classifications to records, filters and
/// results.
///
/// Encryption always handles random-mode fields before deterministic ones.
/// Null values and empty strings pass through untouched.
#[derive(Debug, Clone, Copy)]
pub struct FieldTransformer<'a> {
    config: &'a ResourceConfig,
    crypto: &'a FieldCrypto,
}

impl<'a> FieldTransformer<'a> {
    pub fn new(config: &'a ResourceConfig, crypto: &'a FieldCrypto) -> Self {
        Self { config, crypto }
    }

    fn encrypted(&self) -> impl Iterator<Item = (&'a str, bool)> {
        let random = self.config.encrypted_fields.iter().map(|f| (f.as_str(), false));
        let deterministic = self
            .config
            .deterministic_encrypted_fields
            .iter()
            .map(|f| (f.as_str(), true));
        random.chain(deterministic)
    }

    fn deterministic(&self, field: &str) -> Option<bool> {
        match self.config.classify(field)? {
            FieldClass::Encrypted => Some(false),
            FieldClass::DeterministicEncrypted => Some(true),
            FieldClass::Hashed => None,
        }
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Encrypts every encrypted field present in `record`.
    pub fn encrypt_record(&self, record: &mut Record) -> FieldResult<()> {
        for (field, deterministic) in self.encrypted() {
            if let Some(value) = record.get_mut(field)
                && let Some(plain) = classified_text(field, value)?
            {
                *value = Value::String(self.crypto.encrypt_str(&plain, deterministic)?);
            }
        }
        Ok(())
    }

    /// Replaces every hashed field present in `record` with its hash.
    pub fn hash_record(&self, record: &mut Record) -> FieldResult<()> {
        for field in &self.config.hashed_fields {
            if let Some(value) = record.get_mut(field)
                && let Some(plain) = classified_text(field, value)?
            {
                *value = Value::String(self.crypto.hash(plain.as_bytes())?);
            }
        }
        Ok(())
    }

    // ── Filters ──────────────────────────────────────────────────

    /// Encrypts the operands of encrypted fields inside a `where` clause,
    /// descending into `AND`, `OR` and `NOT`.
    ///
    /// Only bare values and the `equals`, `not`, `in` and `notIn` operands
    /// are rewritten. A random-mode field never matches stored ciphertext
    /// this way; only deterministic fields are searchable.
    pub fn encrypt_where(&self, filter: &mut Record) -> FieldResult<()> {
        for (key, condition) in filter.iter_mut() {
            match key.as_str() {
                "AND" | "OR" | "NOT" => match condition {
                    Value::Object(clause) => self.encrypt_where(clause)?,
                    Value::Array(clauses) => {
                        for clause in clauses.iter_mut().filter_map(Value::as_object_mut) {
                            self.encrypt_where(clause)?;
                        }
                    }
                    _ => {}
                },
                field => {
                    if let Some(deterministic) = self.deterministic(field) {
                        self.encrypt_condition(condition, deterministic)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether `filter` names a random-mode field anywhere, including inside
    /// `AND`, `OR` and `NOT`. Such filters encrypt differently on every call.
    pub fn filters_on_random_field(&self, filter: &Record) -> bool {
        filter.iter().any(|(key, condition)| match key.as_str() {
            "AND" | "OR" | "NOT" => match condition {
                Value::Object(clause) => self.filters_on_random_field(clause),
                Value::Array(clauses) => clauses
                    .iter()
                    .filter_map(Value::as_object)
                    .any(|clause| self.filters_on_random_field(clause)),
                _ => false,
            },
            field => self.deterministic(field) == Some(false),
        })
    }

    fn encrypt_condition(&self, condition: &mut Value, deterministic: bool) -> FieldResult<()> {
        match condition {
            Value::String(_) => self.encrypt_operand(condition, deterministic),
            Value::Object(ops) => {
                for (op, operand) in ops.iter_mut() {
                    match (op.as_str(), operand) {
                        ("equals", operand) => self.encrypt_operand(operand, deterministic)?,
                        ("not", operand) if operand.is_object() => {
                            self.encrypt_condition(operand, deterministic)?
                        }
                        ("not", operand) => self.encrypt_operand(operand, deterministic)?,
                        ("in" | "notIn", Value::Array(items)) => {
                            for item in items {
                                self.encrypt_operand(item, deterministic)?;
                            }
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn encrypt_operand(&self, operand: &mut Value, deterministic: bool) -> FieldResult<()> {
        if let Value::String(plain) = operand
            && !plain.is_empty()
        {
            *operand = Value::String(self.crypto.encrypt_str(plain, deterministic)?);
        }
        Ok(())
    }

    // ── Results ──────────────────────────────────────────────────

    /// Decrypts a store result in place: arrays element-wise, objects
    /// directly, anything else untouched.
    pub fn decrypt_result(&self, result: &mut Value) -> FieldResult<()> {
        match result {
            Value::Array(items) => {
                for record in items.iter_mut().filter_map(Value::as_object_mut) {
                    self.decrypt_record(record)?;
                }
                Ok(())
            }
            Value::Object(record) => self.decrypt_record(record),
            _ => Ok(()),
        }
    }

    pub fn decrypt_record(&self, record: &mut Record) -> FieldResult<()> {
        if !self.config.has_encrypted_fields() {
            return Ok(());
        }
        for (field, deterministic) in self.encrypted() {
            if let Some(value) = record.get_mut(field)
                && let Value::String(envelope) = value
                && !envelope.is_empty()
            {
                *value = Value::String(self.crypto.decrypt_str(envelope, deterministic)?);
            }
        }
        Ok(())
    }
}

/// The text to transform for a classified field, or `None` for values left
/// as they are.
fn classified_text(field: &str, value: &Value) -> FieldResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(PipelineError::Validation(format!(
            "classified field '{field}' must hold a string, got {}",
            kind(other)
        ))
        .into()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
