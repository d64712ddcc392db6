//! Operation evaluation over one resource's rows.
//!
//! [`evaluate`] is shared by every reference store: it reads the current rows,
//! computes the operation's result and reports the row changes the store must
//! persist. Stores decide how to load rows and apply [`Change`]s; the
//! semantics of each operation live here once.

use crate::error::{StorageError, StorageResult};
use crate::filter::{self, total_order};
use fieldseal_types::{new_record_id, DataPayload, Operation, OperationParams, Record, RecordExt};
use serde_json::{json, Map, Number, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A row change produced by a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert(Record),
    Update(Record),
    Delete(String),
}

/// The result of one operation plus the changes to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub value: Value,
    pub changes: Vec<Change>,
}

impl Outcome {
    fn read(value: Value) -> Self {
        Self {
            value,
            changes: Vec::new(),
        }
    }
}

/// Evaluates `operation` against `rows` (in storage order).
pub fn evaluate(
    rows: &[Record],
    operation: Operation,
    params: &OperationParams,
) -> StorageResult<Outcome> {
    match operation {
        Operation::FindUnique | Operation::FindUniqueOrThrow => {
            let found = first_match(rows, params)?;
            single_or_missing(found, params, operation.requires_match())
        }
        Operation::FindFirst | Operation::FindFirstOrThrow => {
            let found = page(rows, params)?.into_iter().next();
            single_or_missing(found, params, operation.requires_match())
        }
        Operation::FindMany => {
            let found = page(rows, params)?;
            Ok(Outcome::read(Value::Array(
                found.into_iter().map(|r| Value::Object(project(r, params))).collect(),
            )))
        }
        Operation::Count => {
            let count = matching(rows, params.filter.as_ref())?.len();
            Ok(Outcome::read(json!(count)))
        }
        Operation::Aggregate => {
            let found = page(rows, params)?;
            Ok(Outcome::read(Value::Object(aggregate(&found, params)?)))
        }
        Operation::GroupBy => group_by(rows, params).map(Outcome::read),
        Operation::Create => create(rows, params),
        Operation::CreateMany => create_many(rows, params),
        Operation::Update => update(rows, params),
        Operation::UpdateMany => update_many(rows, params),
        Operation::Delete => delete(rows, params),
        Operation::DeleteMany => delete_many(rows, params),
    }
}

// ── Reads ────────────────────────────────────────────────────────

fn matching<'a>(rows: &'a [Record], filter: Option<&Record>) -> StorageResult<Vec<&'a Record>> {
    let mut out = Vec::new();
    for row in rows {
        if filter.map_or(Ok(true), |f| filter::matches(row, f))? {
            out.push(row);
        }
    }
    Ok(out)
}

fn first_match<'a>(rows: &'a [Record], params: &OperationParams) -> StorageResult<Option<&'a Record>> {
    Ok(matching(rows, params.filter.as_ref())?.into_iter().next())
}

/// Matching rows after `orderBy`, `cursor`, `skip` and `take`.
fn page<'a>(rows: &'a [Record], params: &OperationParams) -> StorageResult<Vec<&'a Record>> {
    let mut found = matching(rows, params.filter.as_ref())?;

    if let Some(order_by) = &params.order_by {
        let keys = sort_keys(order_by)?;
        found.sort_by(|a, b| compare_rows(a, b, &keys));
    }

    if let Some(cursor) = &params.cursor {
        match found.iter().position(|r| r.id() == Some(cursor.as_str())) {
            Some(start) => {
                found.drain(..start);
            }
            None => found.clear(),
        }
    }

    let skip = params.skip.unwrap_or(0);
    let take = params.take.unwrap_or(usize::MAX);
    Ok(found.into_iter().skip(skip).take(take).collect())
}

fn sort_keys(order_by: &Value) -> StorageResult<Vec<(String, bool)>> {
    let clauses: Vec<&Map<String, Value>> = match order_by {
        Value::Object(clause) => vec![clause],
        Value::Array(items) => items
            .iter()
            .map(|i| {
                i.as_object()
                    .ok_or_else(|| StorageError::InvalidQuery("orderBy entries must be objects".into()))
            })
            .collect::<StorageResult<_>>()?,
        _ => return Err(StorageError::InvalidQuery("orderBy must be an object or array".into())),
    };

    let mut keys = Vec::new();
    for clause in clauses {
        for (field, direction) in clause {
            let descending = match direction.as_str() {
                Some("asc") => false,
                Some("desc") => true,
                _ => {
                    return Err(StorageError::InvalidQuery(format!(
                        "orderBy direction for '{field}' must be \"asc\" or \"desc\""
                    )));
                }
            };
            keys.push((field.clone(), descending));
        }
    }
    Ok(keys)
}

fn compare_rows(a: &Record, b: &Record, keys: &[(String, bool)]) -> Ordering {
    for (field, descending) in keys {
        let ord = total_order(
            a.get(field).unwrap_or(&Value::Null),
            b.get(field).unwrap_or(&Value::Null),
        );
        let ord = if *descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Applies `select` then `omit`.
fn project(record: &Record, params: &OperationParams) -> Record {
    let mut out = match &params.select {
        Some(select) => record
            .iter()
            .filter(|(field, _)| select.get(*field).is_some_and(truthy))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        None => record.clone(),
    };
    if let Some(omit) = &params.omit {
        out.retain(|field, _| !omit.get(field).is_some_and(truthy));
    }
    out
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn single_or_missing(
    found: Option<&Record>,
    params: &OperationParams,
    required: bool,
) -> StorageResult<Outcome> {
    match found {
        Some(record) => Ok(Outcome::read(Value::Object(project(record, params)))),
        None if required => Err(StorageError::NotFound("No record found".into())),
        None => Ok(Outcome::read(Value::Null)),
    }
}

// ── Aggregation ──────────────────────────────────────────────────

fn selected_fields(selector: &Record) -> impl Iterator<Item = &String> {
    selector
        .iter()
        .filter(|(_, on)| truthy(on))
        .map(|(field, _)| field)
}

fn aggregate(rows: &[&Record], params: &OperationParams) -> StorageResult<Map<String, Value>> {
    let mut out = Map::new();

    if let Some(count) = &params.count {
        let value = match count {
            Value::Object(fields) => {
                let mut counts = Map::new();
                for field in selected_fields(fields) {
                    let n = if field == "_all" {
                        rows.len()
                    } else {
                        rows.iter()
                            .filter(|r| !r.get(field).unwrap_or(&Value::Null).is_null())
                            .count()
                    };
                    counts.insert(field.clone(), json!(n));
                }
                Value::Object(counts)
            }
            other if truthy(other) => json!(rows.len()),
            _ => Value::Null,
        };
        if !value.is_null() {
            out.insert("_count".into(), value);
        }
    }

    type Reducer = fn(&[&Value]) -> Value;
    let reducers: [(&str, &Option<Record>, Reducer); 4] = [
        ("_min", &params.min, |vals| extreme(vals, Ordering::Less)),
        ("_max", &params.max, |vals| extreme(vals, Ordering::Greater)),
        ("_sum", &params.sum, sum),
        ("_avg", &params.avg, avg),
    ];

    for (key, selector, reduce) in reducers {
        let Some(selector) = selector else { continue };
        let mut fields = Map::new();
        for field in selected_fields(selector) {
            let values: Vec<&Value> = rows
                .iter()
                .filter_map(|r| r.get(field))
                .filter(|v| !v.is_null())
                .collect();
            fields.insert(field.clone(), reduce(&values));
        }
        out.insert(key.to_string(), Value::Object(fields));
    }

    Ok(out)
}

fn extreme(values: &[&Value], want: Ordering) -> Value {
    values
        .iter()
        .copied()
        .reduce(|best, v| if total_order(v, best) == want { v } else { best })
        .cloned()
        .unwrap_or(Value::Null)
}

fn numbers<'a>(values: &'a [&Value]) -> impl Iterator<Item = f64> + 'a {
    values.iter().filter_map(|v| v.as_f64())
}

fn sum(values: &[&Value]) -> Value {
    if numbers(values).next().is_none() {
        return Value::Null;
    }
    if values.iter().all(|v| v.is_i64()) {
        return json!(values.iter().filter_map(|v| v.as_i64()).sum::<i64>());
    }
    Number::from_f64(numbers(values).sum())
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn avg(values: &[&Value]) -> Value {
    let nums: Vec<f64> = numbers(values).collect();
    if nums.is_empty() {
        return Value::Null;
    }
    Number::from_f64(nums.iter().sum::<f64>() / nums.len() as f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn group_by(rows: &[Record], params: &OperationParams) -> StorageResult<Value> {
    let by = params
        .by
        .as_ref()
        .filter(|by| !by.is_empty())
        .ok_or_else(|| StorageError::InvalidQuery("groupBy requires `by`".into()))?;

    let found = matching(rows, params.filter.as_ref())?;
    let mut groups: Vec<(Vec<Value>, Vec<&Record>)> = Vec::new();
    for row in found {
        let key: Vec<Value> = by
            .iter()
            .map(|f| row.get(f).cloned().unwrap_or(Value::Null))
            .collect();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(row),
            None => groups.push((key, vec![row])),
        }
    }

    let mut out = Vec::with_capacity(groups.len());
    for (key, members) in groups {
        let mut group = Map::new();
        for (field, value) in by.iter().zip(key) {
            group.insert(field.clone(), value);
        }
        group.extend(aggregate(&members, params)?);
        out.push(group);
    }

    if let Some(order_by) = &params.order_by {
        let keys = sort_keys(order_by)?;
        out.sort_by(|a, b| compare_rows(a, b, &keys));
    }

    let skip = params.skip.unwrap_or(0);
    let take = params.take.unwrap_or(usize::MAX);
    Ok(Value::Array(
        out.into_iter().skip(skip).take(take).map(Value::Object).collect(),
    ))
}

// ── Writes ───────────────────────────────────────────────────────

fn single_data(params: &OperationParams) -> StorageResult<&Record> {
    params
        .data
        .as_ref()
        .and_then(DataPayload::as_one)
        .ok_or_else(|| StorageError::InvalidQuery("`data` must be a single object".into()))
}

/// Fills in a missing id and checks a supplied one is a non-empty string.
fn with_id(mut data: Record) -> StorageResult<(String, Record)> {
    let id = match data.get("id") {
        None | Some(Value::Null) => new_record_id(),
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(_) => {
            return Err(StorageError::InvalidQuery("`id` must be a non-empty string".into()));
        }
    };
    data.insert("id".into(), Value::String(id.clone()));
    Ok((id, data))
}

fn create(rows: &[Record], params: &OperationParams) -> StorageResult<Outcome> {
    let (id, record) = with_id(single_data(params)?.clone())?;
    if rows.iter().any(|r| r.id() == Some(id.as_str())) {
        return Err(StorageError::Constraint(format!(
            "unique constraint failed on id '{id}'"
        )));
    }
    Ok(Outcome {
        value: Value::Object(project(&record, params)),
        changes: vec![Change::Insert(record)],
    })
}

fn create_many(rows: &[Record], params: &OperationParams) -> StorageResult<Outcome> {
    let data = params
        .data
        .as_ref()
        .and_then(DataPayload::as_many)
        .ok_or_else(|| StorageError::InvalidQuery("`data` must be an array".into()))?;
    let skip_duplicates = params.skip_duplicates.unwrap_or(false);

    let mut taken: HashSet<String> = rows.iter().filter_map(|r| r.id().map(String::from)).collect();
    let mut changes = Vec::with_capacity(data.len());
    for item in data {
        let (id, record) = with_id(item.clone())?;
        if !taken.insert(id.clone()) {
            if skip_duplicates {
                continue;
            }
            return Err(StorageError::Constraint(format!(
                "unique constraint failed on id '{id}'"
            )));
        }
        changes.push(Change::Insert(record));
    }

    Ok(Outcome {
        value: json!({ "count": changes.len() }),
        changes,
    })
}

fn merge(existing: &Record, data: &Record) -> StorageResult<Record> {
    if let Some(new_id) = data.get("id")
        && existing.get("id") != Some(new_id)
    {
        return Err(StorageError::Constraint("record id is immutable".into()));
    }
    let mut merged = existing.clone();
    for (field, value) in data {
        merged.insert(field.clone(), value.clone());
    }
    Ok(merged)
}

fn update(rows: &[Record], params: &OperationParams) -> StorageResult<Outcome> {
    let data = single_data(params)?;
    let existing = first_match(rows, params)?
        .ok_or_else(|| StorageError::NotFound("Record to update not found.".into()))?;
    let merged = merge(existing, data)?;
    Ok(Outcome {
        value: Value::Object(project(&merged, params)),
        changes: vec![Change::Update(merged)],
    })
}

fn update_many(rows: &[Record], params: &OperationParams) -> StorageResult<Outcome> {
    let data = single_data(params)?;
    let changes = matching(rows, params.filter.as_ref())?
        .into_iter()
        .map(|existing| merge(existing, data).map(Change::Update))
        .collect::<StorageResult<Vec<_>>>()?;
    Ok(Outcome {
        value: json!({ "count": changes.len() }),
        changes,
    })
}

fn delete(rows: &[Record], params: &OperationParams) -> StorageResult<Outcome> {
    let existing = first_match(rows, params)?
        .ok_or_else(|| StorageError::NotFound("Record to delete does not exist.".into()))?;
    let id = existing
        .id()
        .ok_or_else(|| StorageError::InvalidQuery("stored record has no id".into()))?;
    Ok(Outcome {
        value: Value::Object(project(existing, params)),
        changes: vec![Change::Delete(id.to_string())],
    })
}

fn delete_many(rows: &[Record], params: &OperationParams) -> StorageResult<Outcome> {
    let changes: Vec<Change> = matching(rows, params.filter.as_ref())?
        .into_iter()
        .filter_map(|r| r.id().map(|id| Change::Delete(id.to_string())))
        .collect();
    Ok(Outcome {
        value: json!({ "count": changes.len() }),
        changes,
    })
}
