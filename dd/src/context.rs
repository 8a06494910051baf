//! Document context path algebra
//!
//! The document context is a plain JSON object. Answers land in it under
//! dot-separated paths (`payment.schedule.frequency`), and every merge is
//! copy-on-write: callers get a new context value and the input is never
//! mutated. Keeping this module pure keeps the orchestrator's retry story
//! simple, a failed step can just drop the candidate context.

use serde_json::{Map, Value};

use crate::domain::{Answer, Question, QuestionKind};

/// Read the value at a dot-separated path
pub fn get_path<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = context;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Whether a path holds a usable value (present, not null, not empty text)
pub fn path_resolves(context: &Value, path: &str) -> bool {
    match get_path(context, path) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Write `value` at a dot-separated path, creating intermediate objects
///
/// A non-object value sitting where an intermediate object is needed gets
/// overwritten. An empty path is ignored.
pub fn set_path(context: &mut Value, path: &str, value: Value) {
    if path.is_empty() {
        return;
    }
    if !context.is_object() {
        *context = Value::Object(Map::new());
    }
    let Value::Object(root) = context else { return };

    let segments: Vec<&str> = path.split('.').collect();
    let mut map = root;
    for segment in &segments[..segments.len() - 1] {
        let slot = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(inner) = slot else { return };
        map = inner;
    }

    map.insert(segments[segments.len() - 1].to_string(), value);
}

/// Resolve the value an answer contributes to the context
///
/// Resolution order: the raw answer is the default; a single-select answer
/// with exactly one known option substitutes that option's machine value; a
/// multi-select substitutes the array of machine values for the selected
/// options, dropping ids the question does not know; an `{option, details}`
/// object keeps only the option, the free-text details stay out of the
/// merged context.
pub fn resolve_answer_value(answer: &Answer, question: &Question) -> Value {
    match question.kind {
        QuestionKind::Single if answer.selected_option_ids.len() == 1 => {
            if let Some(value) = question.option_value(&answer.selected_option_ids[0]) {
                return value.clone();
            }
        }
        QuestionKind::Multi => {
            let values: Vec<Value> = answer
                .selected_option_ids
                .iter()
                .filter_map(|id| question.option_value(id).cloned())
                .collect();
            return Value::Array(values);
        }
        _ => {}
    }

    if let Some(option) = answer.raw.get("option") {
        return option.clone();
    }

    answer.raw.clone()
}

/// Merge one answer into a context, returning the new context
///
/// The resolved value is written to every path the question affects, and the
/// raw answer is always kept under a top-level key equal to the question id.
pub fn merge_answer(context: &Value, answer: &Answer, question: &Question) -> Value {
    let mut next = if context.is_object() {
        context.clone()
    } else {
        Value::Object(Map::new())
    };

    let value = resolve_answer_value(answer, question);
    for path in &question.affects {
        set_path(&mut next, path, value.clone());
    }

    // Question ids may contain hyphens but never dots, so this is a plain key
    if let Value::Object(map) = &mut next {
        map.insert(question.id.clone(), answer.raw.clone());
    }

    next
}
