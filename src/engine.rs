use std::rc::Rc;

use crate::error::{ExpandError, ExpandResult};
use crate::template::{Derived, FieldSpec, IS, ObjectTemplate, Template};
use crate::value::{Record, Value};
use crate::{debug, trace};

/// A field on a candidate that has not been finalized yet.
#[derive(Clone)]
enum Slot<'t> {
    Value(Value),
    Pending(&'t Derived),
}

type Candidate<'t> = Vec<(&'t str, Slot<'t>)>;

/// Walks an object and its override chain, nearest link first.
///
/// Yields `CyclicChain` and stops if a link is reached a second time. A chain
/// parent that is not an object ends the walk.
struct Links<'t> {
    next: Option<&'t ObjectTemplate>,
    visited: Vec<&'t ObjectTemplate>,
}

impl<'t> Links<'t> {
    const fn new(object: &'t ObjectTemplate) -> Self {
        Self {
            next: Some(object),
            visited: Vec::new(),
        }
    }
}

impl<'t> Iterator for Links<'t> {
    type Item = ExpandResult<&'t ObjectTemplate>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        if self.visited.iter().any(|seen| std::ptr::eq(*seen, current)) {
            return Some(Err(ExpandError::CyclicChain {
                links: self.visited.len(),
            }));
        }
        self.visited.push(current);

        self.next = current
            .chain()
            .and_then(Template::as_object)
            .map(Rc::as_ref);
        Some(Ok(current))
    }
}

/// Returns the spec that determines `name` on `object`, searching the object
/// itself and then each chain parent in turn. The nearest declaration wins.
///
/// # Errors
/// - `MissingField` if no object along the chain declares `name`.
/// - `CyclicChain` if the chain loops before a declaration is found.
pub fn resolve_field<'t>(object: &'t ObjectTemplate, name: &str) -> ExpandResult<&'t FieldSpec> {
    for link in Links::new(object) {
        if let Some(spec) = link?.own_field(name) {
            return Ok(spec);
        }
    }

    Err(ExpandError::MissingField {
        field_name: name.to_owned(),
    })
}

/// Every field visible on `object`: its own declarations followed by each
/// undeclared name inherited through the chain, in the order the names first
/// appear walking outward. Each name comes paired with its nearest
/// declaration.
///
/// # Errors
/// - `CyclicChain` if the chain loops.
pub fn visible_fields(object: &ObjectTemplate) -> ExpandResult<Vec<(&str, &FieldSpec)>> {
    let mut visible: Vec<(&str, &FieldSpec)> = Vec::new();

    for link in Links::new(object) {
        let link = link?;
        trace!(own_fields = link.fields().count(), "walking chain link");
        for (name, spec) in link.fields() {
            if !visible.iter().any(|(seen, _)| *seen == name) {
                visible.push((name, spec));
            }
        }
    }

    Ok(visible)
}

/// Enumerates every concrete value `template` describes, in order.
///
/// Primitives expand to themselves, alternations to the concatenation of
/// their alternatives, sequences to the Cartesian product of their positions
/// (last position varying fastest) and objects to the product of their
/// visible fields, finalized into [`Record`]s.
///
/// The result is fully materialized. Its size is the product of the
/// alternative counts of every reachable choice point, less whatever `is`
/// removes, so an N-way choice repeated across M sequence positions yields
/// N^M values. Bound the template to bound the cost.
///
/// # Errors
/// - `CyclicChain` if an object's override chain loops.
/// - `DerivedField` if a derived field's compute function fails.
pub fn expand(template: &Template) -> ExpandResult<Vec<Value>> {
    match template {
        Template::Primitive(value) => Ok(vec![value.clone()]),
        Template::Alternation(alternatives) => {
            let mut expanded = Vec::new();
            for alternative in alternatives {
                expanded.extend(expand(alternative)?);
            }
            Ok(expanded)
        }
        Template::Sequence(items) => expand_sequence(items),
        Template::Object(object) => expand_object(object),
    }
}

/// Extends each partial by each choice, partial-major.
fn product<T, V, F>(partials: &[T], choices: &[V], mut extend: F) -> Vec<T>
where
    T: Clone,
    V: Clone,
    F: FnMut(&mut T, V),
{
    let mut combined = Vec::with_capacity(partials.len().saturating_mul(choices.len()));
    for partial in partials {
        for choice in choices {
            let mut next = partial.clone();
            extend(&mut next, choice.clone());
            combined.push(next);
        }
    }
    combined
}

fn expand_sequence(items: &[Template]) -> ExpandResult<Vec<Value>> {
    let mut partials: Vec<Vec<Value>> = vec![Vec::with_capacity(items.len())];

    for item in items {
        let choices = expand(item)?;
        partials = product(&partials, &choices, Vec::push);
    }

    Ok(partials.into_iter().map(Value::List).collect())
}

fn expand_object(object: &ObjectTemplate) -> ExpandResult<Vec<Value>> {
    let fields = visible_fields(object)?;
    let mut candidates: Vec<Candidate<'_>> = vec![Vec::with_capacity(fields.len())];

    for &(name, spec) in &fields {
        match spec {
            FieldSpec::Stored(sub) => {
                let choices = expand(sub)?;
                candidates = product(&candidates, &choices, |candidate, value| {
                    candidate.push((name, Slot::Value(value)));
                });
            }
            FieldSpec::Derived(derived) => {
                for candidate in &mut candidates {
                    candidate.push((name, Slot::Pending(derived)));
                }
            }
        }
    }

    let produced = candidates.len();
    let mut records = Vec::with_capacity(produced);
    for candidate in candidates {
        if let Some(record) = finalize(candidate)? {
            records.push(Value::Record(record));
        }
    }

    debug!(
        fields = fields.len(),
        produced,
        kept = records.len(),
        "expanded object"
    );

    Ok(records)
}

fn evaluate(name: &str, derived: &Derived, context: &Record) -> ExpandResult<Value> {
    derived
        .evaluate(context)
        .map_err(|source| ExpandError::DerivedField {
            field_name: name.to_owned(),
            source,
        })
}

/// Evaluates derived fields in declaration order, each seeing the fields
/// settled before it, and applies the `is` rule at its declared position.
///
/// Fields declared before a derived `is` are evaluated first so the
/// predicate can read them; the rest only run for candidates that survive.
/// Returns `None` when the candidate is filtered out.
fn finalize(candidate: Candidate<'_>) -> ExpandResult<Option<Record>> {
    let mut context = Record::new();
    for (name, slot) in &candidate {
        match slot {
            Slot::Value(value) if *name != IS => {
                context.insert((*name).to_owned(), value.clone());
            }
            Slot::Value(_) | Slot::Pending(_) => {}
        }
    }

    let predicate = candidate.iter().position(|(name, _)| *name == IS);
    let (before, after) = candidate.split_at(predicate.unwrap_or(candidate.len()));

    for (name, slot) in before {
        if let Slot::Pending(derived) = slot {
            let value = evaluate(name, derived, &context)?;
            context.insert((*name).to_owned(), value);
        }
    }

    if let Some(((_, slot), rest)) = after.split_first() {
        let included = match slot {
            Slot::Value(value) => value.is_truthy(),
            Slot::Pending(derived) => evaluate(IS, derived, &context)?.is_truthy(),
        };
        if !included {
            trace!(fields = candidate.len(), "candidate rejected by is");
            return Ok(None);
        }

        for (name, slot) in rest {
            if let Slot::Pending(derived) = slot {
                let value = evaluate(name, derived, &context)?;
                context.insert((*name).to_owned(), value);
            }
        }
    }

    // Derived values were appended after the stored ones; restore the
    // candidate's field order.
    let mut record = Record::new();
    for (name, _) in &candidate {
        if let Some(value) = context.remove(name) {
            record.insert((*name).to_owned(), value);
        }
    }

    Ok(Some(record))
}
