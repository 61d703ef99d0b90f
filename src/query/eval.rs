//! Query evaluation against a snapshot.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

use super::{CompareOp, Predicate, Query, Step};
use crate::frames::EntityId;
use crate::state::{EntityState, Snapshot};
use crate::value::Value;

/// Root member selecting every entity regardless of class.
const ALL_ENTITIES: &str = "entities";

/// One query result: an entity and the values bound for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// Entity the values belong to.
    pub entity: EntityId,
    /// Bound values keyed by their path below the entity.
    pub values: BTreeMap<String, Value>,
}

/// A node reached while walking the query steps.
#[derive(Debug, Clone)]
enum Candidate<'s, 'q> {
    Root,
    /// Entities of one class, or all entities when `None`.
    Collection(Option<&'q str>),
    Entity(&'s EntityState),
    Value {
        entity: EntityId,
        path: String,
        value: Cow<'s, Value>,
    },
}

/// Evaluates `query` against `snapshot`.
///
/// Entities are visited in ascending id order, so identical inputs always
/// produce identical output.
#[must_use]
pub fn evaluate(query: &Query, snapshot: &Snapshot<'_>) -> Vec<Match> {
    let mut candidates = vec![Candidate::Root];

    for step in query.steps() {
        candidates = match step {
            Step::Field(name) => candidates
                .iter()
                .filter_map(|c| member(c, name))
                .collect(),
            Step::Wildcard => candidates
                .iter()
                .flat_map(|c| children(c, snapshot))
                .collect(),
            Step::Predicate(predicate) => candidates
                .into_iter()
                .flat_map(|c| match c {
                    Candidate::Root | Candidate::Collection(_) => children(&c, snapshot),
                    other => vec![other],
                })
                .filter(|c| satisfies(c, predicate))
                .collect(),
        };
        if candidates.is_empty() {
            break;
        }
    }

    candidates
        .into_iter()
        .flat_map(|c| into_matches(c, snapshot))
        .collect()
}

impl Query {
    /// Evaluates this query against `snapshot`. See [`evaluate`].
    #[must_use]
    pub fn evaluate(&self, snapshot: &Snapshot<'_>) -> Vec<Match> {
        evaluate(self, snapshot)
    }
}

/// Resolves a named member of a candidate.
fn member<'s, 'q>(candidate: &Candidate<'s, 'q>, name: &'q str) -> Option<Candidate<'s, 'q>> {
    match *candidate {
        Candidate::Root if name == ALL_ENTITIES => Some(Candidate::Collection(None)),
        Candidate::Root => Some(Candidate::Collection(Some(name))),
        Candidate::Collection(_) => None,
        Candidate::Entity(entity) => {
            let value = match entity.get(name) {
                Some(value) => Cow::Borrowed(value),
                None => Cow::Owned(synthetic_member(entity, name)?),
            };
            Some(Candidate::Value {
                entity: entity.id,
                path: name.to_owned(),
                value,
            })
        }
        Candidate::Value {
            entity,
            ref path,
            ref value,
        } => match value.as_ref() {
            Value::Vector(v) => Some(Candidate::Value {
                entity,
                path: format!("{path}.{name}"),
                value: Cow::Owned(Value::Float(f64::from(v.component(name)?))),
            }),
            _ => None,
        },
    }
}

/// Members every entity exposes in addition to its properties.
fn synthetic_member(entity: &EntityState, name: &str) -> Option<Value> {
    match name {
        "id" => Some(Value::Integer(i64::from(entity.id))),
        "classname" => Some(Value::String(entity.class.clone())),
        _ => None,
    }
}

/// Expands a candidate into its elements.
fn children<'s, 'q>(
    candidate: &Candidate<'s, 'q>,
    snapshot: &Snapshot<'s>,
) -> Vec<Candidate<'s, 'q>> {
    match *candidate {
        Candidate::Root => snapshot.entities().map(Candidate::Entity).collect(),
        Candidate::Collection(class) => snapshot
            .entities()
            .filter(|e| class.map_or(true, |class| e.class == class))
            .map(Candidate::Entity)
            .collect(),
        Candidate::Entity(entity) => entity
            .properties
            .iter()
            .map(|(name, value)| Candidate::Value {
                entity: entity.id,
                path: name.clone(),
                value: Cow::Borrowed(value),
            })
            .collect(),
        Candidate::Value { .. } => ["x", "y", "z"]
            .into_iter()
            .filter_map(|axis| member(candidate, axis))
            .collect(),
    }
}

/// Tests a predicate against a single candidate.
fn satisfies(candidate: &Candidate<'_, '_>, predicate: &Predicate) -> bool {
    let mut current = candidate.clone();
    for segment in &predicate.path {
        match member(&current, segment) {
            Some(next) => current = next,
            None => return false,
        }
    }

    let Candidate::Value { value, .. } = current else {
        return false;
    };
    if matches!(value.as_ref(), Value::Boolean(_)) && !predicate.op.is_equality() {
        return false;
    }

    value.compare(&predicate.literal).is_some_and(|ordering| {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match predicate.op {
            CompareOp::Eq => ordering == Equal,
            CompareOp::Ne => ordering != Equal,
            CompareOp::Lt => ordering == Less,
            CompareOp::Le => ordering != Greater,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Ge => ordering != Less,
        }
    })
}

/// Turns a final candidate into output matches.
fn into_matches(candidate: Candidate<'_, '_>, snapshot: &Snapshot<'_>) -> Vec<Match> {
    match candidate {
        Candidate::Root | Candidate::Collection(_) => children(&candidate, snapshot)
            .into_iter()
            .flat_map(|c| into_matches(c, snapshot))
            .collect(),
        Candidate::Entity(entity) => vec![Match {
            entity: entity.id,
            values: entity.properties.clone(),
        }],
        Candidate::Value {
            entity,
            path,
            value,
        } => vec![Match {
            entity,
            values: BTreeMap::from([(path, value.into_owned())]),
        }],
    }
}
