//! Filter compilation: typed triples to a conjunctive task predicate.
//!
//! A compiled predicate renders to a parameterized SQL fragment and can also
//! be evaluated against hydrated tasks; both forms agree on every input.

use super::comparator::{Comparator, Operand, resolve};
use super::field::{FieldValue, TaskField};
use super::params::{FilterTriple, zip_filter_triples};
use super::sql::SqlParams;
use crate::error::{CollectionError, CollectionResult};
use crate::model::task::Task;
use rusqlite::types::Value;

/// One compiled comparison on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: TaskField,
    pub comparator: Comparator,
    pub operand: Operand,
    /// Also match rows where the field is unset.
    pub include_nulls: bool,
}

/// A conjunction of clauses. The empty predicate matches every task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPredicate {
    clauses: Vec<FilterClause>,
}

impl TaskPredicate {
    /// Compile typed triples. The first failing triple aborts compilation.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidTaskField`] for fields outside the
    /// allow-list, [`CollectionError::InvalidTaskFilterValue`] for bad
    /// comparators or values.
    pub fn compile(triples: &[FilterTriple], include_nulls: bool) -> CollectionResult<Self> {
        let clauses = triples
            .iter()
            .map(|triple| compile_triple(triple, include_nulls))
            .collect::<CollectionResult<Vec<_>>>()?;
        Ok(Self { clauses })
    }

    /// Compile the three parallel request arrays.
    ///
    /// # Errors
    ///
    /// As [`TaskPredicate::compile`], plus
    /// [`CollectionError::InvalidTaskFilterValue`] when the arrays differ in
    /// length.
    pub fn compile_arrays(
        fields: &[String],
        comparators: &[String],
        values: &[String],
        include_nulls: bool,
    ) -> CollectionResult<Self> {
        let triples = zip_filter_triples(fields, comparators, values)?;
        Self::compile(&triples, include_nulls)
    }

    #[must_use]
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Conjunction of two predicates.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    /// Whether a hydrated task satisfies every clause.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.clauses.iter().all(|clause| clause.matches(task))
    }

    /// SQL conditions for every clause, binding operands into `params`.
    pub(crate) fn to_sql_conditions(&self, params: &mut SqlParams) -> Vec<String> {
        self.clauses
            .iter()
            .map(|clause| clause.to_sql(params))
            .collect()
    }
}

fn compile_triple(triple: &FilterTriple, include_nulls: bool) -> CollectionResult<FilterClause> {
    let field = TaskField::parse(&triple.field).ok_or_else(|| CollectionError::InvalidTaskField {
        field: triple.field.clone(),
    })?;
    let builder = resolve(field, &triple.comparator)?;
    let operand = builder.operand(&triple.value)?;
    Ok(FilterClause {
        field,
        comparator: builder.comparator,
        operand,
        include_nulls,
    })
}

impl FilterClause {
    /// In-memory evaluation with the same semantics as [`FilterClause::to_sql`].
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let cmp = self.comparator;
        match (self.field.value(task), &self.operand) {
            (FieldValue::Date(None), _) => self.include_nulls,
            (FieldValue::Date(Some(secs)), Operand::Date(v)) => cmp.holds(secs.cmp(v)),
            (FieldValue::Integer(x), Operand::Integer(v)) => cmp.holds(x.cmp(v)),
            (FieldValue::Integer(x), Operand::Integers(vs)) => vs.contains(&x),
            (FieldValue::Float(x), Operand::Float(v)) => {
                x.partial_cmp(v).is_some_and(|ordering| cmp.holds(ordering))
            }
            (FieldValue::Bool(x), Operand::Bool(v)) => cmp.holds(x.cmp(v)),
            (FieldValue::Text(x), Operand::Text(v)) if cmp == Comparator::Like => {
                fold_case(x).contains(&fold_case(v))
            }
            (FieldValue::Text(x), Operand::Text(v)) => cmp.holds(x.cmp(v.as_str())),
            (FieldValue::Text(x), Operand::Texts(vs)) => vs.iter().any(|v| v == x),
            (FieldValue::IdSet(ids), Operand::Integer(v)) => ids.contains(v),
            (FieldValue::IdSet(ids), Operand::Integers(vs)) => ids.iter().any(|id| vs.contains(id)),
            _ => false,
        }
    }

    /// Render against the `tasks t` alias.
    pub(crate) fn to_sql(&self, params: &mut SqlParams) -> String {
        if let Some(relation) = self.field.set_relation() {
            let membership = match &self.operand {
                Operand::Integers(ids) => {
                    let n = params.push_json_array(ids);
                    format!("s.{} IN (SELECT value FROM json_each(?{n}))", relation.column)
                }
                operand => {
                    let n = params.push(operand_value(operand));
                    format!("s.{} = ?{n}", relation.column)
                }
            };
            return format!(
                "EXISTS (SELECT 1 FROM {} s WHERE s.task_id = t.id AND {membership})",
                relation.table
            );
        }

        // Every non-set field has a column.
        let col = self.field.column().unwrap_or("t.id");
        let condition = match (&self.operand, self.comparator) {
            (Operand::Text(needle), Comparator::Like) => {
                let n = params.push(Value::Text(like_pattern(needle)));
                format!("{FOLD_FUNCTION}({col}) LIKE ?{n} ESCAPE '\\'")
            }
            (Operand::Integers(values), _) => {
                let n = params.push_json_array(values);
                format!("{col} IN (SELECT value FROM json_each(?{n}))")
            }
            (Operand::Texts(values), _) => {
                let n = params.push_json_array(values);
                format!("{col} IN (SELECT value FROM json_each(?{n}))")
            }
            (operand, comparator) => {
                let n = params.push(operand_value(operand));
                let op = comparator.sql_operator().unwrap_or("=");
                format!("{col} {op} ?{n}")
            }
        };

        if self.include_nulls && self.field.is_nullable() {
            format!("({col} IS NULL OR {condition})")
        } else {
            condition
        }
    }
}

fn operand_value(operand: &Operand) -> Value {
    match operand {
        Operand::Integer(v) | Operand::Date(v) => Value::Integer(*v),
        Operand::Float(v) => Value::Real(*v),
        Operand::Bool(v) => Value::Integer(i64::from(*v)),
        Operand::Text(v) => Value::Text(v.clone()),
        Operand::Integers(vs) => Value::Text(serde_json::Value::from(vs.clone()).to_string()),
        Operand::Texts(vs) => Value::Text(serde_json::Value::from(vs.clone()).to_string()),
    }
}

/// Name of the SQL scalar function that applies [`fold_case`]. Registered on
/// every connection opened through [`crate::db`].
pub const FOLD_FUNCTION: &str = "taskview_fold";

/// Unicode lowercase fold used by `like` filters and title search.
#[must_use]
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// `%needle%` with LIKE metacharacters escaped, folded with [`fold_case`].
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in fold_case(needle).chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
