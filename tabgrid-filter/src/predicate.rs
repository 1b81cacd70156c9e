use std::cmp::Ordering;

use serde_json::Value;
use tabgrid_types::value::{is_empty_value, normalize_bool, searchable_string};
use tabgrid_types::{FilterCondition, FilterDescriptor, Row};
use tracing::debug;

use crate::comparable::{compare, Comparable, FieldKind};

/// A compiled filter over one field.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPredicate {
    field: String,
    kind: FieldKind,
    condition: FilterCondition,
    /// Every usable filter value, in order.
    values: Vec<Comparable>,
    /// `between` bounds, taken positionally so a blank lower bound leaves
    /// only the upper one.
    lower: Option<Comparable>,
    upper: Option<Comparable>,
}

/// Compiles a descriptor into a predicate.
///
/// Returns `None` (meaning "pass everything") when the descriptor names no
/// field, or when the condition needs a value and none of the supplied
/// values is usable.
pub fn create_predicate(descriptor: &FilterDescriptor) -> Option<RowPredicate> {
    let field = descriptor.field.trim();
    if field.is_empty() {
        return None;
    }
    let kind = FieldKind::from_type_name(descriptor.field_type.as_deref());
    let prepare = |raw: &String| Comparable::from_filter_value(kind, raw);

    let values: Vec<Comparable> = descriptor.values.iter().filter_map(prepare).collect();
    if values.is_empty() && descriptor.condition.requires_value() {
        debug!(
            field,
            condition = %descriptor.condition,
            "filter has no usable values, passing all rows"
        );
        return None;
    }

    Some(RowPredicate {
        field: field.to_string(),
        kind,
        condition: descriptor.condition.clone(),
        lower: descriptor.values.first().and_then(prepare),
        upper: descriptor.values.get(1).and_then(prepare),
        values,
    })
}

impl RowPredicate {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Evaluates the predicate against one row.
    pub fn matches(&self, row: &Row) -> bool {
        let raw = row.get(&self.field);
        let cell = Comparable::from_row_value(self.kind, raw);

        match &self.condition {
            FilterCondition::Between => match non_blank(cell.as_ref()) {
                Some(value) => self.within_bounds(value),
                None => false,
            },
            FilterCondition::Greater => self.ordering(cell.as_ref()) == Some(Ordering::Greater),
            FilterCondition::GreaterOrEqual => matches!(
                self.ordering(cell.as_ref()),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterCondition::Less => self.ordering(cell.as_ref()) == Some(Ordering::Less),
            FilterCondition::LessOrEqual => matches!(
                self.ordering(cell.as_ref()),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterCondition::Equal | FilterCondition::Other(_) => {
                self.ordering(cell.as_ref()) == Some(Ordering::Equal)
            }
            FilterCondition::NotEqual => self.ordering(cell.as_ref()) != Some(Ordering::Equal),
            FilterCondition::Contains => self.search(raw, |hay, needle| hay.contains(needle), false),
            FilterCondition::NotContains => {
                self.search(raw, |hay, needle| !hay.contains(needle), true)
            }
            FilterCondition::StartsWith => {
                self.search(raw, |hay, needle| hay.starts_with(needle), false)
            }
            FilterCondition::EndsWith => self.search(raw, |hay, needle| hay.ends_with(needle), false),
            FilterCondition::In => match non_blank(cell.as_ref()) {
                Some(value) => self.any_equal(value),
                None => false,
            },
            FilterCondition::NotIn => match non_blank(cell.as_ref()) {
                Some(value) => !self.any_equal(value),
                None => true,
            },
            FilterCondition::Empty => is_empty_value(raw),
            FilterCondition::NotEmpty => !is_empty_value(raw),
            FilterCondition::Checked => raw.is_some_and(normalize_bool),
            FilterCondition::Unchecked => !raw.is_some_and(normalize_bool),
        }
    }

    /// Rows of `rows` that pass, in order.
    pub fn apply<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }

    fn ordering(&self, cell: Option<&Comparable>) -> Option<Ordering> {
        compare(cell?, self.values.first()?, self.kind)
    }

    fn any_equal(&self, value: &Comparable) -> bool {
        self.values
            .iter()
            .any(|candidate| compare(value, candidate, self.kind) == Some(Ordering::Equal))
    }

    fn within_bounds(&self, value: &Comparable) -> bool {
        if let Some(lower) = &self.lower {
            if !matches!(
                compare(value, lower, self.kind),
                Some(Ordering::Greater | Ordering::Equal)
            ) {
                return false;
            }
        }
        if let Some(upper) = &self.upper {
            if !matches!(
                compare(value, upper, self.kind),
                Some(Ordering::Less | Ordering::Equal)
            ) {
                return false;
            }
        }
        true
    }

    /// Text search against the first value; `on_blank` is the answer for a
    /// blank cell.
    fn search(&self, raw: Option<&Value>, test: impl Fn(&str, &str) -> bool, on_blank: bool) -> bool {
        let haystack = searchable_string(raw);
        if haystack.is_empty() {
            return on_blank;
        }
        match self.values.first() {
            Some(needle) => test(&haystack, &needle.as_text()),
            None => true,
        }
    }
}

fn non_blank(cell: Option<&Comparable>) -> Option<&Comparable> {
    cell.filter(|value| !value.is_blank())
}
