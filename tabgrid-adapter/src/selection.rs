use tabgrid_types::{RecordKey, Row};

/// What the user last selected.
///
/// Rows are identified by key when the metadata declares a key field, and
/// by position otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Key(RecordKey),
    Index(usize),
}

/// Client-side bookkeeping of the current row across reloads.
#[derive(Debug, Clone, Default)]
pub struct SelectionMirror {
    selection: Selection,
}

impl SelectionMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self) -> bool {
        self.selection != Selection::None
    }

    pub fn clear(&mut self) {
        self.selection = Selection::None;
    }

    /// Selects row `index` of `rows`, by key when possible.
    pub fn select_row(&mut self, rows: &[Row], key_field: Option<&str>, index: usize) -> bool {
        let Some(row) = rows.get(index) else {
            return false;
        };
        self.selection = match key_field.and_then(|field| RecordKey::of_row(row, field)) {
            Some(key) => Selection::Key(key),
            None => Selection::Index(index),
        };
        true
    }

    /// Position of the selected row in `rows`.
    pub fn resolve(&self, rows: &[Row], key_field: Option<&str>) -> Option<usize> {
        match &self.selection {
            Selection::None => None,
            Selection::Key(key) => {
                let field = key_field?;
                rows.iter()
                    .position(|row| RecordKey::of_row(row, field).as_ref() == Some(key))
            }
            Selection::Index(index) => (*index < rows.len()).then_some(*index),
        }
    }

    /// Re-applies the selection after rows were replaced: the previous row
    /// if it is still present, else the first row, else nothing.
    ///
    /// With `select_first` unset, an empty selection stays empty.
    pub fn reapply(
        &mut self,
        rows: &[Row],
        key_field: Option<&str>,
        select_first: bool,
    ) -> Option<usize> {
        if rows.is_empty() {
            self.clear();
            return None;
        }
        if let Some(index) = self.resolve(rows, key_field) {
            return Some(index);
        }
        if self.selection == Selection::None && !select_first {
            return None;
        }
        self.select_row(rows, key_field, 0);
        Some(0)
    }
}
