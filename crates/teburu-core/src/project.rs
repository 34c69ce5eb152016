//! Row projection

use serde_json::{Map, Value};

use crate::case::KeyCase;
use crate::cell::Row;
use crate::collapse::{collapse_cell, Shape};
use crate::columns::ColumnFilter;
use crate::header::Header;

/// One row as a JSON object, keys in header order
pub type Record = Map<String, Value>;

/// Shaping rules for a request.
///
/// Defaults are camel-case keys, simple values and no column filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionOptions {
    pub case: KeyCase,
    pub shape: Shape,
    pub columns: ColumnFilter,
}

impl ProjectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case(mut self, case: KeyCase) -> Self {
        self.case = case;
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn columns(mut self, columns: ColumnFilter) -> Self {
        self.columns = columns;
        self
    }
}

/// Row projector with the output key of every header position resolved up
/// front.
#[derive(Debug, Clone)]
pub struct Projector {
    /// `None` marks a column removed by the filter
    keys: Vec<Option<String>>,
    shape: Shape,
}

impl Projector {
    pub fn new(header: &Header, options: &ProjectionOptions) -> Self {
        let keys = header
            .iter()
            .map(|raw| {
                let cased = options.case.apply(raw);
                options.columns.allows(raw, &cased).then_some(cased)
            })
            .collect();

        Self {
            keys,
            shape: options.shape,
        }
    }

    /// Project one row. Cells past the header are ignored; a later column
    /// whose key collides with an earlier one overwrites its value.
    pub fn project(&self, row: &Row) -> Record {
        let mut record = Record::new();
        for (key, cell) in self.keys.iter().zip(row.iter()) {
            let Some(key) = key else {
                continue;
            };
            let value = collapse_cell(cell.value(), cell.hyperlink(), self.shape);
            record.insert(key.clone(), value);
        }
        record
    }

    /// Project rows in order up to the first row without cells
    pub fn project_until_gap<'a, I>(&self, rows: I) -> Vec<Record>
    where
        I: IntoIterator<Item = &'a Row>,
    {
        rows.into_iter()
            .take_while(|row| !row.is_empty())
            .map(|row| self.project(row))
            .collect()
    }
}

/// Project a single row against a header
pub fn project_row(row: &Row, header: &Header, options: &ProjectionOptions) -> Record {
    Projector::new(header, options).project(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use serde_json::json;

    fn header(names: &[&str]) -> Header {
        names.iter().copied().collect()
    }

    #[test]
    fn test_plain_simple() {
        let header = header(&["Name", "Age"]);
        let row = Row::new(vec![Cell::from("Ada"), Cell::from(37.0)]);
        let options = ProjectionOptions::new().case(KeyCase::Plain);

        let record = project_row(&row, &header, &options);
        assert_eq!(Value::Object(record), json!({"Name": "Ada", "Age": 37}));
    }

    #[test]
    fn test_dynamic_only_linked_cell_pairs() {
        let header = header(&["Name", "Age"]);
        let row = Row::new(vec![
            Cell::from("Ada").with_link("http://x"),
            Cell::from(37.0),
        ]);
        let options = ProjectionOptions::new()
            .case(KeyCase::Plain)
            .shape(Shape::Dynamic);

        let record = project_row(&row, &header, &options);
        assert_eq!(
            Value::Object(record),
            json!({"Name": {"value": "Ada", "link": "http://x"}, "Age": 37})
        );
    }

    #[test]
    fn test_filter_matches_cased_key() {
        let header = header(&["Full Name", "Age"]);
        let row = Row::new(vec![Cell::from("Ada Lovelace"), Cell::from(37.0)]);
        let options = ProjectionOptions::new()
            .case(KeyCase::Snake)
            .columns(ColumnFilter::parse("Age").unwrap());

        let record = project_row(&row, &header, &options);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("age"), Some(&json!(37)));
    }

    #[test]
    fn test_filter_keys_subset_of_cased_header() {
        let header = header(&["Full Name", "Age", "E-mail"]);
        let row = Row::new(vec![Cell::from("a"), Cell::from(1.0), Cell::from("b")]);
        let options = ProjectionOptions::new()
            .case(KeyCase::Camel)
            .columns(ColumnFilter::from_iter(["fullName", "E-mail", "missing"]));

        let record = project_row(&row, &header, &options);
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["fullName", "eMail"]);
    }

    #[test]
    fn test_short_and_long_rows() {
        let header = header(&["a", "b"]);
        let short = Row::new(vec![Cell::from("x")]);
        let long = Row::new(vec![Cell::from("x"), Cell::from("y"), Cell::from("z")]);
        let options = ProjectionOptions::default();

        assert_eq!(Value::Object(project_row(&short, &header, &options)), json!({"a": "x"}));
        assert_eq!(
            Value::Object(project_row(&long, &header, &options)),
            json!({"a": "x", "b": "y"})
        );
    }

    #[test]
    fn test_empty_cells_collapse_to_empty_string() {
        let header = header(&["a", "b"]);
        let row = Row::new(vec![Cell::empty(), Cell::from("y")]);
        let record = project_row(&row, &header, &ProjectionOptions::default());
        assert_eq!(Value::Object(record), json!({"a": "", "b": "y"}));
    }

    #[test]
    fn test_collision_last_write_wins() {
        let header = header(&["First Name", "first_name"]);
        let row = Row::new(vec![Cell::from("early"), Cell::from("late")]);
        let record = project_row(&row, &header, &ProjectionOptions::default());
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("firstName"), Some(&json!("late")));
    }

    #[test]
    fn test_keys_follow_header_order() {
        let header = header(&["zeta", "alpha", "mid"]);
        let row = Row::new(vec![Cell::from(1.0), Cell::from(2.0), Cell::from(3.0)]);
        let record = project_row(&row, &header, &ProjectionOptions::default());
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_project_until_gap() {
        let header = header(&["n"]);
        let projector = Projector::new(&header, &ProjectionOptions::default());
        let rows = vec![
            Row::new(vec![Cell::from(1.0)]),
            Row::new(vec![Cell::from(2.0)]),
            Row::default(),
            Row::new(vec![Cell::from(4.0)]),
        ];
        let records = projector.project_until_gap(&rows);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_punctuated_headers_stay_distinct() {
        let header = header(&["Cost ($)", "Cost (€)"]);
        let row = Row::new(vec![Cell::from(1.0), Cell::from(2.0)]);
        let options = ProjectionOptions::new().case(KeyCase::Snake);

        let record = project_row(&row, &header, &options);
        assert_eq!(record.len(), 2);
        assert_eq!(Value::Object(record), json!({"cost_($)": 1, "cost_(€)": 2}));
    }
}
