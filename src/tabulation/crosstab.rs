//! Cross-tabulation results: counts per (group, outcome value) plus margins.

use std::fmt;

use serde::Serialize;

use crate::types::Category;

/// Counts of one outcome attribute per group, with row, column and grand totals.
///
/// Rows are groups, columns are the distinct outcome values (ascending). Margins are summed from
/// the cells when the table is built, so every row total equals the sum of its row, every column
/// total the sum of its column, and the grand total the sum of either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeTable {
    group_attribute: String,
    attribute: String,
    groups: Vec<Category>,
    columns: Vec<Category>,
    cells: Vec<Vec<u64>>,
    row_totals: Vec<u64>,
    column_totals: Vec<u64>,
    grand_total: u64,
}

impl OutcomeTable {
    /// Build a table from a dense `groups.len() × columns.len()` cell matrix.
    pub(crate) fn from_cells(
        group_attribute: String,
        attribute: String,
        groups: Vec<Category>,
        columns: Vec<Category>,
        cells: Vec<Vec<u64>>,
    ) -> Self {
        debug_assert_eq!(cells.len(), groups.len());
        debug_assert!(cells.iter().all(|row| row.len() == columns.len()));

        let row_totals: Vec<u64> = cells.iter().map(|row| row.iter().sum()).collect();
        let column_totals: Vec<u64> = (0..columns.len())
            .map(|c| cells.iter().map(|row| row[c]).sum())
            .collect();
        let grand_total = row_totals.iter().sum();

        Self {
            group_attribute,
            attribute,
            groups,
            columns,
            cells,
            row_totals,
            column_totals,
            grand_total,
        }
    }

    /// Name of the grouping attribute (rows).
    pub fn group_attribute(&self) -> &str {
        &self.group_attribute
    }

    /// Name of the outcome attribute (columns).
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Group labels in row order.
    pub fn groups(&self) -> &[Category] {
        &self.groups
    }

    /// Distinct outcome values in column order.
    pub fn columns(&self) -> &[Category] {
        &self.columns
    }

    /// Dense cell matrix, row-major.
    pub fn cells(&self) -> &[Vec<u64>] {
        &self.cells
    }

    /// Count at (`group`, `value`); zero when either is absent.
    pub fn count(&self, group: impl Into<Category>, value: impl Into<Category>) -> u64 {
        match (self.group_index(&group.into()), self.column_index(&value.into())) {
            (Some(r), Some(c)) => self.cells[r][c],
            _ => 0,
        }
    }

    /// Cells of one group's row.
    pub fn row(&self, group: &Category) -> Option<&[u64]> {
        self.group_index(group).map(|r| self.cells[r].as_slice())
    }

    /// Total for one group, or `None` if the group is not a row.
    pub fn row_total(&self, group: impl Into<Category>) -> Option<u64> {
        self.group_index(&group.into()).map(|r| self.row_totals[r])
    }

    /// Total for one outcome value, or `None` if the value never occurred.
    pub fn column_total(&self, value: impl Into<Category>) -> Option<u64> {
        self.column_index(&value.into()).map(|c| self.column_totals[c])
    }

    /// Row totals in row order.
    pub fn row_totals(&self) -> &[u64] {
        &self.row_totals
    }

    /// Column totals in column order.
    pub fn column_totals(&self) -> &[u64] {
        &self.column_totals
    }

    /// Sum of all cells.
    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    /// Iterate non-zero cells as (group, value, count).
    pub fn nonzero_cells(&self) -> impl Iterator<Item = (&Category, &Category, u64)> {
        self.groups.iter().zip(&self.cells).flat_map(move |(group, row)| {
            self.columns
                .iter()
                .zip(row.iter())
                .filter(|(_, count)| **count > 0)
                .map(move |(value, count)| (group, value, *count))
        })
    }

    pub(crate) fn rename_group_attribute(&mut self, name: &str) {
        self.group_attribute = name.to_owned();
    }

    fn group_index(&self, group: &Category) -> Option<usize> {
        self.groups.iter().position(|g| g == group)
    }

    fn column_index(&self, value: &Category) -> Option<usize> {
        self.columns.binary_search(value).ok()
    }
}

/// Renders the table with an `All` margin row and column.
impl fmt::Display for OutcomeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MARGIN: &str = "All";

        let labels: Vec<String> = self.groups.iter().map(ToString::to_string).collect();
        let first_width = labels
            .iter()
            .map(String::len)
            .chain([
                self.group_attribute.len(),
                self.attribute.len(),
                MARGIN.len(),
            ])
            .max()
            .unwrap_or(MARGIN.len());

        let headers: Vec<String> = self.columns.iter().map(ToString::to_string).collect();
        let widths: Vec<usize> = headers
            .iter()
            .zip(&self.column_totals)
            .map(|(h, total)| h.len().max(total.to_string().len()))
            .collect();
        let margin_width = MARGIN.len().max(self.grand_total.to_string().len());

        write!(f, "{:<first_width$}", self.attribute)?;
        for (h, &w) in headers.iter().zip(&widths) {
            write!(f, " {h:>w$}")?;
        }
        writeln!(f, " {MARGIN:>margin_width$}")?;
        writeln!(f, "{}", self.group_attribute)?;

        for ((label, row), total) in labels.iter().zip(&self.cells).zip(&self.row_totals) {
            write!(f, "{label:<first_width$}")?;
            for (count, &w) in row.iter().zip(&widths) {
                write!(f, " {count:>w$}")?;
            }
            writeln!(f, " {total:>margin_width$}")?;
        }

        write!(f, "{MARGIN:<first_width$}")?;
        for (total, &w) in self.column_totals.iter().zip(&widths) {
            write!(f, " {total:>w$}")?;
        }
        write!(f, " {:>margin_width$}", self.grand_total)
    }
}

/// Result of [`crate::tabulation::tabulate`]: one [`OutcomeTable`] per outcome attribute, all
/// sharing the same group rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    group_attribute: String,
    groups: Vec<Category>,
    tables: Vec<OutcomeTable>,
}

impl CrossTab {
    pub(crate) fn new(group_attribute: String, groups: Vec<Category>, tables: Vec<OutcomeTable>) -> Self {
        Self {
            group_attribute,
            groups,
            tables,
        }
    }

    /// Name of the grouping attribute.
    pub fn group_attribute(&self) -> &str {
        &self.group_attribute
    }

    /// Group labels in row order.
    pub fn groups(&self) -> &[Category] {
        &self.groups
    }

    /// Table for one outcome attribute.
    pub fn outcome(&self, attribute: &str) -> Option<&OutcomeTable> {
        self.tables.iter().find(|t| t.attribute == attribute)
    }

    /// Tables in the order the outcome attributes were requested.
    pub fn outcomes(&self) -> &[OutcomeTable] {
        &self.tables
    }

    /// Number of records that were tabulated.
    ///
    /// Every outcome table counts each record once, so this is the grand total of any of them.
    pub fn record_count(&self) -> u64 {
        self.tables.first().map_or(0, OutcomeTable::grand_total)
    }

    /// Rename the grouping attribute, e.g. `age` to `age_group` once it has been bucketed.
    pub fn with_group_attribute(mut self, name: &str) -> Self {
        self.group_attribute = name.to_owned();
        for table in &mut self.tables {
            table.rename_group_attribute(name);
        }
        self
    }
}

impl fmt::Display for CrossTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, table) in self.tables.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            writeln!(f, "{} vs {}:", self.group_attribute, table.attribute)?;
            write!(f, "{table}")?;
        }
        Ok(())
    }
}
