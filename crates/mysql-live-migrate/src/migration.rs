//! Migration descriptor: which table is copied where, which columns travel,
//! and which rows are eligible.
//!
//! The descriptor is read-only for the duration of a copy run. The column
//! intersection is consumed as a precomputed value; computing it (e.g. from
//! `information_schema`) is the caller's job.

use crate::error::{MigrateError, Result};

/// Quote a MySQL identifier, escaping embedded backticks.
///
/// Identifiers cannot be bound as statement parameters, so dynamic table and
/// column names are quoted instead.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Ordered set of column names present in both the origin and destination
/// tables.
///
/// The same order is used for both renderings, so the copy statement relies
/// on positional correspondence rather than name matching at execution time.
#[derive(Debug, Clone)]
pub struct ColumnIntersection {
    columns: Vec<String>,
}

impl ColumnIntersection {
    /// Create an intersection from an ordered column list.
    ///
    /// An empty intersection means origin and destination share no columns,
    /// which makes the copy statement impossible to build.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(MigrateError::Config(
                "column intersection is empty: origin and destination share no columns".into(),
            ));
        }
        Ok(Self { columns })
    }

    /// Source-side rendering: each column qualified with the origin table,
    /// e.g. `` `users`.`id`, `users`.`name` ``.
    pub fn typed(&self, table: &str) -> String {
        let table = quote_ident(table);
        self.columns
            .iter()
            .map(|c| format!("{}.{}", table, quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Destination-side rendering: a plain joined column list,
    /// e.g. `` `id`, `name` ``.
    pub fn joined(&self) -> String {
        self.columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The column names, in rendering order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Predicate restricting which origin rows are eligible for the copy.
///
/// Clauses are kept structured until statement-build time: each clause is
/// parenthesized individually and conjoined with `AND`, so multi-clause
/// filters compose without textual clause surgery.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<String>,
}

impl Filter {
    /// An empty filter: every origin row is eligible.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from a list of predicate clauses.
    pub fn from_clauses(clauses: Vec<String>) -> Self {
        Self { clauses }
    }

    /// Add one predicate clause, AND-ed with the existing ones.
    pub fn and(mut self, clause: impl Into<String>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }
}

/// Everything the copy engine needs to know about one table migration.
#[derive(Debug, Clone)]
pub struct Migration {
    origin: String,
    destination: String,
    filter: Filter,
    intersection: ColumnIntersection,
}

impl Migration {
    /// Create a migration descriptor with no row filter.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        intersection: ColumnIntersection,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            filter: Filter::new(),
            intersection,
        }
    }

    /// Restrict the copy to rows matching the filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// The live source table being migrated from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The new-schema table being populated.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn intersection(&self) -> &ColumnIntersection {
        &self.intersection
    }
}
