//! Category operations and default seeding

use rusqlite::{params, Row};
use std::str::FromStr;

use super::Database;
use crate::error::Result;
use crate::models::{Category, NewCategory, TransactionKind};

/// Categories created on first run
const DEFAULT_CATEGORIES: &[(&str, TransactionKind, &str, &str)] = &[
    ("Salary", TransactionKind::Income, "💰", "#4CAF50"),
    ("Business", TransactionKind::Income, "💼", "#2196F3"),
    ("Food", TransactionKind::Expense, "🍔", "#FF9800"),
    ("Transport", TransactionKind::Expense, "🚗", "#9C27B0"),
    ("Shopping", TransactionKind::Expense, "🛒", "#E91E63"),
    ("Bills", TransactionKind::Expense, "📄", "#F44336"),
    ("Entertainment", TransactionKind::Expense, "🎬", "#673AB7"),
    ("Health", TransactionKind::Expense, "🏥", "#00BCD4"),
];

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    let kind_str: String = row.get(2)?;

    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: TransactionKind::from_str(&kind_str).unwrap_or(TransactionKind::Expense),
        icon: row.get(3)?,
        color: row.get(4)?,
    })
}

impl Database {
    /// Seed the default category set if the table is empty
    pub fn seed_default_categories(&self) -> Result<()> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        for (name, kind, icon, color) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, kind, icon, color) VALUES (?, ?, ?, ?)",
                params![name, kind.as_str(), icon, color],
            )?;
        }

        Ok(())
    }

    /// List all categories
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare("SELECT id, name, kind, icon, color FROM categories ORDER BY id")?;

        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Insert a category, returning its new ID
    pub fn insert_category(&self, category: &NewCategory) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO categories (name, kind, icon, color) VALUES (?, ?, ?, ?)",
            params![
                category.name,
                category.kind.as_str(),
                category.icon,
                category.color,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;

        let result = conn.query_row(
            "SELECT id, name, kind, icon, color FROM categories WHERE id = ?",
            params![id],
            row_to_category,
        );

        match result {
            Ok(cat) => Ok(Some(cat)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
