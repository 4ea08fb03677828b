use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{Expense, Ingredient, Menu, Purchase, RecipeLine};
use crate::units::{CanonicalUnit, UnitNormalizer};

/// Storage seam for the ledger core
///
/// The core only ever appends or reads; it never deletes or rewrites
/// historical rows. Implementations own the tables and the name indexes the
/// resolver matches against.
pub trait LedgerStore {
    fn find_ingredient(&self, name: &str) -> Result<Option<Ingredient>>;
    fn insert_ingredient(&self, ingredient: &Ingredient) -> Result<()>;
    fn ingredient_names(&self) -> Result<Vec<String>>;
    fn all_ingredients(&self) -> Result<Vec<Ingredient>>;

    fn find_menu(&self, name: &str) -> Result<Option<Menu>>;
    fn insert_menu(&self, menu: &Menu) -> Result<()>;
    fn menu_names(&self) -> Result<Vec<String>>;
    fn recipe_lines(&self, menu_id: &str) -> Result<Vec<RecipeLine>>;
    fn insert_recipe_line(&self, line: &RecipeLine) -> Result<()>;
    /// Latest cost per stock unit for an ingredient, if any purchase priced it
    fn current_unit_cost(&self, ingredient_name: &str) -> Result<Option<f64>>;

    /// Append a purchase row and bump the ingredient's stock level
    fn append_purchase(&self, purchase: &Purchase) -> Result<()>;
    fn append_expense(&self, expense: &Expense) -> Result<()>;
    fn recent_purchases(&self, since: DateTime<Utc>) -> Result<Vec<Purchase>>;
    fn recent_expenses(&self, since: DateTime<Utc>) -> Result<Vec<Expense>>;
}

/// SQLite-backed ledger store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a store over an existing connection and initialize the schema
    pub fn new(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open (or create) a database file and initialize the schema
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {path}"))?;
        Self::new(conn)
    }

}

fn init_schema(conn: &Connection) -> Result<()> {
    info!("Initializing ledger schema...");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ingredients (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            stock_unit TEXT NOT NULL,
            buy_unit TEXT NOT NULL,
            buy_to_stock_ratio REAL NOT NULL DEFAULT 1,
            min_stock REAL NOT NULL DEFAULT 0,
            stock REAL NOT NULL DEFAULT 0
        )",
        [],
    )
    .context("Failed to create ingredients table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS purchases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            ingredient_id TEXT NOT NULL,
            ingredient_name TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit TEXT NOT NULL,
            total_price REAL NOT NULL,
            unit_price REAL NOT NULL,
            stock_quantity REAL NOT NULL,
            cost_per_stock_unit REAL NOT NULL,
            actual_yield REAL,
            supplier TEXT,
            lot_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            created_by TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create purchases table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL,
            created_by TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create expenses table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS menus (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            price REAL NOT NULL,
            category TEXT
        )",
        [],
    )
    .context("Failed to create menus table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS recipe_lines (
            menu_id TEXT NOT NULL,
            ingredient_name TEXT NOT NULL,
            quantity_per_serve REAL NOT NULL,
            unit TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create recipe_lines table")?;

    info!("Ledger schema initialized");
    Ok(())
}

fn unit_from_db(token: &str) -> CanonicalUnit {
    // Tokens were written by CanonicalUnit::token(); unknown tokens from
    // manual edits degrade to the default unit
    UnitNormalizer::default().normalize(Some(token))
}

fn ingredient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get(0)?,
        name: row.get(1)?,
        stock_unit: unit_from_db(&row.get::<_, String>(2)?),
        buy_unit: unit_from_db(&row.get::<_, String>(3)?),
        buy_to_stock_ratio: row.get(4)?,
        min_stock: row.get(5)?,
        stock: row.get(6)?,
    })
}

fn purchase_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Purchase> {
    Ok(Purchase {
        date: row
            .get::<_, String>(0)?
            .parse()
            .unwrap_or_else(|_| Utc::now().date_naive()),
        ingredient_id: row.get(1)?,
        ingredient_name: row.get(2)?,
        quantity: row.get(3)?,
        unit: unit_from_db(&row.get::<_, String>(4)?),
        total_price: row.get(5)?,
        unit_price: row.get(6)?,
        stock_quantity: row.get(7)?,
        cost_per_stock_unit: row.get(8)?,
        actual_yield: row.get(9)?,
        supplier: row.get(10)?,
        lot_id: row.get(11)?,
        created_at: row
            .get::<_, String>(12)?
            .parse()
            .unwrap_or_else(|_| Utc::now()),
        created_by: row.get(13)?,
    })
}

impl LedgerStore for SqliteStore {
    fn find_ingredient(&self, name: &str) -> Result<Option<Ingredient>> {
        self.conn
            .query_row(
                "SELECT id, name, stock_unit, buy_unit, buy_to_stock_ratio, min_stock, stock
                 FROM ingredients WHERE name = ?1 COLLATE NOCASE",
                params![name],
                ingredient_from_row,
            )
            .optional()
            .context("Failed to read ingredient")
    }

    fn insert_ingredient(&self, ingredient: &Ingredient) -> Result<()> {
        info!("Provisioning ingredient '{}'", ingredient.name);
        self.conn
            .execute(
                "INSERT INTO ingredients (id, name, stock_unit, buy_unit, buy_to_stock_ratio, min_stock, stock)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    ingredient.id,
                    ingredient.name,
                    ingredient.stock_unit.token(),
                    ingredient.buy_unit.token(),
                    ingredient.buy_to_stock_ratio,
                    ingredient.min_stock,
                    ingredient.stock,
                ],
            )
            .context("Failed to insert ingredient")?;
        Ok(())
    }

    fn ingredient_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM ingredients ORDER BY name")
            .context("Failed to prepare ingredient name index")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn all_ingredients(&self) -> Result<Vec<Ingredient>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, stock_unit, buy_unit, buy_to_stock_ratio, min_stock, stock
             FROM ingredients ORDER BY name",
        )?;
        let rows = stmt
            .query_map([], ingredient_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn find_menu(&self, name: &str) -> Result<Option<Menu>> {
        self.conn
            .query_row(
                "SELECT id, name, price, category FROM menus WHERE name = ?1 COLLATE NOCASE",
                params![name],
                |row| {
                    Ok(Menu {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        price: row.get(2)?,
                        category: row.get(3)?,
                    })
                },
            )
            .optional()
            .context("Failed to read menu")
    }

    fn insert_menu(&self, menu: &Menu) -> Result<()> {
        info!("Registering menu '{}'", menu.name);
        self.conn
            .execute(
                "INSERT INTO menus (id, name, price, category) VALUES (?1, ?2, ?3, ?4)",
                params![menu.id, menu.name, menu.price, menu.category],
            )
            .context("Failed to insert menu")?;
        Ok(())
    }

    fn menu_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM menus ORDER BY name")
            .context("Failed to prepare menu name index")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn recipe_lines(&self, menu_id: &str) -> Result<Vec<RecipeLine>> {
        let mut stmt = self.conn.prepare(
            "SELECT menu_id, ingredient_name, quantity_per_serve, unit
             FROM recipe_lines WHERE menu_id = ?1",
        )?;
        let lines = stmt
            .query_map(params![menu_id], |row| {
                Ok(RecipeLine {
                    menu_id: row.get(0)?,
                    ingredient_name: row.get(1)?,
                    quantity_per_serve: row.get(2)?,
                    unit: unit_from_db(&row.get::<_, String>(3)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lines)
    }

    fn insert_recipe_line(&self, line: &RecipeLine) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO recipe_lines (menu_id, ingredient_name, quantity_per_serve, unit)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    line.menu_id,
                    line.ingredient_name,
                    line.quantity_per_serve,
                    line.unit.token(),
                ],
            )
            .context("Failed to insert recipe line")?;
        Ok(())
    }

    fn current_unit_cost(&self, ingredient_name: &str) -> Result<Option<f64>> {
        self.conn
            .query_row(
                "SELECT cost_per_stock_unit FROM purchases
                 WHERE ingredient_name = ?1 COLLATE NOCASE
                 ORDER BY created_at DESC LIMIT 1",
                params![ingredient_name],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read current unit cost")
    }

    fn append_purchase(&self, purchase: &Purchase) -> Result<()> {
        info!(
            "Appending purchase: {} x{} {} for {} (lot {})",
            purchase.ingredient_name,
            purchase.quantity,
            purchase.unit.token(),
            purchase.total_price,
            purchase.lot_id
        );
        self.conn
            .execute(
                "INSERT INTO purchases (date, ingredient_id, ingredient_name, quantity, unit,
                    total_price, unit_price, stock_quantity, cost_per_stock_unit, actual_yield,
                    supplier, lot_id, created_at, created_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    purchase.date.to_string(),
                    purchase.ingredient_id,
                    purchase.ingredient_name,
                    purchase.quantity,
                    purchase.unit.token(),
                    purchase.total_price,
                    purchase.unit_price,
                    purchase.stock_quantity,
                    purchase.cost_per_stock_unit,
                    purchase.actual_yield,
                    purchase.supplier,
                    purchase.lot_id,
                    purchase.created_at.to_rfc3339(),
                    purchase.created_by,
                ],
            )
            .context("Failed to append purchase")?;

        // Single writer: the stock bump rides in the same call
        self.conn
            .execute(
                "UPDATE ingredients SET stock = stock + ?1 WHERE id = ?2",
                params![purchase.stock_quantity, purchase.ingredient_id],
            )
            .context("Failed to update stock level")?;
        Ok(())
    }

    fn append_expense(&self, expense: &Expense) -> Result<()> {
        info!(
            "Appending expense: '{}' {} ({})",
            expense.description, expense.amount, expense.category
        );
        self.conn
            .execute(
                "INSERT INTO expenses (id, date, description, amount, category, created_at, created_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    expense.id,
                    expense.date.to_string(),
                    expense.description,
                    expense.amount,
                    expense.category,
                    expense.created_at.to_rfc3339(),
                    expense.created_by,
                ],
            )
            .context("Failed to append expense")?;
        Ok(())
    }

    fn recent_purchases(&self, since: DateTime<Utc>) -> Result<Vec<Purchase>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, ingredient_id, ingredient_name, quantity, unit, total_price,
                    unit_price, stock_quantity, cost_per_stock_unit, actual_yield, supplier,
                    lot_id, created_at, created_by
             FROM purchases WHERE created_at >= ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map(params![since.to_rfc3339()], purchase_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn recent_expenses(&self, since: DateTime<Utc>) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, description, amount, category, created_at, created_by
             FROM expenses WHERE created_at >= ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map(params![since.to_rfc3339()], |row| {
                Ok(Expense {
                    id: row.get(0)?,
                    date: row
                        .get::<_, String>(1)?
                        .parse()
                        .unwrap_or_else(|_| Utc::now().date_naive()),
                    description: row.get(2)?,
                    amount: row.get(3)?,
                    category: row.get(4)?,
                    created_at: row
                        .get::<_, String>(5)?
                        .parse()
                        .unwrap_or_else(|_| Utc::now()),
                    created_by: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
