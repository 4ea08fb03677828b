//! # Transaction Orchestrator
//!
//! Front door for the ledger core. Takes raw Thai text or pre-validated
//! field sets, runs the parse -> resolve -> guard -> cost -> append pipeline,
//! and renders localized responses. All writes are appends; nothing here
//! rewrites history.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;

use crate::cache::NameIndexCache;
use crate::command_parser::{CommandParser, Intent, ParsedCommand};
use crate::cost_engine::{self, DEFAULT_TARGET_MARGIN};
use crate::duplicate_guard;
use crate::errors::LedgerError;
use crate::expense_categorizer;
use crate::localization::{t, t_args};
use crate::model::{EntityKind, Expense, Ingredient, Purchase};
use crate::resolver::{self, Resolution, Suggestion};
use crate::store::LedgerStore;
use crate::units::{CanonicalUnit, UnitNormalizer};

/// Tunables for a single orchestrator instance
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Wall-clock budget for one submission; exceeding it fails with a
    /// timeout instead of a half-written transaction
    pub deadline: Duration,
    /// Target margin fraction for suggested menu prices
    pub target_margin: f64,
    /// Unit assumed when the text names none
    pub default_unit: CanonicalUnit,
    /// Recorded as created_by on ledger rows
    pub actor: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(10),
            target_margin: DEFAULT_TARGET_MARGIN,
            default_unit: CanonicalUnit::Piece,
            actor: "cli".to_string(),
        }
    }
}

/// Validated input for a purchase submission
#[derive(Debug, Clone)]
pub struct PurchaseFields {
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub total_price: f64,
    pub actual_yield: Option<f64>,
    pub supplier: Option<String>,
}

/// Validated input for an expense submission
#[derive(Debug, Clone)]
pub struct ExpenseFields {
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
}

/// What happened to a purchase submission
#[derive(Debug, Clone)]
pub enum PurchaseOutcome {
    Recorded {
        purchase: Purchase,
        /// True when the ingredient was auto-provisioned on first sight
        provisioned: bool,
    },
    /// A near-identical row already exists in the lookback window
    Duplicate { existing_lot: String },
    /// The name almost matched known ingredients; user must pick or confirm
    NeedsConfirmation { suggestions: Vec<Suggestion> },
}

/// What happened to an expense submission
#[derive(Debug, Clone)]
pub enum ExpenseOutcome {
    Recorded(Expense),
    Duplicate { existing_id: String },
}

/// Uniform response for the text command surface
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    /// Localized, user-facing message
    pub message: String,
    /// Structured payload for callers that want more than the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Stable machine-readable error code, if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl CommandResponse {
    fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
            data: None,
            suggestions: Vec::new(),
            error: None,
        }
    }

    fn rejected(message: String) -> Self {
        Self {
            success: false,
            message,
            data: None,
            suggestions: Vec::new(),
            error: None,
        }
    }

    fn failed(error: &LedgerError, message: String) -> Self {
        Self {
            success: false,
            message,
            data: None,
            suggestions: Vec::new(),
            error: Some(error.code()),
        }
    }

    fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

pub struct Orchestrator<'a, S: LedgerStore> {
    store: &'a S,
    cache: &'a NameIndexCache,
    parser: CommandParser,
    normalizer: UnitNormalizer,
    config: OrchestratorConfig,
}

impl<'a, S: LedgerStore> Orchestrator<'a, S> {
    pub fn new(store: &'a S, cache: &'a NameIndexCache) -> Self {
        Self::with_config(store, cache, OrchestratorConfig::default())
    }

    pub fn with_config(store: &'a S, cache: &'a NameIndexCache, config: OrchestratorConfig) -> Self {
        Self {
            store,
            cache,
            parser: CommandParser::new(),
            normalizer: UnitNormalizer::new(config.default_unit),
            config,
        }
    }

    /// Record a purchase, provisioning the ingredient if it is new
    pub fn submit_purchase(&self, fields: PurchaseFields) -> Result<PurchaseOutcome, LedgerError> {
        let started = Instant::now();
        validate_positive("quantity", fields.quantity, "validation-bad-quantity")?;
        validate_positive("total_price", fields.total_price, "validation-bad-amount")?;
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation {
                field: "name".to_string(),
                reason: t("validation-missing-name"),
            });
        }

        let names = self
            .cache
            .get_or_refresh(EntityKind::Ingredient, || self.store.ingredient_names())?;

        let (ingredient, provisioned) = match resolver::resolve(name, &names) {
            Resolution::Match { name: canonical, .. } => {
                let found = self
                    .store
                    .find_ingredient(&canonical)?
                    .ok_or_else(|| LedgerError::IngredientNotFound(canonical.clone()))?;
                (found, false)
            }
            Resolution::Suggestions(suggestions) => {
                return Ok(PurchaseOutcome::NeedsConfirmation { suggestions });
            }
            Resolution::NotFound => {
                // First sighting with nothing even close: provision with the
                // purchase's own unit as both buy and stock unit
                let unit = self.normalizer.normalize(fields.unit.as_deref());
                let ingredient = Ingredient::new(name).with_units(unit, unit);
                self.store.insert_ingredient(&ingredient)?;
                self.cache.invalidate(EntityKind::Ingredient);
                info!("Auto-provisioned ingredient '{name}'");
                (ingredient, true)
            }
        };

        let since = Utc::now() - duplicate_guard::default_lookback();
        let recent = self.store.recent_purchases(since)?;
        if let Some(existing) = duplicate_guard::find_duplicate_purchase(
            &recent,
            &ingredient.id,
            fields.quantity,
            fields.total_price,
        ) {
            return Ok(PurchaseOutcome::Duplicate {
                existing_lot: existing.lot_id.clone(),
            });
        }

        let unit = self.normalizer.normalize(fields.unit.as_deref());
        let unit_price = cost_engine::unit_price(fields.total_price, fields.quantity)?;
        let derivation = cost_engine::stock_equivalent(
            fields.quantity,
            fields.total_price,
            ingredient.buy_to_stock_ratio,
            fields.actual_yield,
        );

        if started.elapsed() > self.config.deadline {
            warn!("Purchase submission exceeded deadline, aborting before append");
            return Err(LedgerError::Timeout("purchase submission".to_string()));
        }

        let purchase = Purchase {
            date: Utc::now().date_naive(),
            ingredient_id: ingredient.id.clone(),
            ingredient_name: ingredient.name.clone(),
            quantity: fields.quantity,
            unit,
            total_price: fields.total_price,
            unit_price,
            stock_quantity: derivation.stock_quantity,
            cost_per_stock_unit: derivation.cost_per_stock_unit,
            actual_yield: fields.actual_yield,
            supplier: fields.supplier,
            lot_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            created_by: self.config.actor.clone(),
        };
        self.store.append_purchase(&purchase)?;

        Ok(PurchaseOutcome::Recorded {
            purchase,
            provisioned,
        })
    }

    /// Record an expense with an auto-assigned category when none is given
    pub fn submit_expense(&self, fields: ExpenseFields) -> Result<ExpenseOutcome, LedgerError> {
        let started = Instant::now();
        validate_positive("amount", fields.amount, "validation-bad-amount")?;
        let description = fields.description.trim();
        if description.is_empty() {
            return Err(LedgerError::Validation {
                field: "description".to_string(),
                reason: t("validation-missing-description"),
            });
        }

        let since = Utc::now() - duplicate_guard::default_lookback();
        let recent = self.store.recent_expenses(since)?;
        if let Some(existing) =
            duplicate_guard::find_duplicate_expense(&recent, description, fields.amount)
        {
            return Ok(ExpenseOutcome::Duplicate {
                existing_id: existing.id.clone(),
            });
        }

        let category = fields
            .category
            .unwrap_or_else(|| expense_categorizer::categorize(description).to_string());

        if started.elapsed() > self.config.deadline {
            warn!("Expense submission exceeded deadline, aborting before append");
            return Err(LedgerError::Timeout("expense submission".to_string()));
        }

        let expense = Expense {
            id: uuid::Uuid::new_v4().to_string(),
            date: Utc::now().date_naive(),
            description: description.to_string(),
            amount: fields.amount,
            category,
            created_at: Utc::now(),
            created_by: self.config.actor.clone(),
        };
        self.store.append_expense(&expense)?;

        Ok(ExpenseOutcome::Recorded(expense))
    }

    /// Parse and execute one line of Thai text
    pub fn handle_command(&self, text: &str) -> CommandResponse {
        let parsed = self.parser.parse(text);
        debug!("Dispatching intent {:?} for '{text}'", parsed.intent);
        match parsed.intent {
            Intent::Purchase => self.handle_purchase_command(&parsed),
            Intent::Expense => self.handle_expense_command(&parsed),
            Intent::MenuCost => self.handle_menu_cost_command(&parsed),
            Intent::StockCheck => self.handle_stock_check_command(&parsed),
            Intent::Help => CommandResponse::ok(t("help-text")),
            Intent::Unknown => CommandResponse::rejected(t("unknown-command")),
        }
    }

    fn handle_purchase_command(&self, parsed: &ParsedCommand) -> CommandResponse {
        let name = match parsed.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => return CommandResponse::rejected(t("validation-missing-name")),
        };
        let total_price = match parsed.price {
            Some(price) => price,
            None => return CommandResponse::rejected(t("validation-missing-price")),
        };
        if !parsed.price_confident {
            // The price came from a positional fallback; ask before writing
            return CommandResponse::rejected(t_args(
                "confirm-price",
                &[("price", &fmt_num(total_price))],
            ))
            .with_data(json!({
                "name": name,
                "quantity": parsed.quantity.unwrap_or(1.0),
                "unit": parsed.unit,
                "price": total_price,
            }));
        }

        let fields = PurchaseFields {
            name,
            quantity: parsed.quantity.unwrap_or(1.0),
            unit: parsed.unit.clone(),
            total_price,
            actual_yield: None,
            supplier: None,
        };
        match self.submit_purchase(fields) {
            Ok(PurchaseOutcome::Recorded {
                purchase,
                provisioned,
            }) => {
                let mut message = t_args(
                    "purchase-recorded",
                    &[
                        ("name", &purchase.ingredient_name),
                        ("quantity", &fmt_num(purchase.quantity)),
                        ("unit", purchase.unit.thai_name()),
                        ("price", &fmt_num(purchase.total_price)),
                    ],
                );
                if provisioned {
                    message = format!(
                        "{}\n{}",
                        t_args("purchase-provisioned", &[("name", &purchase.ingredient_name)]),
                        message
                    );
                }
                CommandResponse::ok(message).with_data(
                    serde_json::to_value(&purchase).unwrap_or(serde_json::Value::Null),
                )
            }
            Ok(PurchaseOutcome::Duplicate { existing_lot }) => {
                let name = parsed.name.as_deref().unwrap_or_default();
                CommandResponse::rejected(t_args("duplicate-purchase", &[("name", name)]))
                    .with_data(json!({ "existing_lot": existing_lot }))
            }
            Ok(PurchaseOutcome::NeedsConfirmation { suggestions }) => {
                let names: Vec<String> = suggestions.into_iter().map(|s| s.name).collect();
                let mut response = CommandResponse::rejected(t_args(
                    "needs-confirmation",
                    &[
                        ("name", parsed.name.as_deref().unwrap_or_default()),
                        ("suggestions", &names.join(", ")),
                    ],
                ));
                response.suggestions = names;
                response
            }
            Err(err) => self.render_error(err),
        }
    }

    fn handle_expense_command(&self, parsed: &ParsedCommand) -> CommandResponse {
        let description = match parsed.name.as_deref().filter(|n| !n.is_empty()) {
            Some(description) => description.to_string(),
            None => return CommandResponse::rejected(t("validation-missing-description")),
        };
        let amount = match parsed.price.or(parsed.quantity) {
            Some(amount) => amount,
            None => return CommandResponse::rejected(t("validation-missing-price")),
        };
        if parsed.price.is_some() && !parsed.price_confident {
            // The amount came from a positional fallback; ask before writing
            return CommandResponse::rejected(t_args(
                "confirm-price",
                &[("price", &fmt_num(amount))],
            ))
            .with_data(json!({
                "description": description,
                "amount": amount,
            }));
        }

        let fields = ExpenseFields {
            description,
            amount,
            category: parsed.category.clone(),
        };
        match self.submit_expense(fields) {
            Ok(ExpenseOutcome::Recorded(expense)) => CommandResponse::ok(t_args(
                "expense-recorded",
                &[
                    ("description", &expense.description),
                    ("amount", &fmt_num(expense.amount)),
                    ("category", &expense.category),
                ],
            ))
            .with_data(serde_json::to_value(&expense).unwrap_or(serde_json::Value::Null)),
            Ok(ExpenseOutcome::Duplicate { existing_id }) => {
                let description = parsed.name.as_deref().unwrap_or_default();
                CommandResponse::rejected(t_args(
                    "duplicate-expense",
                    &[("description", description)],
                ))
                .with_data(json!({ "existing_id": existing_id }))
            }
            Err(err) => self.render_error(err),
        }
    }

    fn handle_menu_cost_command(&self, parsed: &ParsedCommand) -> CommandResponse {
        let name = match parsed.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => return CommandResponse::rejected(t("validation-missing-name")),
        };

        let names = match self
            .cache
            .get_or_refresh(EntityKind::Menu, || self.store.menu_names())
        {
            Ok(names) => names,
            Err(err) => return self.render_error(LedgerError::from(err)),
        };

        let canonical = match resolver::resolve(name, &names) {
            Resolution::Match { name, .. } => name,
            Resolution::Suggestions(suggestions) => {
                let names: Vec<String> = suggestions.into_iter().map(|s| s.name).collect();
                let mut response = CommandResponse::rejected(t_args(
                    "needs-confirmation",
                    &[("name", name), ("suggestions", &names.join(", "))],
                ));
                response.suggestions = names;
                return response;
            }
            Resolution::NotFound => {
                return CommandResponse::rejected(t_args("menu-not-found", &[("name", name)]));
            }
        };

        match self.cost_menu(&canonical) {
            Ok(Some((cost, suggested))) => CommandResponse::ok(t_args(
                "menu-cost-result",
                &[
                    ("name", &canonical),
                    ("cost", &format!("{cost:.2}")),
                    ("price", &format!("{suggested:.2}")),
                ],
            ))
            .with_data(json!({
                "menu": canonical,
                "cost_per_serve": cost,
                "suggested_price": suggested,
            })),
            Ok(None) => CommandResponse::rejected(t_args("menu-not-found", &[("name", &canonical)])),
            Err(err) => self.render_error(err),
        }
    }

    fn cost_menu(&self, menu_name: &str) -> Result<Option<(f64, f64)>, LedgerError> {
        let menu = match self.store.find_menu(menu_name)? {
            Some(menu) => menu,
            None => return Ok(None),
        };
        let lines = self.store.recipe_lines(&menu.id)?;

        // Pre-fetch unit costs so storage errors surface before the math runs
        let mut costs: HashMap<String, f64> = HashMap::new();
        for line in &lines {
            if let Some(cost) = self.store.current_unit_cost(&line.ingredient_name)? {
                costs.insert(line.ingredient_name.clone(), cost);
            }
        }

        let costing = cost_engine::menu_cost(&lines, |name| costs.get(name).copied())?;
        let suggested = cost_engine::suggested_price(costing.total_cost, self.config.target_margin)?;
        Ok(Some((costing.total_cost, suggested)))
    }

    fn handle_stock_check_command(&self, parsed: &ParsedCommand) -> CommandResponse {
        match parsed.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => {
                let names = match self
                    .cache
                    .get_or_refresh(EntityKind::Ingredient, || self.store.ingredient_names())
                {
                    Ok(names) => names,
                    Err(err) => return self.render_error(LedgerError::from(err)),
                };
                let canonical = match resolver::resolve(name, &names) {
                    Resolution::Match { name, .. } => name,
                    Resolution::Suggestions(suggestions) => {
                        let names: Vec<String> =
                            suggestions.into_iter().map(|s| s.name).collect();
                        let mut response = CommandResponse::rejected(t_args(
                            "needs-confirmation",
                            &[("name", name), ("suggestions", &names.join(", "))],
                        ));
                        response.suggestions = names;
                        return response;
                    }
                    Resolution::NotFound => {
                        return CommandResponse::rejected(t_args(
                            "stock-not-found",
                            &[("name", name)],
                        ))
                    }
                };
                match self.store.find_ingredient(&canonical) {
                    Ok(Some(ingredient)) => {
                        let mut message = stock_line(&ingredient);
                        if ingredient.is_low_stock() {
                            message = format!("{message} {}", t("stock-low-flag"));
                        }
                        CommandResponse::ok(message).with_data(json!({
                            "name": ingredient.name,
                            "stock": ingredient.stock,
                            "unit": ingredient.stock_unit.thai_name(),
                            "low_stock": ingredient.is_low_stock(),
                        }))
                    }
                    Ok(None) => CommandResponse::rejected(t_args(
                        "stock-not-found",
                        &[("name", &canonical)],
                    )),
                    Err(err) => self.render_error(LedgerError::from(err)),
                }
            }
            None => match self.store.all_ingredients() {
                Ok(ingredients) if ingredients.is_empty() => {
                    CommandResponse::ok(t("stock-empty"))
                }
                Ok(ingredients) => {
                    let mut report = vec![t("stock-header")];
                    for ingredient in &ingredients {
                        let mut line = stock_line(ingredient);
                        if ingredient.is_low_stock() {
                            line = format!("{line} {}", t("stock-low-flag"));
                        }
                        report.push(line);
                    }
                    let data: Vec<serde_json::Value> = ingredients
                        .iter()
                        .map(|i| {
                            json!({
                                "name": i.name,
                                "stock": i.stock,
                                "unit": i.stock_unit.thai_name(),
                                "low_stock": i.is_low_stock(),
                            })
                        })
                        .collect();
                    CommandResponse::ok(report.join("\n")).with_data(json!(data))
                }
                Err(err) => self.render_error(LedgerError::from(err)),
            },
        }
    }

    fn render_error(&self, err: LedgerError) -> CommandResponse {
        warn!("Command failed: {err}");
        let message = match &err {
            LedgerError::Validation { reason, .. } => reason.clone(),
            LedgerError::DivisionByZero(_) => t("error-division-by-zero"),
            LedgerError::InvalidMargin(_) => t("error-invalid-margin"),
            LedgerError::IngredientNotFound(name) => {
                t_args("error-ingredient-not-found", &[("name", name)])
            }
            LedgerError::Persistence(_) => t("error-persistence"),
            LedgerError::Timeout(_) => t("error-timeout"),
        };
        CommandResponse::failed(&err, message)
    }
}

fn validate_positive(field: &str, value: f64, message_key: &str) -> Result<(), LedgerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::Validation {
            field: field.to_string(),
            reason: t(message_key),
        })
    }
}

fn stock_line(ingredient: &Ingredient) -> String {
    t_args(
        "stock-item",
        &[
            ("name", &ingredient.name),
            ("stock", &fmt_num(ingredient.stock)),
            ("unit", ingredient.stock_unit.thai_name()),
        ],
    )
}

/// Render a number without trailing zeros ("5" rather than "5.00")
fn fmt_num(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::model::{Menu, RecipeLine};
    use crate::store::SqliteStore;
    use rusqlite::Connection;

    fn setup() -> (SqliteStore, NameIndexCache) {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let store = SqliteStore::new(conn).expect("schema");
        let cache = NameIndexCache::new(DEFAULT_TTL);
        (store, cache)
    }

    #[test]
    fn test_submit_purchase_provisions_new_ingredient() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        let outcome = orchestrator
            .submit_purchase(PurchaseFields {
                name: "กุ้ง".to_string(),
                quantity: 5.0,
                unit: Some("โล".to_string()),
                total_price: 500.0,
                actual_yield: None,
                supplier: None,
            })
            .expect("submission succeeds");

        match outcome {
            PurchaseOutcome::Recorded {
                purchase,
                provisioned,
            } => {
                assert!(provisioned);
                assert_eq!(purchase.ingredient_name, "กุ้ง");
                assert_eq!(purchase.unit_price, 100.0);
                assert_eq!(purchase.stock_quantity, 5.0);
                assert_eq!(purchase.cost_per_stock_unit, 100.0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let ingredient = store.find_ingredient("กุ้ง").unwrap().unwrap();
        assert_eq!(ingredient.stock, 5.0);
        assert_eq!(ingredient.buy_unit, CanonicalUnit::Kilogram);
    }

    #[test]
    fn test_duplicate_purchase_is_blocked() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);
        let fields = PurchaseFields {
            name: "กุ้ง".to_string(),
            quantity: 5.0,
            unit: Some("โล".to_string()),
            total_price: 500.0,
            actual_yield: None,
            supplier: None,
        };

        let first = orchestrator.submit_purchase(fields.clone()).unwrap();
        assert!(matches!(first, PurchaseOutcome::Recorded { .. }));

        let second = orchestrator.submit_purchase(fields).unwrap();
        assert!(matches!(second, PurchaseOutcome::Duplicate { .. }));

        // Only the first append landed
        let ingredient = store.find_ingredient("กุ้ง").unwrap().unwrap();
        assert_eq!(ingredient.stock, 5.0);
    }

    #[test]
    fn test_near_miss_name_needs_confirmation() {
        let (store, cache) = setup();
        store
            .insert_ingredient(&Ingredient::new("น้ำปลา"))
            .unwrap();
        store
            .insert_ingredient(&Ingredient::new("น้ำตาล"))
            .unwrap();
        let orchestrator = Orchestrator::new(&store, &cache);

        let outcome = orchestrator
            .submit_purchase(PurchaseFields {
                name: "น้ำมัน".to_string(),
                quantity: 1.0,
                unit: None,
                total_price: 50.0,
                actual_yield: None,
                supplier: None,
            })
            .unwrap();

        match outcome {
            PurchaseOutcome::NeedsConfirmation { suggestions } => {
                assert!(!suggestions.is_empty());
                assert!(suggestions.len() <= 5);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_submit_expense_auto_categorizes() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        let outcome = orchestrator
            .submit_expense(ExpenseFields {
                description: "ค่าไฟฟ้า".to_string(),
                amount: 1200.0,
                category: None,
            })
            .unwrap();

        match outcome {
            ExpenseOutcome::Recorded(expense) => {
                assert_eq!(expense.category, "สาธารณูปโภค");
                assert_eq!(expense.amount, 1200.0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_expense_near_description_is_blocked() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        orchestrator
            .submit_expense(ExpenseFields {
                description: "ค่าไฟฟ้า".to_string(),
                amount: 1200.0,
                category: None,
            })
            .unwrap();

        let second = orchestrator
            .submit_expense(ExpenseFields {
                description: "ค่าไฟฟ้า".to_string(),
                amount: 1200.5,
                category: None,
            })
            .unwrap();
        assert!(matches!(second, ExpenseOutcome::Duplicate { .. }));
    }

    #[test]
    fn test_validation_rejects_non_positive_amounts() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        let err = orchestrator
            .submit_expense(ExpenseFields {
                description: "ค่าน้ำ".to_string(),
                amount: 0.0,
                category: None,
            })
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION");

        let err = orchestrator
            .submit_purchase(PurchaseFields {
                name: "กุ้ง".to_string(),
                quantity: -1.0,
                unit: None,
                total_price: 100.0,
                actual_yield: None,
                supplier: None,
            })
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[test]
    fn test_handle_purchase_command_end_to_end() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        let response = orchestrator.handle_command("ซื้อกุ้ง 5 โล 500 บาท");
        assert!(response.success, "message was: {}", response.message);
        assert!(response.message.contains("กุ้ง"));
        assert!(response.error.is_none());

        let ingredient = store.find_ingredient("กุ้ง").unwrap().unwrap();
        assert_eq!(ingredient.stock, 5.0);
    }

    #[test]
    fn test_handle_expense_command_end_to_end() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        let response = orchestrator.handle_command("จ่ายค่าไฟ 1200 บาท");
        assert!(response.success, "message was: {}", response.message);
        assert!(response.message.contains("สาธารณูปโภค"));
    }

    #[test]
    fn test_ambiguous_price_asks_for_confirmation() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        // No baht marker on either number; the trailing one is a guess
        let response = orchestrator.handle_command("ซื้อกุ้ง 5 โล 500");
        assert!(!response.success);
        assert!(response.error.is_none());
        assert!(response.data.is_some());

        // Nothing was written
        assert!(store.find_ingredient("กุ้ง").unwrap().is_none());
    }

    #[test]
    fn test_ambiguous_expense_amount_asks_for_confirmation() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        // Two numbers and no baht marker: the trailing 450 is a guess
        let response = orchestrator.handle_command("จ่ายค่าอาหารเลี้ยงพนักงาน 3 คน 450");
        assert!(!response.success);
        assert!(response.error.is_none());
        assert!(response.data.is_some());

        let recent = store
            .recent_expenses(Utc::now() - chrono::Duration::hours(1))
            .unwrap();
        assert!(recent.is_empty(), "guessed amount must not be persisted");
    }

    #[test]
    fn test_stock_check_near_miss_returns_suggestions() {
        let (store, cache) = setup();
        store
            .insert_ingredient(&Ingredient::new("น้ำปลา"))
            .unwrap();
        store
            .insert_ingredient(&Ingredient::new("น้ำตาล"))
            .unwrap();
        let orchestrator = Orchestrator::new(&store, &cache);

        let response = orchestrator.handle_command("น้ำมันเหลือเท่าไหร่");
        assert!(!response.success);
        assert!(!response.suggestions.is_empty());
        assert!(response.message.contains("น้ำปลา"));
    }

    #[test]
    fn test_stock_check_reports_levels_and_low_flags() {
        let (store, cache) = setup();
        store
            .insert_ingredient(&Ingredient::new("กุ้ง").with_min_stock(10.0))
            .unwrap();
        let orchestrator = Orchestrator::new(&store, &cache);

        orchestrator
            .submit_purchase(PurchaseFields {
                name: "กุ้ง".to_string(),
                quantity: 5.0,
                unit: Some("โล".to_string()),
                total_price: 500.0,
                actual_yield: None,
                supplier: None,
            })
            .unwrap();

        let response = orchestrator.handle_command("กุ้งเหลือเท่าไหร่");
        assert!(response.success, "message was: {}", response.message);
        let data = response.data.expect("stock data");
        assert_eq!(data["stock"], 5.0);
        assert_eq!(data["low_stock"], true);

        let all = orchestrator.handle_command("สต๊อกทั้งหมด");
        assert!(all.success);
        assert!(all.message.contains("กุ้ง"));
    }

    #[test]
    fn test_menu_cost_command() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        // Seed costs through real purchases
        orchestrator
            .submit_purchase(PurchaseFields {
                name: "กุ้ง".to_string(),
                quantity: 5.0,
                unit: Some("โล".to_string()),
                total_price: 50.0,
                actual_yield: None,
                supplier: None,
            })
            .unwrap();
        orchestrator
            .submit_purchase(PurchaseFields {
                name: "พริก".to_string(),
                quantity: 2.0,
                unit: Some("โล".to_string()),
                total_price: 100.0,
                actual_yield: None,
                supplier: None,
            })
            .unwrap();

        store
            .insert_menu(&Menu {
                id: "m1".to_string(),
                name: "ต้มยำกุ้ง".to_string(),
                price: 120.0,
                category: None,
            })
            .unwrap();
        for (name, quantity) in [("กุ้ง", 0.3), ("พริก", 0.1)] {
            store
                .insert_recipe_line(&RecipeLine {
                    menu_id: "m1".to_string(),
                    ingredient_name: name.to_string(),
                    quantity_per_serve: quantity,
                    unit: CanonicalUnit::Kilogram,
                })
                .unwrap();
        }

        let response = orchestrator.handle_command("ต้นทุนเมนูต้มยำกุ้ง");
        assert!(response.success, "message was: {}", response.message);
        let data = response.data.expect("cost data");
        // 0.3 * 10 + 0.1 * 50 = 8.0, suggested at 60% margin = 20.0
        assert_eq!(data["cost_per_serve"], 8.0);
        assert_eq!(data["suggested_price"], 20.0);
    }

    #[test]
    fn test_unknown_and_help_commands() {
        let (store, cache) = setup();
        let orchestrator = Orchestrator::new(&store, &cache);

        let help = orchestrator.handle_command("ช่วยเหลือ");
        assert!(help.success);
        assert!(!help.message.is_empty());

        let unknown = orchestrator.handle_command("อะไรก็ไม่รู้");
        assert!(!unknown.success);
    }
}
