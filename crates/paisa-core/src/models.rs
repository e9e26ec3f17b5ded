//! Domain models for Paisa

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An income or expense transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A new transaction (before DB insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
}

/// Where a bill came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillSource {
    /// Entered by hand
    #[default]
    Manual,
    /// Extracted from a credit-card bill email
    Email,
    /// Extracted from a banking SMS
    Sms,
    /// Materialized from a recurring template
    Recurring,
}

impl BillSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Recurring => "recurring",
        }
    }
}

impl std::str::FromStr for BillSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "recurring" => Ok(Self::Recurring),
            _ => Err(format!("Unknown bill source: {}", s)),
        }
    }
}

impl std::fmt::Display for BillSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bill: either a recurring template or a payable instance
///
/// Templates have `is_recurring = true` and no `parent_bill_id`; instances
/// reference their template through `parent_bill_id`. At most one instance
/// exists per (template, calendar month) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub is_paid: bool,
    pub category: String,
    pub source: BillSource,
    pub is_recurring: bool,
    /// Day of month (1-31) on which instances fall due; templates only
    pub recurring_day: Option<u32>,
    /// Template this instance was materialized from
    pub parent_bill_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Whether this row is a recurring template rather than a payable instance
    pub fn is_template(&self) -> bool {
        self.is_recurring && self.parent_bill_id.is_none()
    }
}

/// A new bill (before DB insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewBill {
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default = "default_bill_category")]
    pub category: String,
    #[serde(default)]
    pub source: BillSource,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_day: Option<u32>,
    #[serde(default)]
    pub parent_bill_id: Option<i64>,
}

fn default_bill_category() -> String {
    "Credit Card".to_string()
}

/// UPI payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpiStatus {
    #[default]
    Completed,
    Pending,
    Failed,
}

impl UpiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for UpiStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown UPI status: {}", s)),
        }
    }
}

impl std::fmt::Display for UpiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded UPI payment (informational; not part of the metrics engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpiPayment {
    pub id: i64,
    pub amount: f64,
    pub recipient: String,
    pub upi_id: String,
    pub date: NaiveDate,
    pub status: UpiStatus,
    pub created_at: DateTime<Utc>,
}

/// A new UPI payment (before DB insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewUpiPayment {
    pub amount: f64,
    pub recipient: String,
    pub upi_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: UpiStatus,
}

/// A transaction category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: TransactionKind,
    pub icon: String,
    pub color: String,
}

/// A new category (before DB insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub kind: TransactionKind,
    #[serde(default = "default_category_icon")]
    pub icon: String,
    #[serde(default = "default_category_color")]
    pub color: String,
}

fn default_category_icon() -> String {
    "💰".to_string()
}

fn default_category_color() -> String {
    "#4CAF50".to_string()
}

/// A calendar month (year + month), used for all month-scoped queries
///
/// Replaces string-prefix matching on date columns with a real half-open
/// date range: `[first_day, next.first_day)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// The month containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of this month
    pub fn first_day(&self) -> NaiveDate {
        // Constructed from validated year/month, day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("year-month produces a valid first day")
    }

    /// The following calendar month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of days in this month
    pub fn days_in_month(&self) -> u32 {
        (self.next().first_day() - self.first_day()).num_days() as u32
    }

    /// Combine with a day of month, clamping to the last valid day
    ///
    /// Day 31 in February yields Feb 28 (or 29 in leap years); the instance
    /// stays inside the month rather than rolling into the next one.
    pub fn with_day_clamped(&self, day: u32) -> NaiveDate {
        let clamped = day.clamp(1, self.days_in_month());
        NaiveDate::from_ymd_opt(self.year, self.month, clamped)
            .expect("clamped day is valid for this month")
    }

    /// Half-open date range covering this month
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.first_day(), self.next().first_day())
    }
}

impl std::str::FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month (expected YYYY-MM): {}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in month: {}", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("Month out of range: {}", s));
        }
        Ok(Self { year, month })
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
