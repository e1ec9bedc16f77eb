use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of the payroll-by-month lookup.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PayrollQuery {
    pub payroll_month: String,
    pub payroll_year: String,
    pub employee_id: Value,
}

impl PayrollQuery {
    pub fn new(employee_id: Value, month: u32, year: i32) -> Self {
        Self {
            payroll_month: month.to_string(),
            payroll_year: year.to_string(),
            employee_id,
        }
    }
}

/// A payroll record. Field names follow the backend.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Payslip {
    fields: Map<String, Value>,
}

const ALLOWANCES: &[&str] = &[
    "allowance1",
    "allowance2",
    "allowance3",
    "allowance4",
    "allowance5",
];

const DEDUCTIONS: &[&str] = &[
    "deduction1",
    "deduction2",
    "deduction3",
    "deduction4",
    "sdl",
    "loan_amount",
    "income_tax_amount",
    "pay_cdac",
    "cpf_employee",
];

/// Derived payslip amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PayslipTotals {
    /// Basic pay plus allowances.
    pub gross_pay: f64,
    pub total_deductions: f64,
    /// Gross pay plus reimbursement and director fee, minus deductions.
    pub net_pay: f64,
}

impl Payslip {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field)?.as_str()
    }

    /// Numeric field. Strings contribute their leading number (`"1000.00 SGD"`
    /// is 1000); anything without one is 0.
    pub fn amount(&self, field: &str) -> f64 {
        match self.fields.get(field) {
            Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
            Some(Value::String(raw)) => leading_number(raw).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn employee_name(&self) -> Option<&str> {
        self.text("employee_name")
    }

    /// Date part of `generated_date`, without any time component.
    pub fn generated_date(&self) -> Option<&str> {
        let raw = self.text("generated_date")?;
        raw.split('T').next()
    }

    pub fn totals(&self) -> PayslipTotals {
        let sum = |fields: &[&str]| fields.iter().map(|field| self.amount(field)).sum::<f64>();
        let gross_pay = self.amount("basic_pay") + sum(ALLOWANCES);
        let total_deductions = sum(DEDUCTIONS);
        let net_pay = self.amount("reimbursement") + self.amount("director_fee") + gross_pay
            - total_deductions;
        PayslipTotals {
            gross_pay,
            total_deductions,
            net_pay,
        }
    }
}

/// Longest decimal prefix of `raw` after leading whitespace, if any.
fn leading_number(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(&byte) = bytes.get(end) {
        match byte {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    text[..end].trim_end_matches('.').parse().ok()
}

/// The month preceding `today`, as `(month, year)`.
///
/// January yields December of the same year, matching how the payroll
/// screen picks its default selection.
pub fn previous_month(today: NaiveDate) -> (u32, i32) {
    match today.month() {
        1 => (12, today.year()),
        month => (month - 1, today.year()),
    }
}
