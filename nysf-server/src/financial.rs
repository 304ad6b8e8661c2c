//! Financial summary totals
//!
//! Totals are never taken from the caller. They are derived from the four
//! input amounts when the input is built, with checked arithmetic.

use nysf_common::db::{FinancialRecord, Money};

/// The four data-entry amounts of a financial summary and their totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinancialInput {
    income_head_office: Money,
    income_external_sources: Money,
    expense_team_sports: Money,
    expense_track_field: Money,
    total_income: Money,
    total_expense: Money,
}

impl FinancialInput {
    /// `None` when either total does not fit
    pub fn new(
        income_head_office: Money,
        income_external_sources: Money,
        expense_team_sports: Money,
        expense_track_field: Money,
    ) -> Option<Self> {
        Some(FinancialInput {
            income_head_office,
            income_external_sources,
            expense_team_sports,
            expense_track_field,
            total_income: income_head_office.checked_add(income_external_sources)?,
            total_expense: expense_team_sports.checked_add(expense_track_field)?,
        })
    }

    pub fn total_income(&self) -> Money {
        self.total_income
    }

    pub fn total_expense(&self) -> Money {
        self.total_expense
    }

    /// Stored row carrying the computed totals
    pub fn into_record(self, submission_id: i64) -> FinancialRecord {
        FinancialRecord {
            submission_id,
            income_head_office: self.income_head_office,
            income_external_sources: self.income_external_sources,
            total_income: self.total_income,
            expense_team_sports: self.expense_team_sports,
            expense_track_field: self.expense_track_field,
            total_expense: self.total_expense,
        }
    }
}
