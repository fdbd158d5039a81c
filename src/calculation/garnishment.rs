//! Garnishment prioritization and statutory capping.
//!
//! This module allocates disposable income across concurrent garnishment
//! orders in the federally fixed priority order, applying the statutory
//! caps per class. Orders starved in a period receive zero and are not
//! carried forward here; arrears tracking belongs to the external
//! case-management system.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{GarnishmentLine, GarnishmentOrder};

use super::round_money;

/// Support-order cap: 50% of disposable income with no arrears.
pub const SUPPORT_CAP: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
/// Support-order cap: 65% when in arrears with a single support order.
pub const SUPPORT_CAP_ARREARS_SOLE: Decimal = Decimal::from_parts(65, 0, 0, false, 2);
/// Support-order cap: 60% when in arrears alongside another support order.
pub const SUPPORT_CAP_ARREARS_SHARED: Decimal = Decimal::from_parts(60, 0, 0, false, 2);
/// Cap for every non-support class: 25% of disposable income, reduced by
/// whatever higher-priority orders already took this period.
pub const OTHER_CAP: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Truncates a cap to whole cents; caps never round up.
fn floor_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Allocates disposable income across the given garnishment orders.
///
/// Orders are served strictly by class priority
/// ([`crate::models::GarnishmentKind::priority`]), earliest received first
/// within a class. Support orders share an aggregate cap of 50% of
/// disposable income (65% in arrears with no other support order, 60% in
/// arrears with one); every other order is limited to 25% of disposable
/// income minus everything already withheld this period. The returned lines
/// never sum to more than the disposable income.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::prioritize_garnishments;
/// use payroll_engine::models::{GarnishmentKind, GarnishmentOrder};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let orders = vec![GarnishmentOrder {
///     case_ref: "CS-001".to_string(),
///     kind: GarnishmentKind::ChildSupport,
///     amount_per_period: Decimal::from_str("800.00").unwrap(),
///     in_arrears: false,
///     received: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
/// }];
///
/// let lines = prioritize_garnishments(Decimal::from_str("3397.98").unwrap(), &orders);
/// assert_eq!(lines[0].amount, Decimal::from_str("800.00").unwrap());
/// ```
pub fn prioritize_garnishments(
    disposable_income: Decimal,
    orders: &[GarnishmentOrder],
) -> Vec<GarnishmentLine> {
    let mut sorted: Vec<&GarnishmentOrder> = orders.iter().collect();
    sorted.sort_by(|a, b| {
        (a.kind.priority(), a.received, &a.case_ref).cmp(&(b.kind.priority(), b.received, &b.case_ref))
    });

    if disposable_income <= Decimal::ZERO {
        return sorted
            .into_iter()
            .map(|order| GarnishmentLine {
                case_ref: order.case_ref.clone(),
                kind: order.kind,
                amount: Decimal::ZERO,
            })
            .collect();
    }

    let support_orders = sorted.iter().filter(|o| o.kind.is_support()).count();
    let any_support_arrears = sorted.iter().any(|o| o.kind.is_support() && o.in_arrears);
    let support_pct = if !any_support_arrears {
        SUPPORT_CAP
    } else if support_orders == 1 {
        SUPPORT_CAP_ARREARS_SOLE
    } else {
        SUPPORT_CAP_ARREARS_SHARED
    };

    let support_cap = floor_cents(disposable_income * support_pct);
    let other_cap = floor_cents(disposable_income * OTHER_CAP);

    let mut lines = Vec::with_capacity(sorted.len());
    let mut total_withheld = Decimal::ZERO;
    let mut support_withheld = Decimal::ZERO;

    for order in sorted {
        let class_headroom = if order.kind.is_support() {
            support_cap - support_withheld
        } else {
            other_cap - total_withheld
        };
        let income_headroom = disposable_income - total_withheld;

        let amount = round_money(order.amount_per_period)
            .min(class_headroom)
            .min(income_headroom)
            .max(Decimal::ZERO);

        total_withheld += amount;
        if order.kind.is_support() {
            support_withheld += amount;
        }

        lines.push(GarnishmentLine {
            case_ref: order.case_ref.clone(),
            kind: order.kind,
            amount,
        });
    }

    lines
}
