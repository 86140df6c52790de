//! Finance Repository (read-only aggregates)

use std::collections::BTreeMap;

use super::RepoResult;
use super::payment::PAYMENT_COLUMNS;
use chrono_tz::Tz;
use shared::models::{
    DailyRevenue, FinanceSummary, MethodBreakdown, Payment, PaymentMethod, PaymentStatus,
    StatusCount,
};
use sqlx::SqlitePool;

/// Reporting window `[from_ms, to_ms)` plus the labels echoed back
#[derive(Debug, Clone)]
pub struct Period {
    pub from: String,
    pub to: String,
    pub from_ms: i64,
    pub to_ms: i64,
}

/// Revenue summary; paid payments count by `paid_at`, everything else by
/// creation / booking time
pub async fn summary(pool: &SqlitePool, period: &Period, tz: Tz) -> RepoResult<FinanceSummary> {
    let (revenue_total, payment_count): (f64, i64) = sqlx::query_as(
        "SELECT TOTAL(amount), COUNT(*) FROM payment WHERE status = 'paid' AND paid_at >= ?1 AND paid_at < ?2",
    )
    .bind(period.from_ms)
    .bind(period.to_ms)
    .fetch_one(pool)
    .await?;

    let by_method = sqlx::query_as::<_, MethodBreakdown>(
        "SELECT method, COUNT(*) AS count, TOTAL(amount) AS total FROM payment \
         WHERE status = 'paid' AND paid_at >= ?1 AND paid_at < ?2 GROUP BY method ORDER BY total DESC",
    )
    .bind(period.from_ms)
    .bind(period.to_ms)
    .fetch_all(pool)
    .await?;

    let pending_amount: f64 = sqlx::query_scalar(
        "SELECT TOTAL(amount) FROM payment WHERE status = 'pending' AND created_at >= ?1 AND created_at < ?2",
    )
    .bind(period.from_ms)
    .bind(period.to_ms)
    .fetch_one(pool)
    .await?;

    let reservations_by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM reservation WHERE starts_at >= ?1 AND starts_at < ?2 GROUP BY status ORDER BY status",
    )
    .bind(period.from_ms)
    .bind(period.to_ms)
    .fetch_all(pool)
    .await?;

    let orders_by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM pos_order WHERE created_at >= ?1 AND created_at < ?2 GROUP BY status ORDER BY status",
    )
    .bind(period.from_ms)
    .bind(period.to_ms)
    .fetch_all(pool)
    .await?;

    // grouped in Rust: the business day depends on the timezone, not UTC
    let paid: Vec<(i64, f64)> = sqlx::query_as(
        "SELECT paid_at, amount FROM payment WHERE status = 'paid' AND paid_at >= ?1 AND paid_at < ?2",
    )
    .bind(period.from_ms)
    .bind(period.to_ms)
    .fetch_all(pool)
    .await?;
    let daily = daily_series(&paid, tz);

    let average_payment = if payment_count > 0 {
        crate::money::to_f64(
            crate::money::to_decimal(revenue_total) / rust_decimal::Decimal::from(payment_count),
        )
    } else {
        0.0
    };

    Ok(FinanceSummary {
        from: period.from.clone(),
        to: period.to.clone(),
        revenue_total: crate::money::round(revenue_total),
        payment_count,
        average_payment,
        pending_amount: crate::money::round(pending_amount),
        by_method: by_method
            .into_iter()
            .map(|m| MethodBreakdown {
                total: crate::money::round(m.total),
                ..m
            })
            .collect(),
        reservations_by_status,
        orders_by_status,
        daily,
    })
}

fn daily_series(paid: &[(i64, f64)], tz: Tz) -> Vec<DailyRevenue> {
    let mut days: BTreeMap<String, (i64, Vec<f64>)> = BTreeMap::new();
    for (paid_at, amount) in paid {
        let day = crate::utils::time::millis_to_local_date(*paid_at, tz);
        let entry = days.entry(day).or_default();
        entry.0 += 1;
        entry.1.push(*amount);
    }
    days.into_iter()
        .map(|(date, (count, amounts))| DailyRevenue {
            date,
            count,
            total: crate::money::sum(amounts),
        })
        .collect()
}

/// Payment ledger for the period, newest first
pub async fn ledger(
    pool: &SqlitePool,
    period: &Period,
    status: Option<PaymentStatus>,
    method: Option<PaymentMethod>,
) -> RepoResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payment \
         WHERE created_at >= ?1 AND created_at < ?2 AND (?3 IS NULL OR status = ?3) AND (?4 IS NULL OR method = ?4) \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(period.from_ms)
    .bind(period.to_ms)
    .bind(status)
    .bind(method)
    .fetch_all(pool)
    .await?;
    Ok(payments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_series_groups_by_business_day() {
        let tz = chrono_tz::Europe::Lisbon;
        // 2030-07-01 23:30 UTC is already 2030-07-02 in Lisbon (UTC+1 in summer)
        let late = chrono::NaiveDate::from_ymd_opt(2030, 7, 1)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        let noon = late - 11 * 3_600_000;

        let series = daily_series(&[(noon, 10.0), (late, 2.5), (late + 1, 0.1)], tz);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, "2030-07-01");
        assert_eq!(series[0].count, 1);
        assert_eq!(series[1].date, "2030-07-02");
        assert_eq!(series[1].count, 2);
        assert_eq!(series[1].total, 2.6);
    }
}
