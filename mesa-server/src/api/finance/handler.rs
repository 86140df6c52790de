//! Finance API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono_tz::Tz;

use crate::core::ServerState;
use crate::db::repository::finance::{self, Period};
use crate::utils::time::{day_end_millis, day_start_millis, month_start, parse_date, today};
use crate::utils::{AppError, AppResult};
use shared::models::{FinanceQuery, FinanceSummary, LedgerQuery, Payment};

/// Inclusive `from..=to` business dates; defaults to the current month
fn period(from: Option<&str>, to: Option<&str>, tz: Tz) -> AppResult<Period> {
    let to = match to {
        Some(d) => parse_date(d)?,
        None => today(tz),
    };
    let from = match from {
        Some(d) => parse_date(d)?,
        None => month_start(to),
    };
    if from > to {
        return Err(AppError::validation("'from' must not be after 'to'"));
    }

    Ok(Period {
        from: from.format("%Y-%m-%d").to_string(),
        to: to.format("%Y-%m-%d").to_string(),
        from_ms: day_start_millis(from, tz),
        to_ms: day_end_millis(to, tz),
    })
}

/// GET /api/finance/summary?from=&to=
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<FinanceQuery>,
) -> AppResult<Json<FinanceSummary>> {
    let tz = state.config.timezone;
    let period = period(query.from.as_deref(), query.to.as_deref(), tz)?;
    let summary = finance::summary(&state.pool, &period, tz).await?;
    Ok(Json(summary))
}

/// GET /api/finance/payments?from=&to=&status=&method=
pub async fn ledger(
    State(state): State<ServerState>,
    Query(query): Query<LedgerQuery>,
) -> AppResult<Json<Vec<Payment>>> {
    let period = period(
        query.from.as_deref(),
        query.to.as_deref(),
        state.config.timezone,
    )?;
    let payments = finance::ledger(&state.pool, &period, query.status, query.method).await?;
    Ok(Json(payments))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISBON: Tz = chrono_tz::Europe::Lisbon;

    #[test]
    fn explicit_period_is_inclusive() {
        let p = period(Some("2030-03-01"), Some("2030-03-31"), LISBON).unwrap();
        assert_eq!(p.from, "2030-03-01");
        assert_eq!(p.to, "2030-03-31");
        assert_eq!(p.to_ms, day_start_millis(parse_date("2030-04-01").unwrap(), LISBON));
    }

    #[test]
    fn default_period_starts_at_month_start() {
        let p = period(None, Some("2030-03-17"), LISBON).unwrap();
        assert_eq!(p.from, "2030-03-01");
    }

    #[test]
    fn reversed_period_is_rejected() {
        assert!(period(Some("2030-03-02"), Some("2030-03-01"), LISBON).is_err());
        assert!(period(Some("yesterday"), None, LISBON).is_err());
    }
}
