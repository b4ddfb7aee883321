//! Holiday lookup endpoint

use axum::{Json, Router, extract::Query, routing::get};
use persona_core::PersonaError;
use persona_core::holidays::{Holiday, holiday_by_date, holidays_by_month};
use serde::Deserialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/holidays", get(get_holidays))
}

#[derive(Debug, Default, Deserialize)]
pub struct HolidayParams {
    pub date: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/holidays?date=YYYY-MM-DD or ?year=&month=
///
/// A date outside the table is an empty list, not an error.
async fn get_holidays(
    Query(params): Query<HolidayParams>,
) -> Result<Json<Vec<&'static Holiday>>, AppError> {
    let holidays = match params {
        HolidayParams {
            date: Some(date), ..
        } => holiday_by_date(&date).into_iter().collect(),
        HolidayParams {
            year: Some(year),
            month: Some(month),
            ..
        } if (1..=12).contains(&month) => holidays_by_month(year, month),
        _ => {
            return Err(PersonaError::Validation(
                "Either date or year and month (1-12) are required".to_string(),
            )
            .into());
        }
    };

    Ok(Json(holidays))
}
