//! Korean public holidays, traditional observances, memorial days and
//! solar terms for 2024 and 2025.
//!
//! This is static reference data keyed by `YYYY-MM-DD`. Dates outside the
//! covered years simply have no annotation.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayKind {
    /// 공휴일
    National,
    /// 전통명절
    Traditional,
    /// 기념일
    Memorial,
    /// 절기
    Season,
}

/// Display colors for a holiday annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayStyle {
    pub color: &'static str,
    pub background_color: &'static str,
    pub border_color: &'static str,
}

impl HolidayKind {
    pub fn style(&self) -> HolidayStyle {
        let (color, background_color, border_color) = match self {
            HolidayKind::National => ("#dc2626", "#fee2e2", "#fca5a5"),
            HolidayKind::Traditional => ("#ea580c", "#fff7ed", "#fed7aa"),
            HolidayKind::Memorial => ("#7c3aed", "#f3e8ff", "#c4b5fd"),
            HolidayKind::Season => ("#059669", "#ecfdf5", "#86efac"),
        };
        HolidayStyle {
            color,
            background_color,
            border_color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub date: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: HolidayKind,
    pub is_national_holiday: bool,
}

const fn h(
    date: &'static str,
    name: &'static str,
    kind: HolidayKind,
    is_national_holiday: bool,
) -> Holiday {
    Holiday {
        date,
        name,
        kind,
        is_national_holiday,
    }
}

pub static HOLIDAYS: &[Holiday] = &[
    h("2024-01-01", "신정", HolidayKind::National, true),
    h("2024-02-09", "설날연휴", HolidayKind::Traditional, true),
    h("2024-02-10", "설날", HolidayKind::Traditional, true),
    h("2024-02-11", "설날연휴", HolidayKind::Traditional, true),
    h("2024-02-12", "설날대체공휴일", HolidayKind::Traditional, true),
    h("2024-03-01", "삼일절", HolidayKind::National, true),
    h("2024-04-10", "제22대 국회의원 선거", HolidayKind::National, true),
    h("2024-05-05", "어린이날", HolidayKind::National, true),
    h("2024-05-06", "어린이날대체공휴일", HolidayKind::National, true),
    h("2024-05-15", "부처님오신날", HolidayKind::Traditional, true),
    h("2024-06-06", "현충일", HolidayKind::Memorial, true),
    h("2024-08-15", "광복절", HolidayKind::National, true),
    h("2024-09-16", "추석연휴", HolidayKind::Traditional, true),
    h("2024-09-17", "추석", HolidayKind::Traditional, true),
    h("2024-09-18", "추석연휴", HolidayKind::Traditional, true),
    h("2024-10-03", "개천절", HolidayKind::National, true),
    h("2024-10-09", "한글날", HolidayKind::National, true),
    h("2024-12-25", "성탄절", HolidayKind::National, true),

    h("2025-01-01", "신정", HolidayKind::National, true),
    h("2025-01-28", "설날연휴", HolidayKind::Traditional, true),
    h("2025-01-29", "설날", HolidayKind::Traditional, true),
    h("2025-01-30", "설날연휴", HolidayKind::Traditional, true),
    h("2025-03-01", "삼일절", HolidayKind::National, true),
    h("2025-05-05", "어린이날", HolidayKind::National, true),
    h("2025-05-13", "부처님오신날", HolidayKind::Traditional, true),
    h("2025-06-06", "현충일", HolidayKind::Memorial, true),
    h("2025-08-15", "광복절", HolidayKind::National, true),
    h("2025-10-05", "추석연휴", HolidayKind::Traditional, true),
    h("2025-10-06", "추석", HolidayKind::Traditional, true),
    h("2025-10-07", "추석연휴", HolidayKind::Traditional, true),
    h("2025-10-08", "추석대체공휴일", HolidayKind::Traditional, true),
    h("2025-10-03", "개천절", HolidayKind::National, true),
    h("2025-10-09", "한글날", HolidayKind::National, true),
    h("2025-12-25", "성탄절", HolidayKind::National, true),

    // Observances that are not days off
    h("2024-02-14", "밸런타인데이", HolidayKind::Memorial, false),
    h("2024-03-14", "화이트데이", HolidayKind::Memorial, false),
    h("2024-04-14", "블랙데이", HolidayKind::Memorial, false),
    h("2024-05-08", "어버이날", HolidayKind::Memorial, false),
    h("2024-05-15", "스승의날", HolidayKind::Memorial, false),
    h("2024-10-31", "할로윈", HolidayKind::Memorial, false),
    h("2024-11-11", "빼빼로데이", HolidayKind::Memorial, false),
    h("2024-12-24", "크리스마스이브", HolidayKind::Memorial, false),
    h("2025-02-14", "밸런타인데이", HolidayKind::Memorial, false),
    h("2025-03-14", "화이트데이", HolidayKind::Memorial, false),
    h("2025-04-14", "블랙데이", HolidayKind::Memorial, false),
    h("2025-05-08", "어버이날", HolidayKind::Memorial, false),
    h("2025-05-15", "스승의날", HolidayKind::Memorial, false),
    h("2025-10-31", "할로윈", HolidayKind::Memorial, false),
    h("2025-11-11", "빼빼로데이", HolidayKind::Memorial, false),
    h("2025-12-24", "크리스마스이브", HolidayKind::Memorial, false),

    // Solstices and equinoxes
    h("2024-03-20", "춘분", HolidayKind::Season, false),
    h("2024-06-21", "하지", HolidayKind::Season, false),
    h("2024-09-22", "추분", HolidayKind::Season, false),
    h("2024-12-21", "동지", HolidayKind::Season, false),
    h("2025-03-20", "춘분", HolidayKind::Season, false),
    h("2025-06-21", "하지", HolidayKind::Season, false),
    h("2025-09-23", "추분", HolidayKind::Season, false),
    h("2025-12-22", "동지", HolidayKind::Season, false),
];

/// The annotation for a `YYYY-MM-DD` date, if any. The first entry wins
/// when two share a date.
pub fn holiday_by_date(date: &str) -> Option<&'static Holiday> {
    HOLIDAYS.iter().find(|h| h.date == date)
}

/// All annotations in a given month, in table order.
pub fn holidays_by_month(year: i32, month: u32) -> Vec<&'static Holiday> {
    let prefix = format!("{}-{:02}", year, month);
    HOLIDAYS
        .iter()
        .filter(|h| h.date.starts_with(&prefix))
        .collect()
}

pub fn is_national_holiday(date: &str) -> bool {
    holiday_by_date(date).is_some_and(|h| h.is_national_holiday)
}

/// Annotated, but not a day off.
pub fn is_memorial_day(date: &str) -> bool {
    holiday_by_date(date).is_some_and(|h| !h.is_national_holiday)
}
