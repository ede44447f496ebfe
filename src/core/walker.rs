//! 表格走訪器：依列順序推算每一列所屬的日期。
//!
//! 來源表格只有少數列帶有「月/日」字樣，其餘列只有日數或完全沒有日期
//! （視覺上合併的儲存格）。`DateCursor` 記錄目前的月與日，每一列經過
//! [`step`] 得到新的游標與一個 [`RowTransition`]。

use crate::core::extractor::EventExtractor;
use crate::core::html::RawRow;
use crate::domain::model::RecordBook;
use crate::domain::tables::RuleTables;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static EXPLICIT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,2})\s*[月/]\s*([0-9]{1,2})")
        .expect("BUG: hardcoded date token regex is statically valid")
});

/// 解析游標；`day == 0` 表示尚未遇到任何日期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateCursor {
    month: u32,
    day: u32,
}

impl Default for DateCursor {
    fn default() -> Self {
        Self { month: 1, day: 0 }
    }
}

impl DateCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_established(&self) -> bool {
        self.day > 0
    }

    pub fn date_in(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 尚未建立日期的表頭或前言
    NoDateYet,
    MonthHeader,
    ColumnHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTransition {
    /// 列文字中有「M月D」或「M/D」
    Explicit,
    /// 純數字儲存格；`rolled_over` 表示因日數回到 1 而進入下個月
    Implicit { rolled_over: bool },
    /// 沒有日期，沿用目前日期（合併儲存格的延續列）
    Continuation,
    Skip(SkipReason),
}

impl RowTransition {
    pub fn extracts(&self) -> bool {
        !matches!(self, RowTransition::Skip(_))
    }
}

fn explicit_date(text: &str) -> Option<(u32, u32)> {
    EXPLICIT_DATE.captures_iter(text).find_map(|caps| {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        ((1..=12).contains(&month) && (1..=31).contains(&day)).then_some((month, day))
    })
}

fn implicit_day(row: &RawRow, current_day: u32) -> Option<u32> {
    row.cells.iter().find_map(|cell| {
        let text = cell.compact_text.as_str();
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let day: u32 = text.parse().ok()?;
        let accepted = (1..=31).contains(&day)
            && (day == current_day + 1 || day == 1 || day == current_day);
        accepted.then_some(day)
    })
}

fn is_month_header(text: &str, tables: &RuleTables) -> bool {
    tables.is_month_name(text) || (text.contains('月') && text.chars().count() < 4)
}

/// 狀態機的一步：輸入目前游標與一列，回傳新游標與轉移種類
pub fn step(cursor: DateCursor, row: &RawRow, tables: &RuleTables) -> (DateCursor, RowTransition) {
    if let Some((month, day)) = explicit_date(&row.text) {
        return (DateCursor { month, day }, RowTransition::Explicit);
    }

    if let Some(day) = implicit_day(row, cursor.day) {
        let rolled_over = day < cursor.day && cursor.month < 12 && day == 1;
        let month = if rolled_over { cursor.month + 1 } else { cursor.month };
        return (
            DateCursor { month, day },
            RowTransition::Implicit { rolled_over },
        );
    }

    if !cursor.is_established() {
        return (cursor, RowTransition::Skip(SkipReason::NoDateYet));
    }
    if is_month_header(&row.text, tables) {
        return (cursor, RowTransition::Skip(SkipReason::MonthHeader));
    }
    if row.text.contains(tables.weekday_header.as_str())
        && row.text.contains(tables.date_header.as_str())
    {
        return (cursor, RowTransition::Skip(SkipReason::ColumnHeader));
    }

    (cursor, RowTransition::Continuation)
}

/// 走訪整份表格並交由 [`EventExtractor`] 累積事件
pub struct TableWalker<'a> {
    tables: &'a RuleTables,
    extractor: EventExtractor<'a>,
    min_rows: usize,
}

impl<'a> TableWalker<'a> {
    pub fn new(tables: &'a RuleTables, min_rows: usize) -> Self {
        Self {
            tables,
            extractor: EventExtractor::new(tables),
            min_rows,
        }
    }

    pub fn walk(&self, rows: &[RawRow], year: i32) -> RecordBook {
        let mut book = RecordBook::new();

        if rows.len() < self.min_rows {
            tracing::warn!(
                "❌ [{}] Only {} table rows found (need {}), page treated as invalid",
                year,
                rows.len(),
                self.min_rows
            );
            return book;
        }

        tracing::info!("🔍 [{}] Scanning {} rows", year, rows.len());

        let mut cursor = DateCursor::new();
        let mut appended = 0usize;

        for (index, row) in rows.iter().enumerate() {
            let (next, transition) = step(cursor, row, self.tables);
            cursor = next;

            if let RowTransition::Implicit { rolled_over: true } = transition {
                tracing::debug!("Row {}: month rollover to {}", index, cursor.month());
            }
            if !transition.extracts() {
                tracing::debug!("Row {}: skipped ({:?})", index, transition);
                continue;
            }

            let Some(date) = cursor.date_in(year) else {
                tracing::warn!(
                    "⚠️ [{}] Row {}: {}/{} is not a valid date, row skipped",
                    year,
                    index,
                    cursor.month(),
                    cursor.day()
                );
                continue;
            };

            appended += self.extractor.extract_row(row, date, &mut book);
        }

        tracing::info!(
            "✅ [{}] Parsed {} events over {} days",
            year,
            appended,
            book.len()
        );
        book
    }
}
