use crate::core::color::ColorClassifier;
use crate::core::html::{RawCell, RawRow};
use crate::domain::model::{ExtractedEvent, RecordBook};
use crate::domain::tables::{contains_any, contains_cjk, RuleTables};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static NUMERIC_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9\s/-]+$").expect("BUG: numeric run regex is statically valid")
});

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+月[0-9]+日$").expect("BUG: month-day regex is statically valid")
});

static LEADING_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+\s*").expect("BUG: leading digits regex is statically valid")
});

static CJK_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\x{4e00}-\x{9fff}])\s+([\x{4e00}-\x{9fff}])")
        .expect("BUG: CJK gap regex is statically valid")
});

static PERIOD_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\.\s*").expect("BUG: period gap regex is statically valid")
});

static OPEN_PAREN_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\(\s*").expect("BUG: paren gap regex is statically valid")
});

static CLOSE_PAREN_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\)\s*").expect("BUG: paren gap regex is statically valid")
});

const PERIOD_MARKS: [char; 7] = ['、', '，', '。', '．', '・', '‧', '･'];

/// 儲存格被丟棄的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRejection {
    DateLabel,
    MonthName,
    NoiseToken,
    DateHeader,
    Placeholder,
    TooShort,
    ExcludedPhrase,
}

pub struct EventExtractor<'a> {
    tables: &'a RuleTables,
    classifier: ColorClassifier<'a>,
}

impl<'a> EventExtractor<'a> {
    pub fn new(tables: &'a RuleTables) -> Self {
        Self {
            tables,
            classifier: ColorClassifier::new(tables),
        }
    }

    /// 篩選鏈；回傳 Err 表示此儲存格不是事件
    pub fn screen(&self, text: &str) -> Result<(), CellRejection> {
        if NUMERIC_RUN.is_match(text) || MONTH_DAY.is_match(text) {
            return Err(CellRejection::DateLabel);
        }
        if self.tables.is_month_name(text) {
            return Err(CellRejection::MonthName);
        }
        if self.tables.noise_tokens.iter().any(|t| t == text) {
            return Err(CellRejection::NoiseToken);
        }
        if text.contains(self.tables.date_header.as_str()) {
            return Err(CellRejection::DateHeader);
        }
        let unstarred = text.replace('*', "");
        if self.tables.placeholder_tokens.iter().any(|t| t == unstarred.trim()) {
            return Err(CellRejection::Placeholder);
        }
        if text.chars().count() < 2 && !contains_cjk(text) {
            return Err(CellRejection::TooShort);
        }
        Ok(())
    }

    /// 清理文字；含排除片語或清理後過短時回傳 Err
    pub fn clean(&self, text: &str) -> Result<String, CellRejection> {
        let mut clean = text;
        for prefix in ["自*", "自 "] {
            if let Some(rest) = clean.strip_prefix(prefix) {
                clean = rest;
            }
        }
        let clean = LEADING_DIGITS.replace(clean.trim(), "");

        let mut clean: String = clean
            .chars()
            .map(|c| match c {
                '（' => '(',
                '）' => ')',
                c if PERIOD_MARKS.contains(&c) => '.',
                c => c,
            })
            .collect();

        // 相鄰字元的比對不重疊，需重複到沒有變化為止
        loop {
            let collapsed = CJK_GAP.replace_all(&clean, "$1$2").into_owned();
            if collapsed == clean {
                break;
            }
            clean = collapsed;
        }
        let clean = PERIOD_GAP.replace_all(&clean, ".");
        let clean = OPEN_PAREN_GAP.replace_all(&clean, "(");
        let clean = CLOSE_PAREN_GAP.replace_all(&clean, ")");

        if contains_any(&clean, &self.tables.excluded_phrases) {
            return Err(CellRejection::ExcludedPhrase);
        }
        if clean.chars().count() <= 1 {
            return Err(CellRejection::TooShort);
        }
        Ok(clean.into_owned())
    }

    pub fn extract_cell(
        &self,
        cell: &RawCell,
        row: &RawRow,
        date: NaiveDate,
    ) -> Option<ExtractedEvent> {
        let text = match self.screen(&cell.text).and_then(|_| self.clean(&cell.text)) {
            Ok(text) => text,
            Err(reason) => {
                tracing::trace!("Cell {:?} rejected: {:?}", cell.text, reason);
                return None;
            }
        };

        let verdict = self.classifier.classify(cell, row, &text);
        Some(ExtractedEvent {
            date,
            text,
            colors: verdict.colors,
        })
    }

    /// 擷取一列中所有事件並加入當日紀錄，回傳新增數量
    pub fn extract_row(&self, row: &RawRow, date: NaiveDate, book: &mut RecordBook) -> usize {
        row.cells
            .iter()
            .filter_map(|cell| self.extract_cell(cell, row, date))
            .filter(|event| book.append(date, event.render()))
            .count()
    }
}
