use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 一個抓取目標：某一年份的日曆頁面
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub year: i32,
    pub url: String,
}

/// 禮儀顏色，宣告順序即為分類時的調色盤順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiturgicalColor {
    Red,
    Violet,
    Green,
    Black,
    White,
    Gold,
}

impl LiturgicalColor {
    pub const PALETTE: [LiturgicalColor; 6] = [
        LiturgicalColor::Red,
        LiturgicalColor::Violet,
        LiturgicalColor::Green,
        LiturgicalColor::Black,
        LiturgicalColor::White,
        LiturgicalColor::Gold,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            LiturgicalColor::Red => "🔴",
            LiturgicalColor::Violet => "🟣",
            LiturgicalColor::Green => "🟢",
            LiturgicalColor::Black => "⚫",
            LiturgicalColor::White => "⚪",
            LiturgicalColor::Gold => "🟡",
        }
    }
}

/// 有序且不重複的顏色集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTags {
    colors: Vec<LiturgicalColor>,
    /// 符號連寫成一組，只在最後接一個空格
    grouped: bool,
}

impl ColorTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// 固定組合（追思已亡）：符號之間不留空格
    pub fn grouped(colors: impl IntoIterator<Item = LiturgicalColor>) -> Self {
        let mut tags: ColorTags = colors.into_iter().collect();
        tags.grouped = true;
        tags
    }

    /// 加入顏色；已存在則忽略並回傳 false
    pub fn insert(&mut self, color: LiturgicalColor) -> bool {
        if self.colors.contains(&color) {
            return false;
        }
        self.colors.push(color);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn as_slice(&self) -> &[LiturgicalColor] {
        &self.colors
    }

    /// 事件文字前綴：一般每個符號後接一個空格，連寫組合只在結尾留空格
    pub fn prefix(&self) -> String {
        if self.grouped && !self.colors.is_empty() {
            let symbols: String = self.colors.iter().map(|c| c.symbol()).collect();
            return format!("{} ", symbols);
        }
        self.colors
            .iter()
            .map(|c| format!("{} ", c.symbol()))
            .collect()
    }
}

impl FromIterator<LiturgicalColor> for ColorTags {
    fn from_iter<I: IntoIterator<Item = LiturgicalColor>>(iter: I) -> Self {
        let mut tags = ColorTags::new();
        for color in iter {
            tags.insert(color);
        }
        tags
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEvent {
    pub date: NaiveDate,
    pub text: String,
    pub colors: ColorTags,
}

impl ExtractedEvent {
    pub fn render(&self) -> String {
        format!("{}{}", self.colors.prefix(), self.text)
    }
}

/// 單日紀錄：事件文字依出現順序保存且不重複
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    events: Vec<String>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            events: Vec::new(),
        }
    }

    pub fn push_unique(&mut self, text: String) -> bool {
        if self.events.contains(&text) {
            return false;
        }
        self.events.push(text);
        true
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn into_events(self) -> Vec<String> {
        self.events
    }
}

/// 以日期為鍵的 DailyRecord 集合，解析器唯一的對外輸出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordBook {
    records: BTreeMap<NaiveDate, DailyRecord>,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, date: NaiveDate, text: String) -> bool {
        self.records
            .entry(date)
            .or_insert_with(|| DailyRecord::new(date))
            .push_unique(text)
    }

    /// 合併另一份紀錄，同日期的事件沿用去重規則
    pub fn merge(&mut self, other: RecordBook) {
        for (date, record) in other.records {
            for event in record.into_events() {
                self.append(date, event);
            }
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records.get(&date)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<DailyRecord> {
        self.records.into_values().collect()
    }
}

/// 加上規則標記後的單日紀錄，`summary` 為最終輸出文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDailyRecord {
    pub date: NaiveDate,
    pub entries: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestStatus {
    Parsed,
    Empty,
    FetchFailed,
}

/// 單一目標的擷取結果
#[derive(Debug, Clone)]
pub struct Harvest {
    pub target: Target,
    pub book: RecordBook,
    pub status: HarvestStatus,
}

impl Harvest {
    pub fn failed(target: Target) -> Self {
        Self {
            target,
            book: RecordBook::new(),
            status: HarvestStatus::FetchFailed,
        }
    }

    pub fn parsed(target: Target, book: RecordBook) -> Self {
        let status = if book.is_empty() {
            HarvestStatus::Empty
        } else {
            HarvestStatus::Parsed
        };
        Self {
            target,
            book,
            status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub days: Vec<AnnotatedDailyRecord>,
    pub failed_targets: Vec<Target>,
}

/// 序列化器的輸入：一個全日事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub leap: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_color_tags_keep_insertion_order_without_duplicates() {
        let tags: ColorTags = [
            LiturgicalColor::White,
            LiturgicalColor::Red,
            LiturgicalColor::White,
        ]
        .into_iter()
        .collect();

        assert_eq!(
            tags.as_slice(),
            &[LiturgicalColor::White, LiturgicalColor::Red]
        );
        assert_eq!(tags.prefix(), "⚪ 🔴 ");
    }

    #[test]
    fn test_grouped_tags_render_without_inner_spaces() {
        let tags = ColorTags::grouped([
            LiturgicalColor::Violet,
            LiturgicalColor::Black,
            LiturgicalColor::White,
        ]);
        assert_eq!(tags.prefix(), "🟣⚫⚪ ");
        assert!(ColorTags::grouped([]).prefix().is_empty());
    }

    #[test]
    fn test_record_book_deduplicates_per_date() {
        let mut book = RecordBook::new();
        assert!(book.append(date(2027, 1, 1), "⚪ 聖母節".to_string()));
        assert!(!book.append(date(2027, 1, 1), "⚪ 聖母節".to_string()));
        assert!(book.append(date(2027, 1, 2), "⚪ 聖母節".to_string()));

        assert_eq!(book.len(), 2);
        assert_eq!(book.get(date(2027, 1, 1)).unwrap().events().len(), 1);
    }

    #[test]
    fn test_record_book_merge_is_order_preserving() {
        let mut first = RecordBook::new();
        first.append(date(2027, 1, 3), "A".to_string());
        let mut second = RecordBook::new();
        second.append(date(2027, 1, 3), "A".to_string());
        second.append(date(2027, 1, 3), "B".to_string());
        second.append(date(2027, 1, 1), "C".to_string());

        first.merge(second);

        let records = first.into_records();
        assert_eq!(records[0].date, date(2027, 1, 1));
        assert_eq!(records[1].events(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_harvest_status_reflects_book() {
        let target = Target {
            year: 2027,
            url: "https://example.com".to_string(),
        };
        assert_eq!(
            Harvest::parsed(target.clone(), RecordBook::new()).status,
            HarvestStatus::Empty
        );
        assert_eq!(Harvest::failed(target).status, HarvestStatus::FetchFailed);
    }
}
