use crate::domain::model::{AnnotatedDailyRecord, DailyRecord, RecordBook};
use crate::domain::ports::LunarOracle;
use crate::domain::tables::{contains_any, RuleTables};
use chrono::{Datelike, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastingTag {
    FullFast,
    FullFastWaived,
    Abstinence,
    AbstinenceWaived,
}

impl FastingTag {
    pub fn label<'t>(&self, tables: &'t RuleTables) -> &'t str {
        let labels = &tables.labels;
        match self {
            FastingTag::FullFast => &labels.full_fast,
            FastingTag::FullFastWaived => &labels.full_fast_waived,
            FastingTag::Abstinence => &labels.abstinence,
            FastingTag::AbstinenceWaived => &labels.abstinence_waived,
        }
    }
}

/// 依日期與當日文字附加敬禮月、週期標記與斋戒標籤
pub struct RulePostProcessor<'a, L: LunarOracle> {
    tables: &'a RuleTables,
    lunar: &'a L,
}

impl<'a, L: LunarOracle> RulePostProcessor<'a, L> {
    pub fn new(tables: &'a RuleTables, lunar: &'a L) -> Self {
        Self { tables, lunar }
    }

    /// 農曆正月初一至十五（預設）
    pub fn in_lunar_new_year(&self, date: NaiveDate) -> bool {
        self.lunar.to_lunar(date).is_some_and(|lunar| {
            !lunar.leap
                && lunar.month == 1
                && (1..=self.tables.lunar_new_year_days).contains(&lunar.day)
        })
    }

    pub fn fasting_tag(&self, date: NaiveDate, combined: &str) -> Option<FastingTag> {
        let lunar_exempt = self.in_lunar_new_year(date);
        let solemn_fast = contains_any(combined, &self.tables.ash_wednesday)
            || contains_any(combined, &self.tables.good_friday);

        if solemn_fast {
            return Some(if lunar_exempt {
                FastingTag::FullFastWaived
            } else {
                FastingTag::FullFast
            });
        }

        if date.weekday() == Weekday::Fri {
            let exempt = lunar_exempt || contains_any(combined, &self.tables.exempt_feasts);
            return Some(if exempt {
                FastingTag::AbstinenceWaived
            } else {
                FastingTag::Abstinence
            });
        }

        None
    }

    pub fn annotate_day(&self, record: DailyRecord) -> AnnotatedDailyRecord {
        let date = record.date;
        let mut entries = record.into_events();
        let combined = entries.join(" ");
        let labels = &self.tables.labels;

        if date.day() == 1 {
            if let Some(devotion) = self.tables.devotion_for(date.month()) {
                entries.push(devotion.to_string());
            }
        }

        let first_week = date.day() <= 7;
        match date.weekday() {
            Weekday::Fri if first_week => entries.push(labels.first_friday.clone()),
            Weekday::Sat if first_week => entries.push(labels.first_saturday.clone()),
            Weekday::Sun => entries.push(labels.sunday.clone()),
            _ => {}
        }

        if let Some(tag) = self.fasting_tag(date, &combined) {
            entries.push(tag.label(self.tables).to_string());
        }

        let summary = entries.join(&self.tables.separator);
        AnnotatedDailyRecord {
            date,
            entries,
            summary,
        }
    }

    /// 依日期排序後逐日處理
    pub fn annotate(&self, book: RecordBook) -> Vec<AnnotatedDailyRecord> {
        book.into_records()
            .into_iter()
            .map(|record| self.annotate_day(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::lunar::LunarTable;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn annotate(tables: &RuleTables, day: NaiveDate, events: &[&str]) -> AnnotatedDailyRecord {
        let mut record = DailyRecord::new(day);
        for event in events {
            record.push_unique(event.to_string());
        }
        RulePostProcessor::new(tables, &LunarTable).annotate_day(record)
    }

    #[test]
    fn test_good_friday_is_full_fast() {
        let tables = RuleTables::default();
        let record = annotate(&tables, date(2026, 4, 3), &["🔴 耶穌受難日"]);
        assert_eq!(record.entries.last().unwrap(), "大小齋");
        // 2026-04-03 亦為首個星期五
        assert_eq!(record.summary, "🔴 耶穌受難日 | 首六 | 大小齋");
    }

    #[test]
    fn test_full_fast_waived_during_lunar_new_year() {
        let tables = RuleTables::default();
        // 2026-02-18 為農曆正月初二，亦為聖灰禮儀
        let record = annotate(&tables, date(2026, 2, 18), &["🟣 聖灰禮儀"]);
        assert_eq!(record.entries, vec!["🟣 聖灰禮儀", "免大小齋"]);

        // 2026-02-20 (星期五，正月初四)
        let record = annotate(&tables, date(2026, 2, 20), &["🔴 耶穌受難日"]);
        assert_eq!(record.entries.last().unwrap(), "免大小齋");
    }

    #[test]
    fn test_feast_keyword_does_not_waive_full_fast() {
        let tables = RuleTables::default();
        let record = annotate(&tables, date(2026, 4, 3), &["耶穌受難日", "復活期"]);
        assert_eq!(record.entries.last().unwrap(), "大小齋");
    }

    #[test]
    fn test_ordinary_friday_abstinence_and_exemptions() {
        let tables = RuleTables::default();

        let record = annotate(&tables, date(2026, 3, 13), &["🟣 四旬期第三週星期五"]);
        assert_eq!(record.entries.last().unwrap(), "小齋");

        let record = annotate(&tables, date(2026, 6, 12), &["⚪ 耶穌聖心節"]);
        assert_eq!(record.entries.last().unwrap(), "免小齋");

        // 2026-02-27 為正月十一
        let record = annotate(&tables, date(2026, 2, 27), &["🟣 四旬期第一週星期五"]);
        assert_eq!(record.entries.last().unwrap(), "免小齋");
    }

    #[test]
    fn test_lunar_window_boundary_is_configurable() {
        let mut tables = RuleTables::default();
        let processor = RulePostProcessor::new(&tables, &LunarTable);
        // 2026-03-03 正月十五，2026-03-04 正月十六
        assert!(processor.in_lunar_new_year(date(2026, 3, 3)));
        assert!(!processor.in_lunar_new_year(date(2026, 3, 4)));

        tables.lunar_new_year_days = 3;
        let processor = RulePostProcessor::new(&tables, &LunarTable);
        assert!(processor.in_lunar_new_year(date(2026, 2, 19)));
        assert!(!processor.in_lunar_new_year(date(2026, 2, 20)));
    }

    #[test]
    fn test_tags_are_appended_in_fixed_order() {
        let tables = RuleTables::default();
        // 2026-05-01 星期五：聖母月、首六、小齋
        let record = annotate(&tables, date(2026, 5, 1), &["⚪ 勞動者聖若瑟"]);
        assert_eq!(
            record.entries,
            vec!["⚪ 勞動者聖若瑟", "聖母月", "首六", "小齋"]
        );
        assert_eq!(record.summary, "⚪ 勞動者聖若瑟 | 聖母月 | 首六 | 小齋");
    }

    #[test]
    fn test_weekday_markers() {
        let tables = RuleTables::default();

        let saturday = annotate(&tables, date(2026, 3, 7), &["A"]);
        assert_eq!(saturday.entries, vec!["A", "首七"]);

        let late_saturday = annotate(&tables, date(2026, 3, 14), &["A"]);
        assert_eq!(late_saturday.entries, vec!["A"]);

        // 2026-11-01 星期日：煉靈月、罷工
        let sunday = annotate(&tables, date(2026, 11, 1), &["⚪ 諸聖節"]);
        assert_eq!(sunday.entries, vec!["⚪ 諸聖節", "煉靈月", "罷工"]);
    }

    #[test]
    fn test_annotate_sorts_by_date() {
        let tables = RuleTables::default();
        let mut book = RecordBook::new();
        book.append(date(2026, 3, 10), "B".to_string());
        book.append(date(2026, 3, 9), "A".to_string());

        let days = RulePostProcessor::new(&tables, &LunarTable).annotate(book);
        assert_eq!(days[0].date, date(2026, 3, 9));
        assert_eq!(days[1].summary, "B");
    }
}
