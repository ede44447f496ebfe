use crate::config::toml_config::CalendarSettings;
use crate::domain::model::{CalendarEntry, TransformResult};
use crate::domain::ports::ScriptConverter;
use chrono::{Days, NaiveDate};
use icalendar::{Calendar, Component, Event, EventLike};
use md5::{Digest, Md5};

/// 抓取失敗年份的佔位事件
pub fn placeholder_entry(year: i32) -> Option<CalendarEntry> {
    Some(CalendarEntry {
        date: NaiveDate::from_ymd_opt(year, 1, 1)?,
        summary: format!("⚠️ {} 年禮儀日曆資料抓取失敗", year),
    })
}

/// 將轉換結果攤平成依日期排序的事件，失敗年份補上佔位事件
pub fn collect_entries(result: &TransformResult) -> Vec<CalendarEntry> {
    let mut entries: Vec<CalendarEntry> = result
        .days
        .iter()
        .map(|day| CalendarEntry {
            date: day.date,
            summary: day.summary.clone(),
        })
        .collect();

    entries.extend(
        result
            .failed_targets
            .iter()
            .filter_map(|target| placeholder_entry(target.year)),
    );
    entries.sort_by_key(|entry| entry.date);
    entries
}

/// iCalendar 序列化
#[derive(Debug, Clone)]
pub struct IcsSerializer {
    prodid: String,
    timezone: String,
    uid_domain: String,
}

impl IcsSerializer {
    pub fn new(settings: &CalendarSettings) -> Self {
        Self {
            prodid: settings.prodid.clone(),
            timezone: settings.timezone.clone(),
            uid_domain: settings.uid_domain.clone(),
        }
    }

    /// UID = md5("<YYYY-MM-DD> 00:00:00<summary>") + "@" + 網域，與既有的日曆檔相容
    pub fn event_uid(&self, date: NaiveDate, summary: &str) -> String {
        let key = format!("{} 00:00:00{}", date.format("%Y-%m-%d"), summary);
        let digest = Md5::digest(key.as_bytes());
        format!("{}@{}", hex::encode(digest), self.uid_domain)
    }

    fn event(&self, date: NaiveDate, summary: &str) -> Event {
        let end = date.checked_add_days(Days::new(1)).unwrap_or(date);
        Event::new()
            .summary(summary)
            .uid(&self.event_uid(date, summary))
            .starts(date)
            .ends(end)
            .done()
    }

    pub fn render(
        &self,
        name: &str,
        entries: &[CalendarEntry],
        converter: Option<&dyn ScriptConverter>,
    ) -> String {
        let mut calendar = Calendar::empty();
        calendar
            .append_property(icalendar::Property::new("PRODID", &self.prodid))
            .append_property(icalendar::Property::new("VERSION", "2.0"))
            .name(name)
            .timezone(self.timezone.as_str());

        for entry in entries {
            let summary = match converter {
                Some(converter) => converter.convert(&entry.summary),
                None => entry.summary.clone(),
            };
            calendar.push(self.event(entry.date, &summary));
        }

        tracing::debug!("📅 Rendered calendar '{}' with {} events", name, entries.len());
        calendar.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AnnotatedDailyRecord, Target};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn serializer() -> IcsSerializer {
        IcsSerializer::new(&CalendarSettings::default())
    }

    struct Upper;

    impl ScriptConverter for Upper {
        fn convert(&self, text: &str) -> String {
            text.to_uppercase()
        }
    }

    #[test]
    fn test_uid_is_md5_of_date_and_summary() {
        assert_eq!(
            serializer().event_uid(date(2027, 1, 1), "⚪ 天主之母節"),
            "9fadca2b67c74bf8b45da0782b83d8cb@gcatholic"
        );
    }

    #[test]
    fn test_render_all_day_events() {
        let entries = vec![CalendarEntry {
            date: date(2027, 12, 31),
            summary: "⚪ 聖思維一世教宗".to_string(),
        }];
        let ics = serializer().render("天主教礼仪日历 2027-2027", &entries, None);

        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("PRODID:-//GCatholic HK//mxm.io//"));
        assert!(ics.contains("VERSION:2.0"));
        assert!(ics.contains("X-WR-CALNAME:天主教礼仪日历 2027-2027"));
        assert!(ics.contains("X-WR-TIMEZONE:Asia/Hong_Kong"));
        assert!(ics.contains("DTSTART;VALUE=DATE:20271231"));
        assert!(ics.contains("DTEND;VALUE=DATE:20280101"));
        assert!(ics.contains("SUMMARY:⚪ 聖思維一世教宗"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }

    #[test]
    fn test_converter_changes_summary_and_uid() {
        let entries = vec![CalendarEntry {
            date: date(2027, 1, 1),
            summary: "abc".to_string(),
        }];
        let s = serializer();
        let ics = s.render("cal", &entries, Some(&Upper));

        assert!(ics.contains("SUMMARY:ABC"));
        assert!(ics.contains(&s.event_uid(date(2027, 1, 1), "ABC")));
        assert!(!ics.contains(&s.event_uid(date(2027, 1, 1), "abc")));
    }

    #[test]
    fn test_collect_entries_adds_placeholders_in_date_order() {
        let result = TransformResult {
            days: vec![AnnotatedDailyRecord {
                date: date(2027, 3, 19),
                entries: vec!["⚪ 聖若瑟".to_string()],
                summary: "⚪ 聖若瑟".to_string(),
            }],
            failed_targets: vec![Target {
                year: 2027,
                url: "https://example.com".to_string(),
            }],
        };

        let entries = collect_entries(&result);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, date(2027, 1, 1));
        assert_eq!(entries[0].summary, "⚠️ 2027 年禮儀日曆資料抓取失敗");
        assert_eq!(
            serializer().event_uid(entries[0].date, &entries[0].summary),
            "76efdc52a9617849a1f0ebd04baaa498@gcatholic"
        );
        assert_eq!(entries[1].summary, "⚪ 聖若瑟");
    }
}
