//! 關鍵字表：顏色對照、雜訊字元、節日與斋戒規則。
//!
//! 所有表格都可由設定檔的 `[rules]` 覆寫；未指定的欄位使用內建預設值。

use crate::domain::model::LiturgicalColor;
use serde::{Deserialize, Serialize};

pub const TABLES_VERSION: u32 = 3;

/// 單一顏色的比對字串，含 CSS class 片段、色碼與中文關鍵字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRule {
    pub color: LiturgicalColor,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyDevotion {
    pub month: u32,
    pub label: String,
}

/// 規則後處理附加的標籤文字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleLabels {
    pub first_friday: String,
    pub first_saturday: String,
    pub sunday: String,
    pub full_fast: String,
    pub full_fast_waived: String,
    pub abstinence: String,
    pub abstinence_waived: String,
}

impl Default for RuleLabels {
    fn default() -> Self {
        Self {
            first_friday: "首六".to_string(),
            first_saturday: "首七".to_string(),
            sunday: "罷工".to_string(),
            full_fast: "大小齋".to_string(),
            full_fast_waived: "免大小齋".to_string(),
            abstinence: "小齋".to_string(),
            abstinence_waived: "免小齋".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTables {
    pub version: u32,

    // 顏色分類
    pub colors: Vec<ColorRule>,
    pub weak_white: Vec<String>,
    pub all_souls: Vec<String>,
    pub rank_marker: String,

    // 表格雜訊
    pub month_names: Vec<String>,
    pub noise_tokens: Vec<String>,
    pub placeholder_tokens: Vec<String>,
    pub excluded_phrases: Vec<String>,
    pub date_header: String,
    pub weekday_header: String,

    // 規則後處理
    pub ash_wednesday: Vec<String>,
    pub good_friday: Vec<String>,
    pub exempt_feasts: Vec<String>,
    pub monthly_devotions: Vec<MonthlyDevotion>,
    pub labels: RuleLabels,
    pub lunar_new_year_days: u8,
    pub separator: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn color_rule(color: LiturgicalColor, keywords: &[&str]) -> ColorRule {
    ColorRule {
        color,
        keywords: strings(keywords),
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        use LiturgicalColor::*;

        Self {
            version: TABLES_VERSION,
            colors: vec![
                color_rule(
                    Red,
                    &[
                        "red", "day_r", "#ff0000", "#f00", "殉道", "圣枝", "聖枝", "圣神", "聖神",
                        "受难", "受難",
                    ],
                ),
                color_rule(
                    Violet,
                    &[
                        "violet", "purple", "day_v", "day_p", "#800080", "四旬期", "将临期",
                        "將臨期", "忏悔", "懺悔",
                    ],
                ),
                color_rule(Green, &["green", "day_g", "#008000", "#00ff00", "常年期"]),
                color_rule(Black, &["black", "day_b", "#000000", "#000"]),
                color_rule(
                    White,
                    &[
                        "white", "day_w", "#ffffff", "#fff", "圣诞", "聖誕", "复活", "復活", "圣母",
                        "聖母", "白", "诸圣", "諸聖", "献主", "獻主", "耶稣升天",
                    ],
                ),
                color_rule(Gold, &["gold", "yellow", "day_y", "#ffd700"]),
            ],
            weak_white: strings(&["纪", "紀", "庆", "慶", "圣", "聖"]),
            all_souls: strings(&["追思已亡"]),
            rank_marker: "節".to_string(),

            month_names: strings(&[
                "一月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月",
                "十一月", "十二月",
            ]),
            noise_tokens: strings(&[
                "星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日", "主日", "自*",
                "自", "O", "M", "F", "S", "P", "W", "R", "G", "V", "L", "D", "Lit.", "Ordo", "I",
                "II", "III", "IV", "V",
            ]),
            placeholder_tokens: strings(&["自", "O", "M"]),
            excluded_phrases: strings(&["灰禮儀後", "灰礼仪后", "主顯節後", "主显节后"]),
            date_header: "日期".to_string(),
            weekday_header: "星期".to_string(),

            ash_wednesday: strings(&["聖灰禮儀", "圣灰礼仪"]),
            good_friday: strings(&["耶穌受難日", "耶稣受难日", "救主受難"]),
            exempt_feasts: strings(&["復活期", "耶穌聖心", "耶穌聖誕", "聖母蒙召升天", "五旬節"]),
            monthly_devotions: vec![
                MonthlyDevotion { month: 2, label: "聖神月".to_string() },
                MonthlyDevotion { month: 3, label: "聖若瑟月".to_string() },
                MonthlyDevotion { month: 5, label: "聖母月".to_string() },
                MonthlyDevotion { month: 6, label: "聖心月".to_string() },
                MonthlyDevotion { month: 10, label: "玫瑰月".to_string() },
                MonthlyDevotion { month: 11, label: "煉靈月".to_string() },
            ],
            labels: RuleLabels::default(),
            lunar_new_year_days: 15,
            separator: " | ".to_string(),
        }
    }
}

impl RuleTables {
    /// 依調色盤順序取得某顏色的所有比對字串
    pub fn keywords_for(&self, color: LiturgicalColor) -> impl Iterator<Item = &str> {
        self.colors
            .iter()
            .filter(move |rule| rule.color == color)
            .flat_map(|rule| rule.keywords.iter().map(String::as_str))
    }

    pub fn is_month_name(&self, text: &str) -> bool {
        self.month_names.iter().any(|m| m == text)
    }

    pub fn devotion_for(&self, month: u32) -> Option<&str> {
        self.monthly_devotions
            .iter()
            .find(|d| d.month == month)
            .map(|d| d.label.as_str())
    }
}

/// U+4E00..=U+9FFF 範圍內的漢字
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

pub fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| !n.is_empty() && text.contains(n.as_str()))
}
