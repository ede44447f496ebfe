//! 禮儀顏色分類。
//!
//! 來源頁面有時用 inline style、有時用 class 名稱、有時只能從節日名稱推斷
//! 顏色，因此依下列優先順序逐層判斷：
//!
//! 1. 追思已亡 → 紫、黑、白
//! 2. 同列有內容恰為「節」的儲存格 → 金
//! 3. 儲存格、其子孫與所在列的 class/style（非中文關鍵字）
//! 4. 第 3 步無結果時，以中文關鍵字比對清理後的文字
//! 5. 仍無結果時，含「紀/慶/聖」等字者暫定為白色（低信心）

use crate::core::html::{RawCell, RawRow};
use crate::domain::model::{ColorTags, LiturgicalColor};
use crate::domain::tables::{contains_any, contains_cjk, RuleTables};

/// 顏色判斷依據
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    AllSouls,
    RankMarker,
    Attributes,
    TextKeywords,
    /// 低信心的猜測，不代表規則命中
    WeakFallback,
    Unmatched,
}

impl ColorSource {
    pub fn is_confident(self) -> bool {
        !matches!(self, ColorSource::WeakFallback | ColorSource::Unmatched)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorVerdict {
    pub colors: ColorTags,
    pub source: ColorSource,
}

impl ColorVerdict {
    fn new(colors: ColorTags, source: ColorSource) -> Self {
        Self { colors, source }
    }
}

pub struct ColorClassifier<'a> {
    tables: &'a RuleTables,
}

impl<'a> ColorClassifier<'a> {
    pub fn new(tables: &'a RuleTables) -> Self {
        Self { tables }
    }

    pub fn classify(&self, cell: &RawCell, row: &RawRow, text: &str) -> ColorVerdict {
        let text = text.trim();

        if contains_any(text, &self.tables.all_souls) {
            let colors = ColorTags::grouped([
                LiturgicalColor::Violet,
                LiturgicalColor::Black,
                LiturgicalColor::White,
            ]);
            return ColorVerdict::new(colors, ColorSource::AllSouls);
        }

        if row
            .cells
            .iter()
            .any(|c| c.compact_text == self.tables.rank_marker)
        {
            let colors = std::iter::once(LiturgicalColor::Gold).collect();
            return ColorVerdict::new(colors, ColorSource::RankMarker);
        }

        let haystack = attribute_haystack(cell, row);
        let by_attributes = self.scan(|kw| !contains_cjk(kw) && haystack.contains(kw));
        if !by_attributes.is_empty() {
            return ColorVerdict::new(by_attributes, ColorSource::Attributes);
        }

        let by_text = self.scan(|kw| contains_cjk(kw) && text.contains(kw));
        if !by_text.is_empty() {
            return ColorVerdict::new(by_text, ColorSource::TextKeywords);
        }

        if contains_any(text, &self.tables.weak_white) {
            let colors = std::iter::once(LiturgicalColor::White).collect();
            return ColorVerdict::new(colors, ColorSource::WeakFallback);
        }

        ColorVerdict::new(ColorTags::new(), ColorSource::Unmatched)
    }

    /// 依調色盤順序，每個顏色至多命中一次
    fn scan(&self, matches: impl Fn(&str) -> bool) -> ColorTags {
        LiturgicalColor::PALETTE
            .into_iter()
            .filter(|&color| self.tables.keywords_for(color).any(|kw| matches(kw)))
            .collect()
    }
}

fn attribute_haystack(cell: &RawCell, row: &RawRow) -> String {
    cell.attrs
        .iter()
        .chain(std::iter::once(&row.attrs))
        .map(|attrs| attrs.search_text())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::html::parse_rows;
    use LiturgicalColor::*;

    fn classify_row(html: &str, cell_index: usize, text: &str) -> ColorVerdict {
        let tables = RuleTables::default();
        let rows = parse_rows(&format!("<table>{}</table>", html));
        let row = &rows[0];
        ColorClassifier::new(&tables).classify(&row.cells[cell_index], row, text)
    }

    #[test]
    fn test_all_souls_overrides_every_attribute() {
        let cell = r#"<td class="day_r" style="color:#ffd700">追思已亡</td>"#;
        let verdict = classify_row(
            &format!(r#"<tr class="day_g">{cell}<td>節</td></tr>"#),
            0,
            "追思已亡者(煉靈)",
        );
        assert_eq!(verdict.colors.as_slice(), &[Violet, Black, White]);
        assert_eq!(verdict.colors.prefix(), "🟣⚫⚪ ");
        assert_eq!(verdict.source, ColorSource::AllSouls);
    }

    #[test]
    fn test_rank_marker_forces_gold() {
        let verdict = classify_row(
            r#"<tr><td>節</td><td class="day_v">聖若瑟</td></tr>"#,
            1,
            "聖若瑟",
        );
        assert_eq!(verdict.colors.as_slice(), &[Gold]);
        assert_eq!(verdict.source, ColorSource::RankMarker);
    }

    #[test]
    fn test_attribute_scan_reads_descendants_and_row() {
        let verdict = classify_row(
            r#"<tr style="background:#008000"><td><span class="Day_R">殉道</span></td></tr>"#,
            0,
            "某某殉道",
        );
        assert_eq!(verdict.colors.as_slice(), &[Red, Green]);
        assert_eq!(verdict.source, ColorSource::Attributes);
    }

    #[test]
    fn test_attribute_match_suppresses_text_keywords() {
        let verdict = classify_row(r#"<tr><td class="day_w">四旬期</td></tr>"#, 0, "四旬期");
        assert_eq!(verdict.colors.as_slice(), &[White]);
    }

    #[test]
    fn test_text_keywords_collect_all_matches_in_palette_order() {
        let verdict = classify_row(r#"<tr><td>x</td></tr>"#, 0, "聖母懺悔日");
        assert_eq!(verdict.colors.as_slice(), &[Violet, White]);
        assert_eq!(verdict.source, ColorSource::TextKeywords);
        assert!(verdict.source.is_confident());
    }

    #[test]
    fn test_weak_fallback_is_flagged_as_low_confidence() {
        let verdict = classify_row(r#"<tr><td>x</td></tr>"#, 0, "聖伯多祿紀念");
        assert_eq!(verdict.colors.as_slice(), &[White]);
        assert_eq!(verdict.source, ColorSource::WeakFallback);
        assert!(!verdict.source.is_confident());
    }

    #[test]
    fn test_unmatched_returns_empty() {
        let verdict = classify_row(r#"<tr><td>x</td></tr>"#, 0, "平日");
        assert!(verdict.colors.is_empty());
        assert_eq!(verdict.source, ColorSource::Unmatched);
    }
}
