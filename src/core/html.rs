//! 將 HTML 文件轉成列/儲存格模型。
//!
//! 來源頁面沒有可靠的日期或顏色屬性，後續的走訪與分類只需要每個儲存格的
//! 文字以及各層標籤的 class/style，因此在這裡一次取出，解析器本身不再碰 DOM。

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("tr").expect("BUG: hardcoded selector 'tr' is statically valid")
});

static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td, th").expect("BUG: hardcoded selector 'td, th' is statically valid")
});

/// 單一標籤的 class 與 inline style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAttrs {
    pub classes: Vec<String>,
    pub style: String,
}

impl TagAttrs {
    fn of(element: &ElementRef<'_>) -> Self {
        Self {
            classes: element.value().classes().map(str::to_string).collect(),
            style: element.value().attr("style").unwrap_or_default().to_string(),
        }
    }

    /// `"<classes> <style>"`，全部小寫
    pub fn search_text(&self) -> String {
        format!("{} {}", self.classes.join(" "), self.style).to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    /// 文字節點去頭尾空白後以單一空格連接
    pub text: String,
    /// 文字節點去頭尾空白後直接連接
    pub compact_text: String,
    /// 儲存格本身在前，其後依文件順序為所有子孫標籤
    pub attrs: Vec<TagAttrs>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub text: String,
    pub attrs: TagAttrs,
    pub cells: Vec<RawCell>,
}

fn joined_text(element: &ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

impl RawCell {
    fn from_element(cell: &ElementRef<'_>) -> Self {
        let attrs = std::iter::once(TagAttrs::of(cell))
            .chain(
                cell.descendants()
                    .skip(1)
                    .filter_map(ElementRef::wrap)
                    .map(|el| TagAttrs::of(&el)),
            )
            .collect();

        Self {
            text: joined_text(cell, " "),
            compact_text: joined_text(cell, ""),
            attrs,
        }
    }
}

impl RawRow {
    fn from_element(row: &ElementRef<'_>) -> Self {
        Self {
            text: joined_text(row, ""),
            attrs: TagAttrs::of(row),
            cells: row.select(&CELL_SELECTOR).map(|c| RawCell::from_element(&c)).collect(),
        }
    }
}

/// 依文件順序取出所有 `<tr>`（包含巢狀表格中的列）
pub fn parse_rows(document: &str) -> Vec<RawRow> {
    let html = Html::parse_document(document);
    html.select(&TR_SELECTOR)
        .map(|row| RawRow::from_element(&row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_collects_text_and_attributes() {
        let rows = parse_rows(
            r#"<table>
                <tr class="Sun" style="Color: Red">
                    <td>1</td>
                    <td class="day_w"><a href="x" style="color:#FFF">聖母
                        <b>節</b></a> (自)</td>
                </tr>
            </table>"#,
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.text, "1聖母節(自)");
        assert_eq!(row.attrs.search_text(), "sun color: red");
        assert_eq!(row.cells.len(), 2);

        let cell = &row.cells[1];
        assert_eq!(cell.text, "聖母 節 (自)");
        assert_eq!(cell.compact_text, "聖母節(自)");
        assert_eq!(cell.attrs.len(), 3);
        assert_eq!(cell.attrs[0].classes, vec!["day_w".to_string()]);
        assert_eq!(cell.attrs[1].search_text(), " color:#fff");
    }

    #[test]
    fn test_parse_rows_without_table() {
        assert!(parse_rows("<html><body><p>nothing</p></body></html>").is_empty());
    }
}
