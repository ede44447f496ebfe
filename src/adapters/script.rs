use crate::domain::ports::ScriptConverter;

/// 繁體轉簡體（zh-CN）
#[cfg(feature = "simplified")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplifiedConverter;

#[cfg(feature = "simplified")]
impl ScriptConverter for SimplifiedConverter {
    fn convert(&self, text: &str) -> String {
        zhconv::zhconv(text, zhconv::Variant::ZhCN)
    }
}

/// 依編譯功能取得轉換器；未啟用 `simplified` 時回傳 None，簡體輸出會被略過
pub fn default_converter() -> Option<Box<dyn ScriptConverter>> {
    #[cfg(feature = "simplified")]
    {
        Some(Box::new(SimplifiedConverter))
    }
    #[cfg(not(feature = "simplified"))]
    {
        None
    }
}
