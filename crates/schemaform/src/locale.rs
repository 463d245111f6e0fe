//! Static UI strings for the form chrome.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported UI languages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "zh_CN")]
    ZhCn,
}

/// Labels the shell itself needs; field labels come from the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiText {
    Submit,
    AddItem,
    RemoveItem,
    MoveUp,
    MoveDown,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::EnUs => "en_US",
            Locale::ZhCn => "zh_CN",
        }
    }

    pub fn text(self, key: UiText) -> &'static str {
        match (self, key) {
            (Locale::EnUs, UiText::Submit) => "Submit",
            (Locale::EnUs, UiText::AddItem) => "Add item",
            (Locale::EnUs, UiText::RemoveItem) => "Remove",
            (Locale::EnUs, UiText::MoveUp) => "Move up",
            (Locale::EnUs, UiText::MoveDown) => "Move down",
            (Locale::ZhCn, UiText::Submit) => "提交",
            (Locale::ZhCn, UiText::AddItem) => "添加",
            (Locale::ZhCn, UiText::RemoveItem) => "删除",
            (Locale::ZhCn, UiText::MoveUp) => "上移",
            (Locale::ZhCn, UiText::MoveDown) => "下移",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en_US" | "en-US" | "en" => Ok(Locale::EnUs),
            "zh_CN" | "zh-CN" | "zh" => Ok(Locale::ZhCn),
            other => Err(format!("unsupported locale `{other}` (expected en_US or zh_CN)")),
        }
    }
}
