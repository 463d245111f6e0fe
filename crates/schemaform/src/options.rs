//! Form configuration.

use crate::Locale;
use schemaform_state::{Path, SelfHealing, StoreOptions};
use serde::{Deserialize, Serialize};

/// Options accepted by [`FormShell`](crate::FormShell).
///
/// Every field has a default, so `{}` deserializes to a working form.
///
/// ```
/// use schemaform::{FormOptions, Locale};
/// use serde_json::json;
///
/// let options: FormOptions = serde_json::from_value(json!({
///     "enable_submit_buffering": true,
///     "locale": "zh_CN"
/// })).unwrap();
/// assert!(options.enable_submit_buffering);
/// assert_eq!(options.locale, Locale::ZhCn);
/// assert!(options.data_path.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Where in the document the root schema renders. Empty means the root.
    pub data_path: Path,
    /// Hold `on_change` back; the owner reads the value through `submit`.
    pub enable_submit_buffering: bool,
    pub locale: Locale,
    pub self_healing: SelfHealing,
}

impl FormOptions {
    pub(crate) fn store_options(&self) -> StoreOptions {
        StoreOptions {
            buffer_changes: self.enable_submit_buffering,
            self_healing: self.self_healing,
        }
    }
}
