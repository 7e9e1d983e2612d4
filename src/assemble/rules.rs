//! Fixed transform bindings

use serde_json::{json, Value};

use super::plugins::{FILE_COORDINATOR, SCRIPT_COORDINATOR, STYLE_COORDINATOR};

/// Extensions the resolver always tries, after any user extensions
pub const FIXED_EXTENSIONS: &[&str] = &[
    ".jsx", ".js", ".css", ".less", ".png", ".jpg", ".jpeg", ".gif", ".webp",
];

fn coordinator_loader(id: &str) -> String {
    format!("happypack/loader?id={}", id)
}

/// Script, stylesheet and static-asset rules, in binding order.
///
/// `test`/`exclude` hold regular-expression sources.
pub fn fixed_rules() -> Vec<Value> {
    vec![
        // framework sources ship untranspiled inside node_modules
        json!({
            "test": r".*node_modules.*direct.*\.(jsx|js)$",
            "use": coordinator_loader(SCRIPT_COORDINATOR)
        }),
        json!({
            "test": r"\.(jsx|js)$",
            "use": coordinator_loader(SCRIPT_COORDINATOR),
            "exclude": ["node_modules"]
        }),
        json!({
            "test": r"\.less$",
            "use": coordinator_loader(STYLE_COORDINATOR)
        }),
        json!({
            "test": r"\.(png|svg|webp|jpe?g|gif)",
            "use": coordinator_loader(FILE_COORDINATOR)
        }),
    ]
}
