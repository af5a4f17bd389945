//! Span classification.
//!
//! Derives transaction labels (type, category, sub-category, language) from
//! attribute lists, and cascades labels from an outer protocol level
//! (resource, scope) into an inner one (scope, span).
//!
//! ## Rules
//!
//! - **Type**: `web` as soon as any key starts with `http.`, `user_agent.` or
//!   `rpc.`; `non-web` otherwise.
//! - **Category**: the first key of the rule table present in the attributes
//!   wins. Its value becomes the sub-category.
//! - **Cascade**: once `web`, always `web`. A freshly computed `unknown`
//!   category inherits the outer level's category and sub-category.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use opentelemetry_proto::tonic::common::v1::KeyValue;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::utils::otlp::{AttributeSet, any_value_to_string, keys};

pub const TRANSACTION_TYPE: &str = "transaction.type";
pub const TRANSACTION_CATEGORY: &str = "transaction.category";
pub const TRANSACTION_SUB_CATEGORY: &str = "transaction.sub_category";
pub const TRANSACTION_LANGUAGE: &str = "transaction.language";

/// Label value used when nothing matched.
pub const UNKNOWN: &str = "unknown";

const WEB_KEY_PREFIXES: [&str; 3] = ["http.", "user_agent.", "rpc."];

// ============================================================================
// LABELS
// ============================================================================

/// Whether a transaction is web-facing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TransactionType {
    #[serde(rename = "web")]
    Web,
    #[default]
    #[serde(rename = "non-web")]
    NonWeb,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::NonWeb => "non-web",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification computed at one protocol level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationLabels {
    pub transaction_type: TransactionType,
    pub category: String,
    pub sub_category: String,
    pub language: String,
}

impl Default for ClassificationLabels {
    fn default() -> Self {
        Self {
            transaction_type: TransactionType::NonWeb,
            category: UNKNOWN.to_string(),
            sub_category: UNKNOWN.to_string(),
            language: UNKNOWN.to_string(),
        }
    }
}

impl ClassificationLabels {
    pub fn is_web(&self) -> bool {
        self.transaction_type == TransactionType::Web
    }

    /// Write the labels into an attribute set under the `transaction.*` keys.
    pub fn write_to(&self, attrs: &mut AttributeSet) {
        attrs.insert(
            TRANSACTION_TYPE.to_string(),
            JsonValue::from(self.transaction_type.as_str()),
        );
        attrs.insert(
            TRANSACTION_CATEGORY.to_string(),
            JsonValue::from(self.category.as_str()),
        );
        attrs.insert(
            TRANSACTION_SUB_CATEGORY.to_string(),
            JsonValue::from(self.sub_category.as_str()),
        );
        attrs.insert(
            TRANSACTION_LANGUAGE.to_string(),
            JsonValue::from(self.language.as_str()),
        );
    }
}

#[inline]
fn is_unset(label: &str) -> bool {
    label.is_empty() || label == UNKNOWN
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Maps the presence of an attribute key to a category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRule {
    pub key: &'static str,
    pub category: &'static str,
}

impl CategoryRule {
    const fn new(key: &'static str, category: &'static str) -> Self {
        Self { key, category }
    }
}

/// Category rules in priority order.
pub const DEFAULT_CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule::new("http.request.method", "HTTP"),
    CategoryRule::new("db.system", "Databases"),
    CategoryRule::new("messaging.system", "Messaging queues"),
    CategoryRule::new("rpc.system", "RPC Systems"),
    CategoryRule::new("aws.s3.bucket", "Object Store"),
    CategoryRule::new("exception.type", "Exceptions"),
    CategoryRule::new("faas.trigger", "FAAS (Function as a service)"),
    CategoryRule::new("feature_flag.key", "Feature Flag"),
    CategoryRule::new(keys::TELEMETRY_SDK_LANGUAGE, "Programming Language"),
];

static DEFAULT_CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::default);

/// Ordered, immutable classification rule table.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: &'static [CategoryRule],
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_RULES)
    }
}

impl Classifier {
    pub const fn new(rules: &'static [CategoryRule]) -> Self {
        Self { rules }
    }

    /// Shared classifier built from [`DEFAULT_CATEGORY_RULES`].
    pub fn standard() -> &'static Classifier {
        &DEFAULT_CLASSIFIER
    }

    pub fn rules(&self) -> &[CategoryRule] {
        self.rules
    }

    /// Classify the union of the given attribute lists.
    ///
    /// Keys are lowercased and trimmed; later lists overwrite earlier ones.
    pub fn classify(&self, lists: &[&[KeyValue]]) -> ClassificationLabels {
        let mut labels = ClassificationLabels::default();
        let mut working: HashMap<String, String> = HashMap::new();

        for kv in lists.iter().flat_map(|list| list.iter()) {
            let key = kv.key.trim().to_lowercase();
            if WEB_KEY_PREFIXES.iter().any(|p| key.starts_with(p)) {
                labels.transaction_type = TransactionType::Web;
            }
            let value = match &kv.value {
                Some(value) => any_value_to_string(value),
                None => String::new(),
            };
            working.insert(key, value);
        }

        if let Some((rule, value)) = self
            .rules
            .iter()
            .find_map(|rule| working.get(rule.key).map(|v| (rule, v)))
        {
            labels.category = rule.category.to_string();
            labels.sub_category = value.clone();
        }

        if let Some(language) = working.get(keys::TELEMETRY_SDK_LANGUAGE) {
            labels.language = language.clone();
        }

        labels
    }

    /// Recompute labels for an inner level and cascade `previous` into them.
    pub fn normalize(
        &self,
        previous: Option<&ClassificationLabels>,
        lists: &[&[KeyValue]],
    ) -> ClassificationLabels {
        let mut labels = self.classify(lists);

        let Some(previous) = previous else {
            return labels;
        };

        if previous.is_web() {
            labels.transaction_type = TransactionType::Web;
        }
        if is_unset(&labels.category) {
            labels.category = previous.category.clone();
            labels.sub_category = previous.sub_category.clone();
        }
        if is_unset(&labels.language) {
            labels.language = previous.language.clone();
        }

        labels
    }
}

/// Classify with the standard rule table.
pub fn classify(lists: &[&[KeyValue]]) -> ClassificationLabels {
    Classifier::standard().classify(lists)
}

/// Cascade with the standard rule table.
pub fn normalize(
    previous: Option<&ClassificationLabels>,
    lists: &[&[KeyValue]],
) -> ClassificationLabels {
    Classifier::standard().normalize(previous, lists)
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
