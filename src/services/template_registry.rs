//! Template fetching, compilation and the process-wide template cache.
//!
//! Templates are deployment-static assets, so cache entries are written at
//! most once per process and never invalidated. Fetch-and-compile is
//! idempotent per id; a failure for one id never aborts loading the rest.

use crate::assets::TemplateAssets;
use crate::models::{format_amount, InvoiceDocument};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tera::{Context, Tera};

/// Error type for template fetching and rendering
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Failed to fetch template {id}: {reason}")]
    Fetch { id: String, reason: String },
}

/// Source of raw template markup, keyed by template id.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<String, TemplateError>;
}

/// Templates bundled with the binary (optionally overridden on disk).
pub struct BundledTemplateSource {
    assets: TemplateAssets,
}

impl BundledTemplateSource {
    pub fn new(assets: TemplateAssets) -> Self {
        Self { assets }
    }
}

#[async_trait]
impl TemplateSource for BundledTemplateSource {
    async fn fetch(&self, id: &str) -> Result<String, TemplateError> {
        self.assets
            .read(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }
}

/// Templates fetched from a remote endpoint as `{base_url}/{id}.svg`.
pub struct HttpTemplateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTemplateSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TemplateSource for HttpTemplateSource {
    async fn fetch(&self, id: &str) -> Result<String, TemplateError> {
        let url = format!("{}/{}.svg", self.base_url.trim_end_matches('/'), id);
        let response = self.client.get(&url).send().await.map_err(|e| {
            TemplateError::Fetch {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })?;

        // Absence is a normal, handled outcome, distinct from transport errors
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(TemplateError::NotFound(id.to_string()));
        }

        let response = response.error_for_status().map_err(|e| TemplateError::Fetch {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        response.text().await.map_err(|e| TemplateError::Fetch {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }
}

/// A visual template compiled into a reusable renderer.
///
/// Immutable once compiled.
pub struct CompiledTemplate {
    pub id: String,
    pub name: String,
    pub category: String,
    tera: Tera,
    template_name: String,
}

impl CompiledTemplate {
    /// Compile raw markup into a renderer.
    pub fn compile(id: &str, source: &str) -> Result<Self, TemplateError> {
        let template_name = format!("{id}.svg");
        let mut tera = Tera::default();
        register_filters(&mut tera);
        tera.add_raw_template(&template_name, source)?;

        Ok(Self {
            id: id.to_string(),
            name: display_name(id),
            category: "invoice".to_string(),
            tera,
            template_name,
        })
    }

    /// Render the template with invoice data into SVG markup.
    pub fn render(&self, invoice: &InvoiceDocument) -> Result<String, TemplateError> {
        let context = invoice_context(invoice)?;
        Ok(self.tera.render(&self.template_name, &context)?)
    }
}

/// Register custom Tera filters
fn register_filters(tera: &mut Tera) {
    // money filter: decimal string -> grouped display amount
    tera.register_filter(
        "money",
        |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
            let raw = match value {
                tera::Value::String(s) => s.clone(),
                tera::Value::Number(n) => n.to_string(),
                other => {
                    return Err(tera::Error::msg(format!(
                        "money filter expects an amount, got {other}"
                    )))
                }
            };
            let amount: rust_decimal::Decimal = raw
                .parse()
                .map_err(|e| tera::Error::msg(format!("money filter: {e}")))?;
            Ok(tera::Value::String(format_amount(&amount)))
        },
    );

    // truncate filter with custom length
    tera.register_filter(
        "truncate",
        |value: &tera::Value, args: &HashMap<String, tera::Value>| {
            let s = tera::try_get_value!("truncate", "value", String, value);
            let len = args.get("length").and_then(|v| v.as_u64()).unwrap_or(50) as usize;

            if s.chars().count() <= len {
                Ok(tera::Value::String(s))
            } else {
                let truncated = s.chars().take(len.saturating_sub(3)).collect::<String>() + "...";
                Ok(tera::Value::String(truncated))
            }
        },
    );
}

fn display_name(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Build the Tera context for an invoice.
///
/// Amounts are serialized as strings (exact decimal form); the `money`
/// filter formats them at the presentation boundary. Derived line amounts
/// are computed here because they are never stored on the record.
fn invoice_context(invoice: &InvoiceDocument) -> Result<Context, tera::Error> {
    let items: Vec<serde_json::Value> = invoice
        .items
        .iter()
        .map(|item| {
            serde_json::json!({
                "description": item.description,
                "quantity": item.quantity,
                "unit_price": item.unit_price.to_string(),
                "amount": item.amount().to_string(),
            })
        })
        .collect();

    let value = serde_json::json!({
        "invoice_number": invoice.invoice_number,
        "issue_date": invoice.issue_date.format("%Y-%m-%d").to_string(),
        "due_date": invoice.due_date.format("%Y-%m-%d").to_string(),
        "currency": invoice.currency,
        "status": invoice.status.as_str(),
        "amount": invoice.amount.to_string(),
        "items_total": invoice.items_total().to_string(),
        "items": items,
        "recipient": invoice.recipient,
        "issuer": invoice.issuer,
    });

    Context::from_value(value)
}

static TEMPLATE_CACHE: OnceLock<Mutex<HashMap<String, Arc<CompiledTemplate>>>> = OnceLock::new();

fn cache() -> MutexGuard<'static, HashMap<String, Arc<CompiledTemplate>>> {
    TEMPLATE_CACHE
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fetches and compiles named templates, caching them for the process
/// lifetime.
pub struct TemplateRegistry {
    source: Box<dyn TemplateSource>,
}

impl TemplateRegistry {
    pub fn new(source: Box<dyn TemplateSource>) -> Self {
        Self { source }
    }

    /// Fetch-and-compile each id that is not already cached.
    ///
    /// A fetch or compile failure for one id is non-fatal: that id stays
    /// absent and loading continues. Returns the cached template for each
    /// requested id that is available afterwards.
    pub async fn load(&self, ids: &[&str]) -> HashMap<String, Arc<CompiledTemplate>> {
        for &id in ids {
            if self.get(id).is_some() {
                continue;
            }

            let source = match self.source.fetch(id).await {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!(template = id, error = %e, "Skipping template: fetch failed");
                    continue;
                }
            };

            match CompiledTemplate::compile(id, &source) {
                Ok(compiled) => {
                    // First writer wins; a concurrent load of the same id
                    // keeps the earlier entry.
                    let mut guard = cache();
                    guard
                        .entry(id.to_string())
                        .or_insert_with(|| Arc::new(compiled));
                    tracing::debug!(template = id, "Template compiled and cached");
                }
                Err(e) => {
                    tracing::warn!(template = id, error = %e, "Skipping template: compile failed");
                }
            }
        }

        ids.iter()
            .filter_map(|&id| self.get(id).map(|t| (id.to_string(), t)))
            .collect()
    }

    /// Look up a cached template.
    pub fn get(&self, id: &str) -> Option<Arc<CompiledTemplate>> {
        cache().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        cache().contains_key(id)
    }

    /// Render a cached template with invoice data.
    ///
    /// Fails with [`TemplateError::NotFound`] when the id is absent from the
    /// cache.
    pub fn render(&self, id: &str, invoice: &InvoiceDocument) -> Result<String, TemplateError> {
        let template = self
            .get(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        template.render(invoice)
    }
}
