//! Shared state for the form handlers.

use super::form::FORM_TEMPLATE;
use crate::error::PipelineError;
use crate::inference::Predictor;
use handlebars::Handlebars;
use std::sync::Arc;
use tracing::{Span, info_span};

/// Name the form page is registered under.
pub const FORM_PAGE: &str = "form";

/// Everything a request handler needs, built once at startup.
///
/// The predictor is fixed for the lifetime of the context; swapping models
/// means building a new context.
pub struct AppContext {
    pub predictor: Arc<dyn Predictor>,
    /// Parent span for request logging.
    pub span: Span,
    pub templates: Handlebars<'static>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("predictor", &self.predictor.name())
            .finish()
    }
}

impl AppContext {
    pub fn new(predictor: Arc<dyn Predictor>) -> Result<Self, PipelineError> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(false);
        templates
            .register_template_string(FORM_PAGE, FORM_TEMPLATE)
            .map_err(Box::new)?;

        let span = info_span!("serving", predictor = predictor.name());
        Ok(Self {
            predictor,
            span,
            templates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::FallbackPredictor;

    #[test]
    fn test_context_registers_form() {
        let ctx = AppContext::new(Arc::new(FallbackPredictor::MODEL_ABSENT)).unwrap();
        assert!(ctx.templates.has_template(FORM_PAGE));
        assert_eq!(ctx.predictor.name(), "fallback_sum_threshold");
    }
}
