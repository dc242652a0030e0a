use tracing::trace;

use super::provider::{LayoutRegistry, LayoutSlots};
use super::settings::LayoutSettings;
use crown_core::{Content, CrownError, CrownResult, Response, ResponseFilter};

/// Wraps markup responses in the configured layout.
///
/// JSON responses pass through untouched, as does everything while layout
/// is disabled.
#[derive(Debug, Clone)]
pub struct LayoutFilter {
    settings: LayoutSettings,
    layouts: LayoutRegistry,
}

impl LayoutFilter {
    /// Creates a filter reading from the shared `settings` and `layouts`.
    pub fn new(settings: LayoutSettings, layouts: LayoutRegistry) -> Self {
        Self { settings, layouts }
    }
}

impl ResponseFilter for LayoutFilter {
    fn name(&self) -> &str {
        "layout"
    }

    fn process_response(&self, mut response: Response) -> CrownResult<Response> {
        if self.settings.is_disabled() {
            return Ok(response);
        }
        let Some(markup) = response.content().as_markup() else {
            return Ok(response);
        };

        let name = self.settings.layout_name();
        let layout = self
            .layouts
            .get(&name)
            .ok_or_else(|| CrownError::layout_not_found(name.as_str()))?;

        let slots = LayoutSlots {
            head: self.settings.head_items_as_html(),
            body: self.settings.body_items_as_html(),
        };
        let html = layout.wrap(markup, &slots);
        trace!(layout = %name, "Layout applied");

        response.set_content(Content::Markup(html));
        Ok(response)
    }
}
