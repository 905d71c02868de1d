use std::collections::BTreeMap;

use tracing::{debug, warn};
use umbra_config::colors::is_dark_background;
use umbra_config::methods::BASE_STYLESHEET;
use umbra_config::{MethodCatalog, Preferences};
use umbra_inject::{
    Background, FrameLevel, RenderAxes, RenderParams, StylesheetKey, Template, TemplateSource,
};

use super::PropagateError;

/// Darkness of the configured colours. Colours that do not parse count
/// as a light background so a bad colour never fails a cycle.
fn background_of(prefs: &Preferences) -> Background {
    match is_dark_background(
        &prefs.default_background_color,
        &prefs.default_foreground_color,
    ) {
        Ok(dark) => Background::from_is_dark(dark),
        Err(e) => {
            warn!(error = %e, "cannot compare configured colours, assuming a light background");
            Background::Light
        }
    }
}

fn params_for(prefs: &Preferences, frame: FrameLevel, background: Background) -> RenderParams {
    RenderParams::new(prefs.string_values(), RenderAxes::new(frame, background))
}

/// Render every stylesheet used by `catalog`, once per frame level.
///
/// Either every stylesheet renders or an error is returned; nothing
/// partial escapes.
pub async fn render_stylesheets(
    templates: &dyn TemplateSource,
    catalog: &MethodCatalog,
    prefs: &Preferences,
) -> Result<BTreeMap<String, String>, PropagateError> {
    let background = background_of(prefs);
    let params: Vec<(FrameLevel, RenderParams)> = FrameLevel::ALL
        .into_iter()
        .map(|frame| (frame, params_for(prefs, frame, background)))
        .collect();

    let mut rendered = BTreeMap::new();
    for path in catalog.stylesheets() {
        let template = Template::parse(&templates.load(path).await?);
        for (frame, params) in &params {
            rendered.insert(
                StylesheetKey::new(path, *frame).to_string(),
                template.render(params),
            );
        }
    }
    debug!(count = rendered.len(), ?background, "rendered stylesheets");
    Ok(rendered)
}

pub(super) async fn render_base_style(
    templates: &dyn TemplateSource,
    prefs: &Preferences,
) -> Result<String, PropagateError> {
    let params = params_for(prefs, FrameLevel::TopLevel, background_of(prefs));
    let text = templates.load(BASE_STYLESHEET).await?;
    Ok(Template::parse(&text).render(&params))
}
