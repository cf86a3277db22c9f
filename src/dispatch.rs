use crate::error::CfpError;
use crate::extract::PageSource;
use crate::models::{Annotation, Request};
use crate::tagger::{ModelStore, TaggerContext};

/// Validate the request, load the selected tagger, fetch the page once and
/// tag its call-for-papers text.
///
/// Nothing touches the network or the model files until `url` and `model`
/// have been validated.
pub async fn run<S>(
    url: &str,
    model: Option<&str>,
    source: &S,
    store: &ModelStore,
) -> Result<Vec<Annotation>, CfpError>
where
    S: PageSource + ?Sized,
{
    let request = Request::parse(url, model)?;
    tracing::info!(url = %request.url, model = %request.model, "starting run");

    let context = TaggerContext::load(request.model, store)?;

    let text = source.page_text(&request.url).await?;
    if text.trim().is_empty() {
        return Err(CfpError::EmptyContent(format!(
            "{} has no call-for-papers text",
            request.url
        )));
    }
    tracing::info!(chars = text.len(), "extracted call-for-papers text");

    let annotations = context.tagger().tag(&text);
    tracing::info!(entities = annotations.len(), "tagging finished");
    Ok(annotations)
}
