//! Sequential resolution of the navigation slug chain.
//!
//! Each level's endpoint depends on its parent, so the lookups are
//! strictly sequential, never speculative. Later lookups use the
//! canonical slugs returned by earlier ones, not the raw navigation
//! input, so a redirected or renamed slug cannot make the chain drift.

use tracing::{debug, info};

use vitrin_shared::types::{CategoryPath, SlugPath, TaxonLevel, TaxonNode};

use crate::api::ListingApi;
use crate::error::{NetError, TaxonomyError};

fn at_level(
    result: Result<TaxonNode, NetError>,
    level: TaxonLevel,
    slug: &str,
) -> Result<TaxonNode, TaxonomyError> {
    match result {
        Ok(node) => {
            debug!(%level, slug = %node.slug, id = node.id, "resolved");
            Ok(node)
        }
        Err(NetError::NotFound) => Err(TaxonomyError::NotFound {
            level,
            slug: slug.to_string(),
        }),
        Err(e) => Err(TaxonomyError::Net(e)),
    }
}

/// Resolve a slug chain to its canonical [`CategoryPath`].
///
/// An absent intermediate slug ends the chain early: the form then runs
/// against the generic categorization for the deepest resolved node.
/// A not-found at any attempted level is fatal for the session.
pub async fn resolve_path<A: ListingApi>(
    api: &A,
    slugs: &SlugPath,
) -> Result<CategoryPath, TaxonomyError> {
    let category = at_level(
        api.category(&slugs.category_slug).await,
        TaxonLevel::Category,
        &slugs.category_slug,
    )?;

    let mut path = CategoryPath {
        category,
        brand: None,
        model: None,
        variant: None,
    };

    let Some(brand_slug) = slugs.brand_slug.as_deref() else {
        return Ok(path);
    };
    let brand = at_level(
        api.brand(&path.category.slug, brand_slug).await,
        TaxonLevel::Brand,
        brand_slug,
    )?;
    let brand_canonical = brand.slug.clone();
    path.brand = Some(brand);

    let Some(model_slug) = slugs.model_slug.as_deref() else {
        return Ok(path);
    };
    let model = at_level(
        api.model(&path.category.slug, &brand_canonical, model_slug)
            .await,
        TaxonLevel::Model,
        model_slug,
    )?;
    let model_canonical = model.slug.clone();
    path.model = Some(model);

    let Some(variant_slug) = slugs.variant_slug.as_deref() else {
        return Ok(path);
    };
    let variant = at_level(
        api.variant(
            &path.category.slug,
            &brand_canonical,
            &model_canonical,
            variant_slug,
        )
        .await,
        TaxonLevel::Variant,
        variant_slug,
    )?;
    path.variant = Some(variant);

    info!(
        category = %path.category.slug,
        deepest = %path.deepest().slug,
        "taxonomy path resolved"
    );
    Ok(path)
}
