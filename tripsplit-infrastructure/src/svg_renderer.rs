use resvg::usvg::{self, Options, Tree, fontdb::Database};
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tiny_skia::{Pixmap, Transform};

/// Exported tables are rasterized at twice their SVG size.
const SCALE: f32 = 2.0;

/// Installed families tried, in order, for the tables' `sans-serif` text.
const SANS_SERIF_CANDIDATES: &[&str] = &[
    "Inter",
    "Noto Sans",
    "DejaVu Sans",
    "Liberation Sans",
    "Helvetica",
    "Arial",
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid SVG: {0}")]
    Parse(#[from] usvg::Error),
    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

static OPTIONS: LazyLock<Options> = LazyLock::new(|| {
    let mut fontdb = Database::new();
    fontdb.load_system_fonts();

    // The tables only ask for `sans-serif`; bind it to the first installed
    // candidate so names and amounts line up with the measured column widths.
    let installed = SANS_SERIF_CANDIDATES.iter().copied().find(|candidate| {
        fontdb
            .faces()
            .any(|face| face.families.iter().any(|(name, _)| name == candidate))
    });
    match installed {
        Some(family) => fontdb.set_sans_serif_family(family),
        None => tracing::warn!(
            faces = fontdb.len(),
            "No preferred sans-serif font installed; PNG text may be missing"
        ),
    }

    Options {
        fontdb: Arc::new(fontdb),
        ..Options::default()
    }
});

/// Rasterizes an exported settlement document to PNG bytes.
pub fn svg_to_png(svg: &str) -> Result<Vec<u8>, RenderError> {
    let tree = Tree::from_str(svg, &OPTIONS)?;
    let size = tree.size();
    let width = (size.width() * SCALE).ceil() as u32;
    let height = (size.height() * SCALE).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })?;
    resvg::render(
        &tree,
        Transform::from_scale(SCALE, SCALE),
        &mut pixmap.as_mut(),
    );
    let png = pixmap
        .encode_png()
        .map_err(|err| RenderError::Encode(err.to_string()))?;

    tracing::debug!(width, height, bytes = png.len(), "Rendered PNG");
    Ok(png)
}
