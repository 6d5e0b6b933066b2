use anyhow::Result;
use df_core::color::Rgb;
use df_core::interpolate::clamp;
use df_core::params::DotFilterParams;
use df_core::source::RenderSource;
use df_core::traits::{DrawContext, PixelSampler, RandomSource};

/// Points visés pour une densité de 1.
pub const DOTS_AT_FULL_DENSITY: f64 = 5000.0;
/// Tentatives autorisées par point visé.
pub const ATTEMPTS_PER_DOT: usize = 20;
/// Plafond absolu de tentatives, quelle que soit la densité.
pub const MAX_ATTEMPTS: usize = 100_000;
/// Image mode accepts samples whose alpha is strictly above this.
pub const ALPHA_THRESHOLD: u8 = 10;
/// Taille du texte source (em, en pixels).
pub const TEXT_SIZE: f32 = 64.0;
/// Fond de la surface visible.
pub const BACKGROUND: Rgb = Rgb::WHITE;

/// Bilan d'un rendu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Dots the density asked for.
    pub budget: usize,
    /// Positions drawn from the random source.
    pub attempts: usize,
    /// Dots actually painted.
    pub dots_drawn: usize,
}

impl RenderStats {
    /// `true` when the attempt cap stopped the loop before the budget was met.
    #[must_use]
    pub fn cap_reached(&self) -> bool {
        self.dots_drawn < self.budget
    }
}

/// `floor(5000 · density)`, density clamped to `[0, 1]`.
///
/// # Example
/// ```
/// use df_render::dots::dot_budget;
/// assert_eq!(dot_budget(0.8), 4000);
/// assert_eq!(dot_budget(2.0), 5000);
/// ```
#[must_use]
pub fn dot_budget(density: f64) -> usize {
    (DOTS_AT_FULL_DENSITY * clamp(density, 0.0, 1.0)).floor() as usize
}

/// `min(budget · 20, 100 000)`.
#[must_use]
pub fn attempt_cap(budget: usize) -> usize {
    budget.saturating_mul(ATTEMPTS_PER_DOT).min(MAX_ATTEMPTS)
}

/// Prédicat d'acceptation, une branche par type de source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleMode {
    /// Text: the red channel is exactly 255 (inside a glyph).
    Glyph,
    /// Image: the alpha channel is above [`ALPHA_THRESHOLD`].
    Alpha,
}

impl SampleMode {
    /// Mode matching `source`.
    #[must_use]
    pub fn for_source(source: &RenderSource) -> Self {
        match source {
            RenderSource::Text { .. } => Self::Glyph,
            RenderSource::Image { .. } => Self::Alpha,
        }
    }

    /// Whether a scratch pixel counts as "on".
    #[inline]
    #[must_use]
    pub fn accepts(self, rgba: [u8; 4]) -> bool {
        match self {
            Self::Glyph => rgba[0] == 255,
            Self::Alpha => rgba[3] > ALPHA_THRESHOLD,
        }
    }
}

/// Échantillonnage par rejet : peint des points de `params.color` là où la
/// source est « allumée ».
///
/// The surface is cleared to white, the source is drawn into a fresh scratch
/// buffer, then random positions are drawn until the budget is met or the
/// attempt cap is hit. Each accepted position gets a disc whose diameter is
/// uniform in `[size/2, size)`. `spacing` does not constrain placement.
///
/// Random draws happen in a fixed order (x, y, then diameter when accepted)
/// so a seeded source reproduces a render exactly.
///
/// # Errors
/// Fails only when the scratch buffer cannot be built (no font for a
/// non-empty text, image that cannot be scaled). Hitting the attempt cap is
/// not an error.
pub fn render_dots<C, R>(
    ctx: &mut C,
    source: &RenderSource,
    params: &DotFilterParams,
    rng: &mut R,
    text_size: f32,
) -> Result<RenderStats>
where
    C: DrawContext,
    R: RandomSource + ?Sized,
{
    let params = params.clamped();
    ctx.clear(BACKGROUND);

    let scratch = match source {
        RenderSource::Text { content } => ctx.text_scratch(content, text_size)?,
        RenderSource::Image { pixels } => ctx.image_scratch(pixels)?,
    };
    let mode = SampleMode::for_source(source);
    let (width, height) = scratch.dimensions();

    let budget = dot_budget(params.density);
    let cap = attempt_cap(budget);
    let mut stats = RenderStats {
        budget,
        ..RenderStats::default()
    };
    if width == 0 || height == 0 {
        return Ok(stats);
    }

    ctx.set_fill(params.color);
    let (w, h) = (f64::from(width), f64::from(height));
    let (min_d, max_d) = (params.size * 0.5, params.size);

    while stats.dots_drawn < budget && stats.attempts < cap {
        let x = rng.uniform(0.0, w);
        let y = rng.uniform(0.0, h);
        stats.attempts += 1;

        if mode.accepts(scratch.sample(x as u32, y as u32)) {
            let d = rng.uniform(min_d, max_d);
            ctx.fill_ellipse(x, y, d, d);
            stats.dots_drawn += 1;
        }
    }

    log::debug!(
        "Rendu {width}×{height} : {} tentatives, {}/{} points",
        stats.attempts,
        stats.dots_drawn,
        stats.budget
    );
    Ok(stats)
}
