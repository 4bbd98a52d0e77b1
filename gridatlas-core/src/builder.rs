//! Atlas builder: decode every eligible source, lay them out on a uniform grid, write one image.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use crate::error::{AtlasError, Result};
use crate::layout::GridLayout;
use crate::report::Reporter;
use crate::scan::{self, Eligibility, Ordering};
use crate::source::{self, SourceImage};

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub columns: Option<NonZeroU32>,
    pub eligibility: Eligibility,
    pub ordering: Ordering,
}

/// Where one source landed in the atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub id: PathBuf,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone)]
pub struct Atlas {
    pub layout: GridLayout,
    pub canvas: RgbaImage,
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    NoInputs,
    Written { layout: GridLayout, placements: Vec<Placement> },
}

fn placements_for<'a>(layout: &GridLayout, ids: impl IntoIterator<Item = &'a Path>) -> Vec<Placement> {
    ids.into_iter()
        .zip(0u32..)
        .map(|(id, i)| {
            let (x, y) = layout.origin_of(i);
            Placement { id: id.to_path_buf(), x, y }
        })
        .collect()
}

/// Places `sources` on a transparent canvas in the given order. `Ok(None)` for no sources.
pub fn compose(sources: &[SourceImage], columns: Option<NonZeroU32>) -> Result<Option<Atlas>> {
    let sizes: Vec<_> = sources.iter().map(SourceImage::size).collect();
    let Some(layout) = GridLayout::compute(&sizes, columns)? else { return Ok(None) };
    let (width, height) = layout.canvas_size();
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let placements = placements_for(&layout, sources.iter().map(|s| s.id.as_path()));
    for (src, p) in sources.iter().zip(&placements) {
        // replace, not blend: the source's own alpha is copied as-is
        image::imageops::replace(&mut canvas, &src.pixels, i64::from(p.x), i64::from(p.y));
    }
    Ok(Some(Atlas { layout, canvas, placements }))
}

// True when `output` would be written straight into `input_dir`.
fn lands_in(input_dir: &Path, output: &Path) -> bool {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (input_dir.canonicalize(), parent.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn eligible_inputs(input_dir: &Path, output: Option<&Path>, options: &BuildOptions) -> Result<Vec<PathBuf>> {
    let mut filter = options.eligibility.clone();
    if let Some(output) = output.filter(|out| lands_in(input_dir, out)) {
        if let Some(name) = output.file_name() {
            filter = filter.excluding(name.to_string_lossy());
        }
    }
    scan::list_inputs(input_dir, &filter, options.ordering)
}

/// Computes the layout and placements from image headers only. Nothing is written.
pub fn plan<P: AsRef<Path>>(input_dir: P, options: &BuildOptions) -> Result<Option<(GridLayout, Vec<Placement>)>> {
    let paths = eligible_inputs(input_dir.as_ref(), None, options)?;
    let sizes = paths.iter().map(source::probe_size).collect::<Result<Vec<_>>>()?;
    Ok(GridLayout::compute(&sizes, options.columns)?.map(|layout| {
        let placements = placements_for(&layout, paths.iter().map(PathBuf::as_path));
        (layout, placements)
    }))
}

pub fn build<P, Q>(input_dir: P, output: Q, options: &BuildOptions, reporter: &mut dyn Reporter) -> Result<BuildOutcome>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (input_dir, output) = (input_dir.as_ref(), output.as_ref());
    let paths = eligible_inputs(input_dir, Some(output), options)?;
    let sources = source::load_all(&paths)?;

    let Some(atlas) = compose(&sources, options.columns)? else {
        tracing::info!(dir = %input_dir.display(), "no eligible images");
        reporter.no_inputs();
        return Ok(BuildOutcome::NoInputs);
    };
    let (width, height) = atlas.layout.canvas_size();
    tracing::info!(
        images = sources.len(),
        columns = atlas.layout.columns,
        rows = atlas.layout.rows,
        width,
        height,
        "composed atlas"
    );
    for p in &atlas.placements {
        reporter.placed(p);
    }

    atlas
        .canvas
        .save(output)
        .map_err(|source| AtlasError::Encode { path: output.to_path_buf(), source })?;
    tracing::info!(path = %output.display(), "atlas written");
    reporter.saved(output);

    Ok(BuildOutcome::Written { layout: atlas.layout, placements: atlas.placements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Event, RecordingReporter};
    use image::GenericImageView;

    fn solid(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
        RgbaImage::from_pixel(w, h, Rgba(rgba)).save(path).unwrap();
    }

    fn sorted() -> BuildOptions {
        BuildOptions { ordering: Ordering::Lexicographic, ..Default::default() }
    }

    fn src(id: &str, w: u32, h: u32, rgba: [u8; 4]) -> SourceImage {
        SourceImage { id: id.into(), pixels: RgbaImage::from_pixel(w, h, Rgba(rgba)) }
    }

    #[test]
    fn compose_three_images() {
        let sources = [
            src("a", 32, 32, [255, 0, 0, 255]),
            src("b", 16, 32, [0, 255, 0, 255]),
            src("c", 32, 16, [0, 0, 255, 255]),
        ];
        let atlas = compose(&sources, None).unwrap().unwrap();
        assert_eq!(atlas.canvas.dimensions(), (64, 64));
        let origins: Vec<_> = atlas.placements.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(origins, [(0, 0), (32, 0), (0, 32)]);

        assert_eq!(atlas.canvas.get_pixel(31, 31).0, [255, 0, 0, 255]);
        assert_eq!(atlas.canvas.get_pixel(32, 0).0, [0, 255, 0, 255]);
        assert_eq!(atlas.canvas.get_pixel(47, 31).0, [0, 255, 0, 255]);
        // right half of b's cell is padding
        assert_eq!(atlas.canvas.get_pixel(48, 0).0, [0, 0, 0, 0]);
        assert_eq!(atlas.canvas.get_pixel(31, 47).0, [0, 0, 255, 255]);
        assert_eq!(atlas.canvas.get_pixel(0, 48).0, [0, 0, 0, 0]);
        // unused cell (1, 1)
        assert!(atlas.canvas.view(32, 32, 32, 32).pixels().all(|(_, _, px)| px.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn compose_copies_alpha_without_blending() {
        let sources = [src("glass", 2, 2, [10, 20, 30, 40])];
        let atlas = compose(&sources, None).unwrap().unwrap();
        assert_eq!(atlas.canvas.get_pixel(1, 1).0, [10, 20, 30, 40]);
    }

    #[test]
    fn compose_is_deterministic() {
        let sources = [src("a", 5, 7, [1, 1, 1, 255]), src("b", 9, 2, [2, 2, 2, 255]), src("c", 3, 3, [3, 3, 3, 255])];
        let cols = NonZeroU32::new(2);
        let first = compose(&sources, cols).unwrap().unwrap();
        let second = compose(&sources, cols).unwrap().unwrap();
        assert_eq!(first.placements, second.placements);
        assert_eq!(first.canvas, second.canvas);
    }

    #[test]
    fn compose_nothing() {
        assert!(compose(&[], None).unwrap().is_none());
    }

    #[test]
    fn build_writes_atlas_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        solid(&dir.path().join("a.png"), 32, 32, [255, 0, 0, 255]);
        solid(&dir.path().join("b.png"), 16, 32, [0, 255, 0, 255]);
        solid(&dir.path().join("c.png"), 32, 16, [0, 0, 255, 255]);
        let out = dir.path().join("blocks_atlas.png");

        let mut rec = RecordingReporter::default();
        let outcome = build(dir.path(), &out, &sorted(), &mut rec).unwrap();

        let BuildOutcome::Written { layout, placements } = outcome else { panic!("expected an atlas") };
        assert_eq!((layout.columns, layout.rows), (2, 2));
        assert_eq!(placements.len(), 3);
        let written = image::open(&out).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (64, 64));
        assert_eq!(written.get_pixel(0, 32).0, [0, 0, 255, 255]);

        let a = dir.path().join("a.png");
        assert_eq!(rec.events[0], Event::Placed(Placement { id: a.clone(), x: 0, y: 0 }));
        assert_eq!(rec.lines()[0], format!("{}: (0, 0)", a.display()));
        assert_eq!(rec.events.last(), Some(&Event::Saved(out.clone())));
        assert_eq!(rec.events.len(), 4);

        // a rerun must not pick up the atlas it just wrote
        let mut rec = RecordingReporter::default();
        let again = build(dir.path(), &out, &sorted(), &mut rec).unwrap();
        assert_eq!(again, BuildOutcome::Written { layout, placements });
    }

    #[test]
    fn output_name_without_suffix_is_still_excluded() {
        let dir = tempfile::tempdir().unwrap();
        solid(&dir.path().join("a.png"), 4, 4, [9, 9, 9, 255]);
        let out = dir.path().join("sheet.png");
        build(dir.path(), &out, &sorted(), &mut RecordingReporter::default()).unwrap();

        let plan = plan(dir.path(), &sorted()).unwrap().unwrap();
        assert_eq!(plan.1.len(), 2, "plan has no output to exclude");
        let outcome = build(dir.path(), &out, &sorted(), &mut RecordingReporter::default()).unwrap();
        let BuildOutcome::Written { placements, .. } = outcome else { panic!() };
        assert_eq!(placements.len(), 1);
    }

    #[test]
    fn output_name_only_hides_that_exact_file() {
        let dir = tempfile::tempdir().unwrap();
        solid(&dir.path().join("spritesheet.png"), 4, 4, [1, 1, 1, 255]);
        solid(&dir.path().join("grass.png"), 4, 4, [2, 2, 2, 255]);
        let out = dir.path().join("sheet.png");

        let outcome = build(dir.path(), &out, &sorted(), &mut RecordingReporter::default()).unwrap();
        let BuildOutcome::Written { placements, .. } = outcome else { panic!("expected an atlas") };
        let ids: Vec<_> = placements.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, [dir.path().join("grass.png"), dir.path().join("spritesheet.png")]);
    }

    #[test]
    fn output_elsewhere_does_not_hide_same_named_input() {
        let dir = tempfile::tempdir().unwrap();
        let textures = dir.path().join("textures");
        std::fs::create_dir(&textures).unwrap();
        solid(&textures.join("stone.png"), 4, 4, [3, 3, 3, 255]);
        let out = dir.path().join("stone.png");

        let outcome = build(&textures, &out, &sorted(), &mut RecordingReporter::default()).unwrap();
        let BuildOutcome::Written { placements, .. } = outcome else { panic!("expected an atlas") };
        assert_eq!(placements, [Placement { id: textures.join("stone.png"), x: 0, y: 0 }]);
        assert!(out.exists());
    }

    #[test]
    fn huge_column_override_is_an_error() {
        let sources = [src("tile", 8, 8, [5, 5, 5, 255])];
        let err = compose(&sources, NonZeroU32::new(1 << 30)).unwrap_err();
        assert!(matches!(err, AtlasError::CanvasTooLarge { .. }));

        let dir = tempfile::tempdir().unwrap();
        solid(&dir.path().join("tile.png"), 8, 8, [5, 5, 5, 255]);
        let opts = BuildOptions { columns: NonZeroU32::new(1 << 30), ..sorted() };
        assert!(matches!(plan(dir.path(), &opts), Err(AtlasError::CanvasTooLarge { .. })));
        let out = dir.path().join("blocks_atlas.png");
        let err = build(dir.path(), &out, &opts, &mut RecordingReporter::default()).unwrap_err();
        assert!(matches!(err, AtlasError::CanvasTooLarge { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn empty_dir_is_a_quiet_success() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        let out = dir.path().join("blocks_atlas.png");
        let mut rec = RecordingReporter::default();

        assert_eq!(build(dir.path(), &out, &BuildOptions::default(), &mut rec).unwrap(), BuildOutcome::NoInputs);
        assert!(!out.exists());
        assert_eq!(rec.events, [Event::NoInputs]);
    }

    #[test]
    fn decode_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        solid(&dir.path().join("a.png"), 4, 4, [1, 2, 3, 255]);
        std::fs::write(dir.path().join("b.png"), b"corrupt").unwrap();
        let out = dir.path().join("blocks_atlas.png");
        let mut rec = RecordingReporter::default();

        let err = build(dir.path(), &out, &sorted(), &mut rec).unwrap_err();
        assert!(matches!(err, AtlasError::Decode { ref path, .. } if path.ends_with("b.png")));
        assert!(!out.exists());
        assert!(rec.events.is_empty());
    }

    #[test]
    fn missing_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = build(dir.path().join("missing"), dir.path().join("o.png"), &BuildOptions::default(), &mut RecordingReporter::default())
            .unwrap_err();
        assert!(matches!(err, AtlasError::InputNotFound { .. }));
    }

    #[test]
    fn unwritable_output_is_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        solid(&dir.path().join("a.png"), 2, 2, [1, 1, 1, 255]);
        let out = dir.path().join("no_such_dir").join("atlas.png");
        let err = build(dir.path(), &out, &BuildOptions::default(), &mut RecordingReporter::default()).unwrap_err();
        assert!(matches!(err, AtlasError::Encode { .. }));
    }

    #[test]
    fn column_override_and_plan_agree() {
        let dir = tempfile::tempdir().unwrap();
        for (i, name) in ["a.png", "b.png", "c.png", "d.png", "e.png"].iter().enumerate() {
            solid(&dir.path().join(name), 8 + i as u32, 4, [0, 0, 0, 255]);
        }
        let opts = BuildOptions { columns: NonZeroU32::new(5), ..sorted() };
        let (layout, planned) = plan(dir.path(), &opts).unwrap().unwrap();
        assert_eq!((layout.columns, layout.rows, layout.cell_width), (5, 1, 12));

        let out = dir.path().join("row_atlas.png");
        let BuildOutcome::Written { placements, .. } = build(dir.path(), &out, &opts, &mut RecordingReporter::default()).unwrap() else {
            panic!()
        };
        assert_eq!(planned, placements);
        assert_eq!(placements[4], Placement { id: dir.path().join("e.png"), x: 48, y: 0 });
        assert_eq!(image::image_dimensions(&out).unwrap(), (60, 4));
    }
}
