//! End-to-end composition tests.
//!
//! Scenes are measured and drawn through `MonospaceMetrics` and the
//! recording surface, so layout assertions do not depend on installed
//! fonts. Only the encode tests go through the raster backend.

use collage::layout::{LABEL_PAD, LayoutContext, ShapeSearch};
use collage::text::LINE_SPACING;
use collage::{
    CanvasPlan, ComposeError, Config, Engine, ImageBlock, MonospaceMetrics, OUTER_PAD, Pane,
    RecordingSurface, Scene, Size, TextBlock, Tile,
};
use image::{Rgba, RgbaImage};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn metrics() -> MonospaceMetrics {
    // 8px advance, 12px line height
    MonospaceMetrics::with_advance(8.0, 12.0)
}

fn photo(width: u32, height: u32, caption: &str) -> ImageBlock {
    ImageBlock::from_image(RgbaImage::from_pixel(width, height, Rgba([30, 60, 90, 255])), caption)
}

/// Height of a 300px-wide image tile with a one-line caption.
fn tile_height(image_height: f32) -> f32 {
    image_height + 12.0 * LINE_SPACING + LABEL_PAD
}

/// Drives one scene through measure and record.
struct ComposeTest {
    engine: Engine,
    surface: RecordingSurface,
}

impl ComposeTest {
    fn new(config: Config) -> Self {
        init_tracing();
        Self {
            engine: Engine::new(config),
            surface: RecordingSurface::new(metrics()),
        }
    }

    fn render(&mut self, scene: &Scene) -> CanvasPlan {
        self.engine
            .render_with(scene, &mut self.surface)
            .expect("render failed")
    }
}

#[test]
fn hello_world_is_one_column() {
    let scene = Scene::new(Pane::new().push(TextBlock::plain("Hello, World!")));
    let mut test = ComposeTest::new(Config::default());
    let plan = test.render(&scene);

    let shape = scene.main().shape().expect("shape memoized");
    assert_eq!(shape.column_count(), 1);
    assert_eq!(shape.tile_count(), 1);
    assert_eq!(plan.content, Size::new(300.0, 12.0));
    assert_eq!(
        (plan.width, plan.height),
        (300 + 2 * OUTER_PAD as u32, 12 + 2 * OUTER_PAD as u32)
    );

    let texts: Vec<_> = test.surface.texts().collect();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, "Hello, World!");
}

#[test]
fn identical_images_choose_minimal_score() {
    let mut pane = Pane::new();
    for i in 0..8 {
        pane = pane.push(photo(485, 485, &format!("photo {i}")));
    }
    let scene = Scene::new(pane);
    let mut test = ComposeTest::new(Config::default());
    test.render(&scene);

    // identical tiles fill columns round-robin: ceil(8/k) tiles in the tallest
    let h = tile_height(300.0);
    let brute_force = (1..=8usize)
        .map(|k| {
            let rows = 8usize.div_ceil(k) as f32;
            let width = k as f32 * 300.0 + (k - 1) as f32 * 10.0;
            let height = rows * h + (rows - 1.0) * 10.0;
            let score = width * height * (width / height).max(height / width);
            (k, score)
        })
        .fold((0, f32::INFINITY), |best, (k, score)| if score < best.1 { (k, score) } else { best });

    let shape = scene.main().shape().expect("shape memoized");
    assert_eq!(shape.column_count(), brute_force.0);
    assert_eq!(shape.column_count(), 3);
    assert_eq!(shape.tile_count(), 8);
}

#[test]
fn search_candidates_cover_every_column_count() {
    let tiles: Vec<Box<dyn Tile>> = (0..5).map(|i| Box::new(photo(300, 200 + i * 40, "c")) as Box<dyn Tile>).collect();
    let mut m = metrics();
    let mut cx = LayoutContext::new(&mut m);
    let search = ShapeSearch::new(&tiles, &mut cx, Default::default()).unwrap();

    let candidates = search.candidates();
    let best = search.run().unwrap();
    assert_eq!(candidates.len(), 5);
    assert!(candidates.iter().all(|c| best.score <= c.score));
}

#[test]
fn explicit_layout_is_kept() {
    let left: Vec<Box<dyn Tile>> = vec![Box::new(photo(300, 300, "a")), Box::new(photo(300, 300, "b"))];
    let right: Vec<Box<dyn Tile>> = vec![Box::new(TextBlock::plain("notes"))];
    let scene = Scene::new(Pane::with_columns(vec![left, right]));

    let mut test = ComposeTest::new(Config::default());
    let plan = test.render(&scene);

    let columns = scene.main().shape().unwrap().columns();
    assert_eq!(columns[0].tiles(), &[0, 1]);
    assert_eq!(columns[1].tiles(), &[2]);
    assert_eq!(plan.content, Size::new(610.0, 2.0 * tile_height(300.0) + 10.0));

    let origins: Vec<_> = test.surface.images().map(|(origin, _)| origin).collect();
    assert_eq!(origins[0].x, OUTER_PAD);
    assert_eq!(origins[1].y, OUTER_PAD + tile_height(300.0) + 10.0);

    let notes = test.surface.texts().find(|(text, _)| *text == "notes").unwrap();
    assert_eq!(notes.1.x, OUTER_PAD + 310.0);
    assert_eq!(notes.1.y, OUTER_PAD);
}

#[test]
fn nested_panes_compose() {
    let inner = Pane::new().push(photo(300, 300, "inner a")).push(photo(300, 300, "inner b"));
    let outer = Pane::new()
        .push(TextBlock::wrapped("A caption for the whole collage"))
        .push(inner);
    let scene = Scene::new(outer);

    let mut test = ComposeTest::new(Config::default());
    let plan = test.render(&scene);

    assert!(scene.main().shape().is_some());
    assert!(plan.content.is_drawable());
    assert_eq!(test.surface.images().count(), 2);
    assert_eq!(test.surface.transform_depth(), 0);
}

#[test]
fn oversize_scene_is_downscaled_uniformly() {
    let scene = Scene::new(
        Pane::new()
            .push(photo(300, 300, "a"))
            .push(photo(300, 300, "b"))
            .push(photo(300, 300, "c"))
            .push(photo(300, 300, "d")),
    );
    let mut test = ComposeTest::new(Config::default().max_canvas(400, 0));
    let plan = test.render(&scene);

    assert_eq!(plan.padded.width, 630.0);
    assert_eq!(plan.scale, 400.0 / 630.0);
    assert_eq!(plan.width, 400);
    assert_eq!(plan.height, (plan.padded.height * plan.scale).ceil() as u32);

    for (_, size) in test.surface.images() {
        assert_eq!(size.width, 300.0 * plan.scale);
        assert_eq!(size.width, size.height);
    }
}

#[test]
fn memoized_shape_survives_render() {
    let scene = Scene::new(Pane::new().push(photo(200, 400, "tall")).push(photo(400, 200, "wide")));
    let engine = Engine::default();

    let first = engine.measure(&scene, &mut metrics()).unwrap();
    let shape = scene.main().shape().cloned().unwrap();
    let mut surface = RecordingSurface::new(metrics());
    let second = engine.render_with(&scene, &mut surface).unwrap();

    assert_eq!(first, second);
    assert_eq!(scene.main().shape(), Some(&shape));
}

#[test]
fn empty_scene_is_layout_error() {
    let mut surface = RecordingSurface::new(metrics());
    let err = Engine::default().render_with(&Scene::default(), &mut surface).unwrap_err();
    assert!(matches!(err, ComposeError::Layout(_)));
}

#[test]
fn missing_font_fails_render() {
    let config = Config::default().font_path("/nonexistent/font.ttf");
    let scene = Scene::new(Pane::new().push(TextBlock::plain("x")));
    let err = Engine::new(config).render(&scene).unwrap_err();
    assert!(matches!(err, ComposeError::FontLoad { .. }));
}

#[test]
fn render_and_save_png_and_jpeg() {
    init_tracing();
    let scene = Scene::new(Pane::new().push(photo(120, 80, "")).push(photo(80, 120, "")));
    let config = Config::from_json_str(r#"{ "max_canvas_width": 200, "bg_color": { "r": 0.0, "g": 0.0, "b": 0.0 } }"#)
        .unwrap();
    let canvas = Engine::new(config).render(&scene).unwrap();
    assert!(canvas.width() <= 200);

    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("out.png");
    let jpg = dir.path().join("out.jpg");
    canvas.save(&png).unwrap();
    canvas.save(&jpg).unwrap();

    for path in [png, jpg] {
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (canvas.width(), canvas.height()));
    }

    // corner is outer padding, so it keeps the background
    assert_eq!(canvas.raw().get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
}
