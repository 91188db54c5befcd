//! End-to-end tests: script text → entries → canvases → PNG files.
//!
//! All rendering uses the block font back end, so results do not depend on
//! which fonts the machine has installed.

use pretty_assertions::assert_eq;
use std::path::PathBuf;

use sublayer::font::{BlockFont, FontCache, TextRasterizer};
use sublayer::layout::{self, Placement};
use sublayer::render::{EntryOutcome, EntryRenderer, PngDirectory, render_batch};
use sublayer::script::{self, ParseIssue, Role, SubtitleEntry};
use sublayer::settings::{Alignment, Anchor, Color, Effects, RenderSettings, Resolution};

fn painted(canvas: &image::RgbaImage) -> usize {
    canvas.pixels().filter(|p| p.0[3] > 0).count()
}

// ── parsing scenarios ───────────────────────────────────────────

#[test]
fn test_scenario_a_pair() {
    let parsed = script::parse_lines(["[Sub1]Hello", "[Sub1ch]Hi"]);
    assert_eq!(
        parsed.entries,
        vec![SubtitleEntry::standalone("Sub1", "Sub1", "Hello").with_translation("Sub1ch", "Hi")]
    );
    assert!(parsed.issues.is_empty());
}

#[test]
fn test_scenario_b_two_originals() {
    let parsed = script::parse_lines(["[Sub1]Hello", "[Sub2]World"]);
    assert_eq!(parsed.entries.len(), 2);
    assert!(parsed.entries.iter().all(|e| e.translated_text.is_none()));
    assert_eq!(parsed.entries[1].id, "Sub2");
}

#[test]
fn test_scenario_c_orphan() {
    let parsed = script::parse_lines(["[Sub1ch]OrphanOnly"]);
    assert!(parsed.entries.is_empty());
    assert_eq!(
        parsed.issues,
        vec![ParseIssue::OrphanTranslation {
            line: 1,
            tag: "Sub1ch".into(),
            text: "OrphanOnly".into(),
        }]
    );
}

#[test]
fn test_empty_script() {
    let parsed = script::parse_str("");
    assert!(parsed.entries.is_empty());
    assert!(parsed.issues.is_empty());
}

#[test]
fn test_unreadable_script_is_file_access() {
    let err = script::parse_file("/definitely/not/here/subs.txt").unwrap_err();
    assert!(matches!(err, sublayer::SublayerError::FileAccess { .. }));
}

// ── layout scenario ─────────────────────────────────────────────

#[test]
fn test_scenario_d_placement() {
    let settings = RenderSettings {
        resolution: "720p".parse().unwrap(),
        alignment: Alignment::Left,
        ..RenderSettings::default()
    };
    let font = BlockFont::new(5, 20);
    let ink = font.ink_box("0123456789");
    assert_eq!((ink.width(), ink.height()), (50, 20));

    let at = layout::place(
        settings.resolution.height,
        ink.width(),
        ink.height(),
        10,
        10,
        settings.alignment,
    );
    assert_eq!(at, Placement::new(10, 690));
}

// ── full pipeline ───────────────────────────────────────────────

const SCRIPT: &str = "\
[Sub1]Hello World
[Sub1ch]Bonjour le monde

[Sub2]Only original
[Sub3ch]Orphaned line
[Sub4]Fourth
[Sub4ch]Quatrième
";

fn test_settings() -> RenderSettings {
    let mut settings = RenderSettings::default();
    settings.resolution = Resolution::HD_720;
    settings.original.anchor = Anchor::new(640, 120);
    settings.translation.anchor = Anchor::new(640, 60);
    settings
}

#[test]
fn test_script_to_png_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("output_images");

    let parsed = script::parse_str(SCRIPT);
    assert_eq!(parsed.entries.len(), 3);
    assert_eq!(parsed.orphan_count(), 1);

    let sink = PngDirectory::new(&out).unwrap();
    let fonts = FontCache::block();
    let mut progress = Vec::new();
    let report = render_batch(&parsed.entries, &test_settings(), &fonts, &sink, Some(3), |r| {
        progress.push(r.original_tag.clone())
    })
    .unwrap();

    assert_eq!(progress, vec!["Sub1", "Sub2", "Sub4"]);
    assert!(report.all_rendered());

    let expected = ["Hello_World.png", "Only_original.png", "Fourth.png"];
    for name in expected {
        let path = out.join(name);
        assert!(path.is_file(), "missing {}", path.display());
        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (1280, 720));
        assert!(painted(&img) > 0);
        // Background stays transparent
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    let written: Vec<PathBuf> = report.rendered_paths().cloned().collect();
    assert_eq!(written, expected.iter().map(|n| out.join(n)).collect::<Vec<_>>());
}

#[test]
fn test_png_matches_in_memory_render() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = test_settings();
    let fonts = FontCache::block();
    let entry = SubtitleEntry::standalone("Sub1", "Sub1", "Hello").with_translation("Sub1ch", "Hi");

    let sink = PngDirectory::new(tmp.path()).unwrap();
    let report = render_batch(std::slice::from_ref(&entry), &settings, &fonts, &sink, Some(1), |_| {})
        .unwrap();
    let EntryOutcome::Rendered(path) = &report.entries[0].outcome else {
        panic!("entry failed: {:?}", report.entries[0].outcome);
    };

    let from_disk = image::open(path).unwrap().to_rgba8();
    let in_memory = EntryRenderer::new(&settings, &fonts).render(&entry).unwrap();
    assert!(from_disk == in_memory);
}

#[test]
fn test_rendering_twice_is_identical() {
    let settings = test_settings();
    let fonts = FontCache::block();
    let renderer = EntryRenderer::new(&settings, &fonts);
    let parsed = script::parse_str(SCRIPT);
    for entry in &parsed.entries {
        assert!(renderer.render(entry).unwrap() == renderer.render(entry).unwrap());
    }
}

#[test]
fn test_center_alignment_straddles_anchor() {
    let mut settings = test_settings();
    settings.original.effects = Effects::none();
    settings.original.color = Color::WHITE;
    let fonts = FontCache::block();
    let renderer = EntryRenderer::new(&settings, &fonts);

    let canvas = renderer
        .render(&SubtitleEntry::standalone("a", "a", "abcd"))
        .unwrap();
    let (min_x, max_x) = canvas
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[3] > 0)
        .fold((u32::MAX, 0), |(lo, hi), (x, _, _)| (lo.min(x), hi.max(x)));

    // Ink spans [anchor - w/2, anchor + w/2) up to the font's side bearing
    let mid = (min_x + max_x + 1) as f64 / 2.0;
    let bearing = BlockFont::for_size(settings.original.size_px).bearing_x as f64;
    assert!((mid - (640.0 + bearing)).abs() <= 1.0, "midpoint {mid}");

    let placement = renderer.placement(Role::Original, "abcd").unwrap().unwrap();
    assert_eq!(placement.y, 720 - 120 - BlockFont::for_size(60.0).cell_height);
}

#[test]
fn test_missing_font_is_reported_per_entry() {
    use sublayer::font::{FontBackend, FontLocator};

    let tmp = tempfile::tempdir().unwrap();
    let sink = PngDirectory::new(tmp.path()).unwrap();
    let fonts = FontCache::with_backend(FontBackend::Truetype(FontLocator::new(vec![], vec![])));
    let mut settings = test_settings();
    settings.original.font = "no-such-font.ttf".into();

    let entries = vec![
        SubtitleEntry::standalone("A", "A", "first"),
        SubtitleEntry::standalone("B", "B", "second"),
    ];
    let report = render_batch(&entries, &settings, &fonts, &sink, Some(2), |_| {}).unwrap();
    assert_eq!(report.failed_count(), 2);
    assert!(report.failures().all(|r| match &r.outcome {
        EntryOutcome::Failed(reason) => reason.contains("no-such-font.ttf"),
        EntryOutcome::Rendered(_) => false,
    }));
}

#[test]
fn test_settings_file_round_trip_through_cli_shape() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("style.json");
    std::fs::write(
        &path,
        r#"{ "resolution": "720p", "original": { "size_px": 48, "color": "255,0,0" } }"#,
    )
    .unwrap();

    let settings = RenderSettings::from_json_file(&path).unwrap();
    assert_eq!(settings.resolution, Resolution::HD_720);
    assert_eq!(settings.original.size_px, 48.0);
    assert_eq!(settings.original.color, Color::rgb(255, 0, 0));
    // Untouched keys keep their defaults
    assert_eq!(settings.translation, RenderSettings::default().translation);
}
