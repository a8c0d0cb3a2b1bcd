//! Gutter segmentation regression test
//!
//! Synthetic strips with known gutters, blips and dividers are segmented
//! and the resulting spans checked against the expected cuts.

use stripcut_core::{ImageFormat, Pix};
use stripcut_io::WriteOptions;
use stripcut_segment::{
    Background, CutSpan, DirSink, GutterSegmenter, MAX_OUTPUT_HEIGHT, MemorySink, PanelFragment,
    SegmentOptions, assemble,
};
use stripcut_test::RegParams;
use stripcut_test::synth::{self, Band};

const WIDTH: u32 = 64;
const INK: Band = Band::Noise { lo: 0, hi: 200 };
const PAPER: Band = Band::Solid(255);

fn heights(spans: &[CutSpan]) -> Vec<u32> {
    spans.iter().map(CutSpan::height).collect()
}

#[test]
fn gutter_uniform_canvas_reg() {
    let mut rp = RegParams::new("gutter_uniform");

    let white = synth::solid(WIDTH, 3000, 255).expect("white");
    let mut sink = MemorySink::new();
    let n = GutterSegmenter::default()
        .segment(&white, Background::White, &mut sink)
        .expect("segment");
    rp.compare_values(0.0, n as f64, 0.0);
    rp.compare_values(0.0, sink.len() as f64, 0.0);

    let black = synth::solid(WIDTH, 800, 0).expect("black");
    let n = GutterSegmenter::default()
        .segment(&black, Background::Black, &mut sink)
        .expect("segment");
    rp.compare_values(0.0, n as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn gutter_two_blocks_reg() {
    let mut rp = RegParams::new("gutter_two_blocks");

    let canvas = synth::strip(WIDTH, &[(400, INK), (60, PAPER), (400, INK)], 5).expect("strip");
    let seg = GutterSegmenter::default();

    let regions = seg.find_regions(&canvas, Background::White).expect("regions");
    rp.compare_values(1.0, regions.len() as f64, 0.0);
    rp.compare_values(400.0, regions[0].end_y as f64, 0.0);

    let mut sink = MemorySink::new();
    let n = seg.segment(&canvas, Background::White, &mut sink).expect("segment");
    rp.compare_values(2.0, n as f64, 0.0);

    let total: u32 = sink.segments().iter().map(|(_, p)| p.height()).sum();
    rp.compare_values(canvas.height() as f64, total as f64, 0.0);

    // First cut is at the top of the gutter
    rp.compare_values(400.0, sink.segments()[0].1.height() as f64, 0.0);
    rp.compare_values(1.0, sink.segments()[0].0 as f64, 0.0);
    rp.compare_values(2.0, sink.segments()[1].0 as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn gutter_blip_reg() {
    let mut rp = RegParams::new("gutter_blip");

    let plain = synth::strip(
        WIDTH,
        &[(200, INK), (220, PAPER), (200, INK)],
        9,
    )
    .expect("plain");
    let blip = synth::strip(
        WIDTH,
        &[(200, INK), (100, PAPER), (20, INK), (100, PAPER), (200, INK)],
        9,
    )
    .expect("blip");

    let seg = GutterSegmenter::default();
    let plain_spans = seg.plan(&plain, Background::White).expect("plan plain");
    let blip_spans = seg.plan(&blip, Background::White).expect("plan blip");

    rp.compare_values(2.0, blip_spans.len() as f64, 0.0);
    rp.compare_true(
        heights(&plain_spans) == heights(&blip_spans),
        "blip leaves the cuts unchanged",
    );
    rp.compare_true(
        blip_spans.iter().all(|s| s.end_y <= 300 || s.end_y >= 420),
        "no cut next to the blip",
    );

    assert!(rp.cleanup());
}

#[test]
fn gutter_idempotence_reg() {
    let mut rp = RegParams::new("gutter_idempotence");

    let canvas = synth::strip(
        WIDTH,
        &[
            (50, PAPER),
            (300, INK),
            (45, PAPER),
            (500, INK),
            (12, PAPER),
            (250, INK),
        ],
        21,
    )
    .expect("strip");

    let seg = GutterSegmenter::default();
    let mut first = MemorySink::new();
    seg.segment(&canvas, Background::White, &mut first).expect("first pass");
    let spans1 = seg.plan(&canvas, Background::White).expect("plan 1");
    rp.compare_values(2.0, spans1.len() as f64, 0.0);

    let restacked = synth::stack(&first.into_images(), 255).expect("stack");
    rp.compare_pix(&canvas, &restacked);

    let mut second = MemorySink::new();
    seg.segment(&restacked, Background::White, &mut second).expect("second pass");
    let spans2 = seg.plan(&restacked, Background::White).expect("plan 2");
    rp.compare_true(spans1 == spans2, "identical spans on second pass");

    for (span, (_, pix)) in spans2.iter().zip(second.segments()) {
        let expected = canvas.clip_rows(span.start_y, span.height()).expect("clip");
        rp.compare_pix(&expected, pix);
    }

    assert!(rp.cleanup());
}

#[test]
fn gutter_recursive_limiter_reg() {
    let mut rp = RegParams::new("gutter_recursive_limiter");

    // Mid-tone art with a black divider: all content against white,
    // but the divider is background against black
    let art = Band::Noise { lo: 60, hi: 200 };
    let canvas = synth::strip(WIDTH, &[(730, art), (40, Band::Solid(0)), (730, art)], 33)
        .expect("strip");
    let opts = SegmentOptions::default().with_max_segment_height(1000);
    let seg = GutterSegmenter::new(opts);

    let top = seg.find_regions(&canvas, Background::White).expect("regions");
    rp.compare_values(0.0, top.len() as f64, 0.0);

    let spans = seg.plan(&canvas, Background::White).expect("plan");
    rp.compare_values(2.0, spans.len() as f64, 0.0);
    rp.compare_values(730.0, spans[0].end_y as f64, 0.0);
    rp.compare_values(1500.0, spans[1].end_y as f64, 0.0);
    rp.compare_true(
        spans.iter().all(|s| s.depth == 1 && s.background == Background::Black),
        "spans come from the black pass",
    );
    rp.compare_true(
        spans.iter().all(|s| s.height() <= 1000),
        "spans fit the height limit",
    );

    // Without recursion the whole canvas is kept as one segment
    let flat = GutterSegmenter::new(
        SegmentOptions::default()
            .with_max_segment_height(1000)
            .with_max_recursion_depth(0),
    );
    rp.compare_values(
        1.0,
        flat.plan(&canvas, Background::White).expect("plan").len() as f64,
        0.0,
    );

    assert!(rp.cleanup());
}

#[test]
fn gutter_white_paper_dividers_reg() {
    let mut rp = RegParams::new("gutter_white_paper_dividers");

    // White paper with thin margins and solid black dividers, then a blank
    // tail. Against white the margins are too short to cut at, so the
    // first span is oversized and searched again against black.
    let divider = Band::Solid(0);
    let canvas = synth::strip(
        WIDTH,
        &[
            (20, PAPER),
            (400, INK),
            (20, PAPER),
            (60, divider),
            (20, PAPER),
            (400, INK),
            (20, PAPER),
            (60, divider),
            (1200, PAPER),
        ],
        41,
    )
    .expect("strip");
    let seg = GutterSegmenter::new(SegmentOptions::default().with_max_segment_height(800));

    let top = seg.find_regions(&canvas, Background::White).expect("regions");
    rp.compare_values(1.0, top.len() as f64, 0.0);
    rp.compare_values(1000.0, top[0].end_y as f64, 0.0);

    let spans = seg.plan(&canvas, Background::White).expect("plan");
    rp.compare_values(2.0, spans.len() as f64, 0.0);
    rp.compare_true(
        spans.iter().map(|s| s.index).eq(1..=spans.len() as u32),
        "indices are contiguous",
    );
    rp.compare_true(
        spans.iter().all(|s| s.depth == 1 && s.background == Background::Black),
        "spans come from the black pass",
    );
    rp.compare_values(440.0, spans[0].end_y as f64, 0.0);
    rp.compare_values(940.0, spans[1].end_y as f64, 0.0);
    rp.compare_true(
        spans.iter().all(|s| s.end_y <= 1000),
        "neither the trailing divider nor the blank tail is written",
    );

    let mut sink = MemorySink::new();
    let n = seg.segment(&canvas, Background::White, &mut sink).expect("segment");
    rp.compare_values(2.0, n as f64, 0.0);
    for (span, (_, pix)) in spans.iter().zip(sink.segments()) {
        let expected = canvas.clip_rows(span.start_y, span.height()).expect("clip");
        rp.compare_pix(&expected, pix);
    }

    assert!(rp.cleanup());
}

#[test]
fn gutter_jpeg_height_cap_reg() {
    let mut rp = RegParams::new("gutter_jpeg_height_cap");

    // No gutter anywhere: the whole strip survives recursion oversized
    let canvas = synth::noise(8, 70_000, 0, 200, 3).expect("noise");
    let seg = GutterSegmenter::default();

    let spans = seg.plan(&canvas, Background::White).expect("plan");
    rp.compare_true(
        heights(&spans) == vec![MAX_OUTPUT_HEIGHT, 70_000 - MAX_OUTPUT_HEIGHT],
        "kept span is cut at the output cap",
    );

    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = DirSink::new(dir.path(), WriteOptions::new(ImageFormat::Jpeg)).expect("sink");
    let n = seg.segment(&canvas, Background::White, &mut sink).expect("segment");
    rp.compare_values(2.0, n as f64, 0.0);

    let written = sink.into_written();
    rp.compare_true(written[1].1.ends_with("2.jpg"), "second file named by index");
    let first: Pix = stripcut_io::read_image(&written[0].1).expect("read back");
    rp.compare_values(MAX_OUTPUT_HEIGHT as f64, first.height() as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn gutter_end_to_end_reg() {
    let mut rp = RegParams::new("gutter_end_to_end");

    let frags = vec![
        PanelFragment::new(1, synth::noise(WIDTH, 500, 0, 200, 1).expect("a")),
        PanelFragment::new(2, synth::solid(WIDTH, 10, 255).expect("gap")),
        PanelFragment::new(3, synth::noise(WIDTH, 500, 0, 200, 2).expect("b")),
    ];
    let canvas = assemble(&frags, Background::White).expect("assemble");
    rp.compare_values(1010.0, canvas.height() as f64, 0.0);

    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = DirSink::new(dir.path(), WriteOptions::new(ImageFormat::Jpeg)).expect("sink");
    let n = GutterSegmenter::default()
        .segment(&canvas, Background::White, &mut sink)
        .expect("segment");
    rp.compare_values(1.0, n as f64, 0.0);

    let written = sink.into_written();
    rp.compare_values(1.0, written.len() as f64, 0.0);
    rp.compare_true(written[0].1.ends_with("1.jpg"), "named by index");

    let out: Pix = stripcut_io::read_image(&written[0].1).expect("read back");
    rp.compare_values(1010.0, out.height() as f64, 0.0);
    rp.compare_values(WIDTH as f64, out.width() as f64, 0.0);
    rp.compare_values(3.0, out.spp() as f64, 0.0);

    assert!(rp.cleanup());
}
