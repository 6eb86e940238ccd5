//! Executor integration tests: state semantics, element emission, and the
//! documented invariants.

use zpl_preview_core::{
    BarcodeKind, BlockJustification, Element, InterpretationLine, Orientation, OriginMode,
    QrEcLevel, execute, parse,
};

fn run(src: &str) -> zpl_preview_core::Execution {
    execute(&parse(src).label)
}

// ── Text fields ─────────────────────────────────────────────────────────

#[test]
fn minimal_text_label() {
    let exec = run("^XA^FO50,50^A0N,30,20^FDHello^FS^XZ");
    assert_eq!(exec.elements.len(), 1, "exactly one element");
    let Element::Text(t) = &exec.elements[0] else {
        panic!("expected a text element, got {:?}", exec.elements[0]);
    };
    assert_eq!((t.at.x, t.at.y), (50, 50));
    assert_eq!(t.at.origin, OriginMode::TopLeft);
    assert!(!t.at.reverse);
    assert_eq!(t.text, "Hello");
    assert_eq!(t.font.id, '0');
    assert_eq!((t.font.height, t.font.width), (30, 20));
    assert_eq!(t.font.orientation, Orientation::Normal);
    assert!(t.block.is_none());
    assert!(exec.warnings.is_empty());
}

#[test]
fn typeset_origin_is_baseline() {
    let exec = run("^XA^FT10,40^A0N,20,0^FDbase^FS^XZ");
    let Element::Text(t) = &exec.elements[0] else {
        panic!("expected text");
    };
    assert_eq!(t.at.origin, OriginMode::Baseline);
}

#[test]
fn anchor_formula_applies_home_shift_and_top() {
    let exec = run("^XA^LH10,20^LS5^LT7^FO100,200^A0N,20,0^FDx^FS^XZ");
    let at = exec.elements[0].placement();
    assert_eq!((at.x, at.y), (10 + 5 + 100, 20 + 7 + 200));
}

#[test]
fn field_without_positioning_anchors_at_home() {
    let exec = run("^XA^LH30,40^FDfloating^FS^XZ");
    let at = exec.elements[0].placement();
    assert_eq!((at.x, at.y), (30, 40));
}

#[test]
fn later_state_changes_do_not_mutate_emitted_elements() {
    let exec = run("^XA^FO1,1^A0N,20,0^FDfirst^FS^LH100,100^FO2,2^FDsecond^FS^XZ");
    let first = exec.elements[0].placement();
    let second = exec.elements[1].placement();
    assert_eq!((first.x, first.y), (1, 1));
    assert_eq!((second.x, second.y), (102, 102));
}

#[test]
fn field_block_snapshot_travels_with_the_text() {
    let exec = run("^XA^FO0,0^A0N,20,12^FB200,2,0,C^FDwrap me^FS^XZ");
    let Element::Text(t) = &exec.elements[0] else {
        panic!("expected text");
    };
    let block = t.block.as_ref().expect("field block snapshot");
    assert_eq!(block.width, 200);
    assert_eq!(block.max_lines, 2);
    assert_eq!(block.justification, BlockJustification::Center);
}

#[test]
fn reverse_print_sets_the_flag() {
    let exec = run("^XA^FO20,20^A0N,40,0^FR^FDDARK^FS^XZ");
    assert!(exec.elements[0].placement().reverse);
}

#[test]
fn fo_clears_block_reverse_and_hex() {
    let exec = run("^XA^FO0,0^FR^FB100,2,0,L^FO5,5^A0N,20,0^FD_41plain^FS^XZ");
    let Element::Text(t) = &exec.elements[0] else {
        panic!("expected text");
    };
    assert!(!t.at.reverse, "^FO resets reverse");
    assert!(t.block.is_none(), "^FO resets the field block");
    assert_eq!(t.text, "_41plain", "hex escapes are off without ^FH");
}

#[test]
fn fs_resets_per_field_state() {
    let exec = run("^XA^FO0,0^A0N,20,0^FR^FDa^FS^FO0,30^FDb^FS^XZ");
    assert!(exec.elements[0].placement().reverse);
    assert!(!exec.elements[1].placement().reverse);
}

#[test]
fn hex_escapes_decode_with_utf8_encoding() {
    let exec = run("^XA^CI28^FO0,0^A0N,20,0^FH^FD_C3_A9^FS^XZ");
    let Element::Text(t) = &exec.elements[0] else {
        panic!("expected text");
    };
    assert_eq!(t.text, "é");
}

#[test]
fn custom_hex_indicator() {
    let exec = run("^XA^FO0,0^A0N,20,0^FH#^FD#41#42^FS^XZ");
    let Element::Text(t) = &exec.elements[0] else {
        panic!("expected text");
    };
    assert_eq!(t.text, "AB");
}

#[test]
fn fonts_persist_until_changed_and_cf_keeps_orientation() {
    let exec = run("^XA^A0R,40,30^FO0,0^FDa^FS^CFB,20^FO0,50^FDb^FS^XZ");
    let (Element::Text(a), Element::Text(b)) = (&exec.elements[0], &exec.elements[1]) else {
        panic!("expected two text elements");
    };
    assert_eq!(a.font.id, '0');
    assert_eq!(a.font.orientation, Orientation::Rot90);
    assert_eq!(b.font.id, 'B');
    assert_eq!(b.font.height, 20);
    assert_eq!(b.font.width, 30, "^CF without width keeps the old width");
    assert_eq!(b.font.orientation, Orientation::Rot90, "^CF keeps orientation");
}

#[test]
fn sn_and_fv_render_like_field_data() {
    let exec = run("^XA^FO0,0^A0N,20,0^SN001,1,Y^FS^FO0,30^FVvar^FS^XZ");
    let (Element::Text(a), Element::Text(b)) = (&exec.elements[0], &exec.elements[1]) else {
        panic!("expected two text elements");
    };
    assert_eq!(a.text, "001");
    assert_eq!(b.text, "var");
}

// ── Shapes ──────────────────────────────────────────────────────────────

#[test]
fn graphic_box_carries_given_dimensions() {
    let exec = run("^XA^FO10,10^GB100,5,10,B,2^FS^XZ");
    let Element::Box(b) = &exec.elements[0] else {
        panic!("expected a box");
    };
    assert_eq!((b.width, b.height, b.border), (100, 5, 10));
    assert_eq!(b.rounding, 2);
}

#[test]
fn graphic_circle_is_a_square_ellipse() {
    let exec = run("^XA^FO0,0^GC40,3,B^FS^XZ");
    let Element::Ellipse(e) = &exec.elements[0] else {
        panic!("expected an ellipse");
    };
    assert_eq!((e.width, e.height, e.border), (40, 40, 3));
}

#[test]
fn graphic_diagonal_keeps_leaning() {
    let exec = run("^XA^FO0,0^GD50,30,2,B,L^FS^XZ");
    let Element::Diagonal(d) = &exec.elements[0] else {
        panic!("expected a diagonal");
    };
    assert!(!d.leaning_right);
}

// ── Barcodes ────────────────────────────────────────────────────────────

#[test]
fn qr_pending_is_consumed_with_prefix_stripped() {
    let exec = run("^XA^FO10,10^BQN,2,5^FDQA,https://example.com^FS^XZ");
    assert_eq!(exec.elements.len(), 1, "no text element for that field");
    let Element::Barcode(b) = &exec.elements[0] else {
        panic!("expected a barcode");
    };
    assert_eq!(b.kind, BarcodeKind::Qr);
    assert_eq!(b.content, "https://example.com");
    assert_eq!(b.module_width, 5);
    assert_eq!(b.error_correction, Some(QrEcLevel::Medium));
    assert_eq!((b.at.x, b.at.y), (10, 10));
}

#[test]
fn code128_uses_by_defaults() {
    let exec = run("^XA^BY3,2.5,80^FO0,0^BCN,,Y,N^FD12345678^FS^XZ");
    let Element::Barcode(b) = &exec.elements[0] else {
        panic!("expected a barcode");
    };
    assert_eq!(b.kind, BarcodeKind::Code128);
    assert_eq!(b.module_width, 3);
    assert!((b.ratio - 2.5).abs() < 1e-6);
    assert_eq!(b.height, 80, "height defaults from ^BY");
    assert_eq!(b.interpretation, InterpretationLine::Below);
}

#[test]
fn barcode_height_parameter_overrides_default() {
    let exec = run("^XA^BY2,3,40^FO0,0^BCN,120,N,N^FDdata^FS^XZ");
    let Element::Barcode(b) = &exec.elements[0] else {
        panic!("expected a barcode");
    };
    assert_eq!(b.height, 120);
    assert_eq!(b.interpretation, InterpretationLine::Off);
}

#[test]
fn by_zero_clamps_to_documented_bounds() {
    let exec = run("^XA^BY0,0,0^FO0,0^B3N,N,,Y,N^FDAB^FS^XZ");
    let Element::Barcode(b) = &exec.elements[0] else {
        panic!("expected a barcode");
    };
    assert_eq!(b.module_width, 1, "module width clamps to 1");
    assert!((b.ratio - 2.0).abs() < 1e-6, "ratio clamps to 2.0");
    assert_eq!(b.height, 10, "zero height keeps the default");
}

#[test]
fn pending_barcode_is_discarded_by_fs_without_fd() {
    let exec = run("^XA^FO0,0^BCN,50,Y,N^FS^FO0,60^A0N,20,0^FDtext^FS^XZ");
    assert_eq!(exec.elements.len(), 1);
    assert!(matches!(exec.elements[0], Element::Text(_)));
}

#[test]
fn by_changes_after_staging_do_not_affect_the_staged_barcode() {
    let exec = run("^XA^BY4^FO0,0^BCN,50,N,N^BY1^FDdata^FS^XZ");
    let Element::Barcode(b) = &exec.elements[0] else {
        panic!("expected a barcode");
    };
    assert_eq!(
        b.module_width, 4,
        "descriptor snapshots the defaults at declaration time"
    );
}

#[test]
fn interpretation_line_above() {
    let exec = run("^XA^FO0,0^BEN,60,Y,Y^FD4006381333931^FS^XZ");
    let Element::Barcode(b) = &exec.elements[0] else {
        panic!("expected a barcode");
    };
    assert_eq!(b.kind, BarcodeKind::Ean13);
    assert_eq!(b.interpretation, InterpretationLine::Above);
}

// ── Graphics ────────────────────────────────────────────────────────────

#[test]
fn download_and_recall_scales() {
    let exec = run("~DGR:DOT.GRF,1,1,80^XA^FO0,0^XGR:DOT.GRF,8,8^FS^XZ");
    let Element::Image(img) = &exec.elements[0] else {
        panic!("expected an image");
    };
    assert_eq!((img.scale_x, img.scale_y), (8, 8));
    assert_eq!((img.bitmap.width, img.bitmap.height), (8, 1));
    assert!(img.bitmap.get(0, 0), "0x80 sets the first pixel");
    assert!(!img.bitmap.get(1, 0));
}

#[test]
fn recall_without_drive_prefix_finds_the_graphic() {
    let exec = run("~DGR:DOT.GRF,1,1,80^XA^FO0,0^IMDOT.GRF^FS^XZ");
    assert_eq!(exec.elements.len(), 1);
    let Element::Image(img) = &exec.elements[0] else {
        panic!("expected an image");
    };
    assert_eq!((img.scale_x, img.scale_y), (1, 1));
}

#[test]
fn recall_before_download_is_a_no_op() {
    let exec = run("^XA^FO0,0^XGR:NOPE.GRF,1,1^FS^XZ");
    assert!(exec.elements.is_empty());
}

#[test]
fn graphics_cache_outlives_a_label() {
    let exec = run("~DGR:A.GRF,1,1,FF^XA^XZ^XA^FO0,0^XGR:A.GRF,1,1^FS^XZ");
    assert_eq!(exec.elements.len(), 1);
}

#[test]
fn inline_graphic_field_emits_an_image() {
    let exec = run("^XA^FO5,5^GFA,2,2,1,80FF^FS^XZ");
    let Element::Image(img) = &exec.elements[0] else {
        panic!("expected an image");
    };
    assert_eq!((img.bitmap.width, img.bitmap.height), (8, 2));
    assert!(img.bitmap.get(0, 0));
    assert!((0..8).all(|x| img.bitmap.get(x, 1)));
}

// ── Label structure ─────────────────────────────────────────────────────

#[test]
fn xa_resets_position_and_orientation() {
    let exec = run("^XA^A0R,30,0^PO I^FO40,40^FDone^FS^XZ^XA^FDtwo^FS^XZ");
    let (Element::Text(a), Element::Text(b)) = (&exec.elements[0], &exec.elements[1]) else {
        panic!("expected two text elements");
    };
    assert_eq!(a.font.orientation, Orientation::Rot90);
    assert_eq!((b.at.x, b.at.y), (0, 0), "^XA resets the position");
    assert_eq!(b.font.orientation, Orientation::Normal, "^XA resets rotation");
    assert!(!exec.state.inverted, "^XA resets print orientation");
}

#[test]
fn layout_commands_update_state_only() {
    let exec = run("^XA^PW400^LL300^POI^PQ4^MD15^PR2^MMT^FWR^XZ");
    assert!(exec.elements.is_empty());
    assert_eq!(exec.state.print_width, Some(400));
    assert_eq!(exec.state.label_length, Some(300));
    assert!(exec.state.inverted);
    assert_eq!(exec.state.quantity, 4);
}

#[test]
fn empty_field_data_emits_nothing() {
    let exec = run("^XA^FO0,0^FD^FS^XZ");
    assert!(exec.elements.is_empty());
}

#[test]
fn unknown_commands_are_skipped_silently_by_the_executor() {
    let exec = run("^XA^QQ9,9^FO0,0^A0N,20,0^FDok^FS^XZ");
    assert_eq!(exec.elements.len(), 1);
}
